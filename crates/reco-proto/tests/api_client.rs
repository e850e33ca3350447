//! Drives the real `ApiClient` against an in-process mock of the
//! recommendation service and checks the exact wire shapes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use reco_proto::api::ApiClient;
use reco_proto::config::ApiConfig;
use reco_proto::error::ApiError;
use reco_proto::model::Recommendation;

/// One request as seen by the mock service.
#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Search(HashMap<String, String>),
    Recommend(Value),
    Songs(HashMap<String, String>),
}

#[derive(Clone, Default)]
struct Mock {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Mock {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn search(State(mock): State<Mock>, Query(q): Query<HashMap<String, String>>) -> Response {
    mock.seen.lock().unwrap().push(Seen::Search(q.clone()));
    match q.get("q").map(String::as_str) {
        Some("Imagine") => Json(json!([{"track_name": "Imagine", "artist": "John Lennon"}])).into_response(),
        Some("garbled") => (StatusCode::OK, "not json at all").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn recommend(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    mock.seen.lock().unwrap().push(Seen::Recommend(body.clone()));
    let song = body["song"].as_str().unwrap_or_default().to_string();
    if song == "Nope" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Song 'Nope' not found in dataset"})),
        )
            .into_response();
    }
    Json(json!({
        "input": song,
        "page": body["page"],
        "per_page": body["per_page"],
        "recommendations": [
            {"track_name": "Jealous Guy", "artist": "John Lennon", "album": "Imagine",
             "release_year": "", "genre": "rock", "popularity": 61, "score": 0.9412},
            {"track_name": "Mind Games", "artist": "John Lennon", "popularity": null}
        ]
    }))
    .into_response()
}

async fn songs(State(mock): State<Mock>, Query(q): Query<HashMap<String, String>>) -> Response {
    mock.seen.lock().unwrap().push(Seen::Songs(q));
    Json(json!([
        {"track_name": "Song A", "artist": "Artist A", "album": "", "release_year": "",
         "genre": "pop", "popularity": 40}
    ]))
    .into_response()
}

async fn spawn_mock() -> (Mock, ApiClient) {
    let mock = Mock::default();
    let app = Router::new()
        .route("/search", get(search))
        .route("/recommend", post(recommend))
        .route("/songs", get(songs))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = ApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: 5,
    })
    .unwrap();
    (mock, client)
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn search_without_paging_sends_only_query() {
    let (mock, client) = spawn_mock().await;
    let results = client.search_songs("Imagine", None, None).await.unwrap();

    assert_eq!(results, vec![Recommendation::new("Imagine", "John Lennon")]);
    assert_eq!(mock.seen(), vec![Seen::Search(params(&[("q", "Imagine")]))]);
}

#[tokio::test]
async fn search_with_paging_and_encoding() {
    let (mock, client) = spawn_mock().await;
    let results = client
        .search_songs("rock & roll", Some(2), Some(5))
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(
        mock.seen(),
        vec![Seen::Search(params(&[
            ("q", "rock & roll"),
            ("page", "2"),
            ("per_page", "5")
        ]))]
    );
}

#[tokio::test]
async fn recommend_posts_json_body() {
    let (mock, client) = spawn_mock().await;
    let resp = client
        .recommend_song("Imagine", Some(1), Some(10))
        .await
        .unwrap();

    assert_eq!(
        mock.seen(),
        vec![Seen::Recommend(json!({"song": "Imagine", "page": 1, "per_page": 10}))]
    );
    assert_eq!(resp.input.as_deref(), Some("Imagine"));
    assert_eq!(resp.recommendations.len(), 2);
    assert_eq!(resp.recommendations[0].score_percent(), Some(94));
    assert_eq!(resp.recommendations[0].popularity, Some(61.0));
    assert_eq!(resp.recommendations[1].popularity, None);
}

#[tokio::test]
async fn recommend_defaults_page_and_size() {
    let (mock, client) = spawn_mock().await;
    client.recommend_song("Imagine", None, None).await.unwrap();

    assert_eq!(
        mock.seen(),
        vec![Seen::Recommend(json!({"song": "Imagine", "page": 1, "per_page": 6}))]
    );
}

#[tokio::test]
async fn songs_listing_sends_paging() {
    let (mock, client) = spawn_mock().await;
    let listed = client.fetch_songs(Some(3), Some(10)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].genre.as_deref(), Some("pop"));

    client.fetch_songs(None, None).await.unwrap();
    assert_eq!(
        mock.seen(),
        vec![
            Seen::Songs(params(&[("page", "3"), ("per_page", "10")])),
            Seen::Songs(params(&[("page", "1"), ("per_page", "6")])),
        ]
    );
}

#[tokio::test]
async fn unknown_song_maps_to_status_error() {
    let (_mock, client) = spawn_mock().await;
    let err = client.recommend_song("Nope", None, None).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            message: "Song 'Nope' not found in dataset".to_string()
        }
    );
    assert_eq!(err.summary(), "Song 'Nope' not found in dataset");
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let (_mock, client) = spawn_mock().await;
    let err = client.search_songs("garbled", None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn refused_connection_maps_to_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: 2,
    })
    .unwrap();
    let err = client.fetch_songs(None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
    assert_eq!(err.summary(), "service unreachable");
}
