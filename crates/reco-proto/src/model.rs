//! Wire model shared by the search, listing and recommendation endpoints.

use serde::{Deserialize, Serialize};

/// A song record returned by the service, optionally with a relevance score.
///
/// The same shape comes back from `/search`, `/songs` and inside
/// `/recommend`'s `recommendations` array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    pub track_name: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Search hits carry exactly the same fields.
pub type SearchResult = Recommendation;

impl Recommendation {
    pub fn new(track_name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist: artist.into(),
            ..Self::default()
        }
    }

    /// Relevance as a whole percentage (`0.8712` → `87`).
    pub fn score_percent(&self) -> Option<i64> {
        self.score.map(|s| (s * 100.0).round() as i64)
    }

    /// Labelled metadata in display order. Empty strings count as absent:
    /// the service fills unknown album/year/genre with `""`.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(album) = non_empty(&self.album) {
            out.push(("Album", album.to_string()));
        }
        if let Some(year) = non_empty(&self.release_year) {
            out.push(("Year", year.to_string()));
        }
        if let Some(genre) = non_empty(&self.genre) {
            out.push(("Genre", genre.to_string()));
        }
        if let Some(pop) = self.popularity {
            out.push(("Popularity", format_number(pop)));
        }
        out
    }

    /// "track — artist", used for clipboard copy and log lines.
    pub fn label(&self) -> String {
        format!("{} — {}", self.track_name, self.artist)
    }
}

/// Body of a successful `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// Song name echoed back by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Not sent by the current service. Honoured when present so the pager
    /// can stop guessing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

/// Body of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub song: String,
    pub page: u32,
    pub per_page: u32,
}

/// Error body the service sends with 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_parses() {
        let r: Recommendation =
            serde_json::from_str(r#"{"track_name":"Imagine","artist":"John Lennon"}"#).unwrap();
        assert_eq!(r, Recommendation::new("Imagine", "John Lennon"));
        assert!(r.details().is_empty());
        assert_eq!(r.score_percent(), None);
    }

    #[test]
    fn test_service_shaped_record() {
        let json = r#"{
            "track_name": "Hey Jude",
            "artist": "The Beatles",
            "album": "Hey Jude",
            "release_year": "",
            "genre": "rock",
            "popularity": null,
            "score": 0.8712
        }"#;
        let r: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(r.release_year.as_deref(), Some(""));
        assert_eq!(r.popularity, None);
        assert_eq!(r.score_percent(), Some(87));
        let details = r.details();
        assert_eq!(
            details,
            vec![
                ("Album", "Hey Jude".to_string()),
                ("Genre", "rock".to_string())
            ]
        );
    }

    #[test]
    fn test_popularity_formatting() {
        let mut r = Recommendation::new("a", "b");
        r.popularity = Some(73.0);
        assert_eq!(r.details(), vec![("Popularity", "73".to_string())]);
        r.popularity = Some(0.0);
        assert_eq!(r.details(), vec![("Popularity", "0".to_string())]);
    }

    #[test]
    fn test_recommend_response_defaults() {
        let resp: RecommendResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.recommendations.is_empty());
        assert_eq!(resp.total_pages, None);

        let resp: RecommendResponse = serde_json::from_str(
            r#"{"input":"Imagine","page":2,"per_page":10,"recommendations":[{"track_name":"x","artist":"y"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.input.as_deref(), Some("Imagine"));
        assert_eq!(resp.page, Some(2));
        assert_eq!(resp.recommendations.len(), 1);
    }
}
