//! Runs a [`Query`] against the service and normalises the payload.

use reco_proto::api::ApiClient;
use reco_proto::error::ApiError;

use crate::shell::{Fetched, Query};

/// Who asked for the data; decides where the response is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    /// Main list (page shell).
    Shell,
    /// Search box dropdown.
    Dropdown,
}

pub async fn execute(client: &ApiClient, query: &Query) -> Result<Fetched, ApiError> {
    match query {
        Query::Songs { page, per_page } => {
            let items = client.fetch_songs(Some(*page), Some(*per_page)).await?;
            Ok(Fetched {
                items,
                total_pages: None,
            })
        }
        Query::Search {
            query,
            page,
            per_page,
        } => {
            let items = client
                .search_songs(query, Some(*page), Some(*per_page))
                .await?;
            Ok(Fetched {
                items,
                total_pages: None,
            })
        }
        Query::Recommend {
            song,
            page,
            per_page,
        } => {
            let response = client
                .recommend_song(song, Some(*page), Some(*per_page))
                .await?;
            Ok(Fetched {
                items: response.recommendations,
                total_pages: response.total_pages,
            })
        }
    }
}
