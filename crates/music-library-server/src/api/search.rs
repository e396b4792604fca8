//! Global search across artists, albums, and tracks.

use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::{ErrorResponse, SearchResponse};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Keyword; queries shorter than two characters return empty results.
    #[serde(default)]
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matches across all entity kinds", body = SearchResponse)
    )
)]
#[get("/api/search")]
/// Search artists, albums, and tracks by keyword.
pub async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> impl Responder {
    let q = query.q.as_deref().map(str::trim).unwrap_or("");
    if q.chars().count() < 2 {
        return HttpResponse::Ok().json(SearchResponse {
            artists: Vec::new(),
            albums: Vec::new(),
            tracks: Vec::new(),
        });
    }

    let artists = match state.catalog.search_artists(q) {
        Ok(artists) => artists,
        Err(err) => {
            tracing::error!(error = %err, q, "artist search failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    let albums = match state.catalog.search_albums(q) {
        Ok(albums) => albums,
        Err(err) => {
            tracing::error!(error = %err, q, "album search failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    let tracks = match state.catalog.search_tracks(q) {
        Ok(tracks) => tracks,
        Err(err) => {
            tracing::error!(error = %err, q, "track search failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };

    HttpResponse::Ok().json(SearchResponse {
        artists,
        albums,
        tracks,
    })
}
