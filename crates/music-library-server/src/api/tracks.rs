//! Track API handlers.

use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::catalog::{TrackPage, TrackSummary};
use crate::models::{ErrorResponse, TrackSearchResponse};
use crate::state::AppState;

/// Query parameters for the track listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TrackListQuery {
    /// Keyword search over title and artist; bypasses pagination.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query parameters for the stats listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatsQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/tracks",
    params(TrackListQuery),
    responses(
        (status = 200, description = "Paginated tracks, or search results", body = TrackPage)
    )
)]
#[get("/api/tracks")]
/// List tracks paginated, or search when `search` is given.
pub async fn tracks_list(
    state: web::Data<AppState>,
    query: web::Query<TrackListQuery>,
) -> impl Responder {
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return match state.catalog.search_tracks(search) {
            Ok(tracks) => {
                let total = tracks.len() as i64;
                HttpResponse::Ok().json(TrackSearchResponse { tracks, total })
            }
            Err(err) => {
                tracing::error!(error = %err, search, "track search failed");
                HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
            }
        };
    }

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50);
    match state.catalog.list_tracks(page, limit) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => {
            tracing::error!(error = %err, "list tracks failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tracks/{id}",
    params(("id" = i64, Path, description = "Track id")),
    responses(
        (status = 200, description = "Track detail", body = TrackSummary),
        (status = 404, description = "Track not found", body = ErrorResponse)
    )
)]
#[get("/api/tracks/{id}")]
/// Fetch one track.
pub async fn tracks_get(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.track_by_id(id) {
        Ok(Some(track)) => HttpResponse::Ok().json(track),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("track not found")),
        Err(err) => {
            tracing::error!(error = %err, id, "fetch track failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tracks/stats/top",
    params(StatsQuery),
    responses(
        (status = 200, description = "Most played tracks", body = [TrackSummary])
    )
)]
#[get("/api/tracks/stats/top")]
/// Most played tracks, ordered by play count.
pub async fn tracks_top(
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(20).clamp(1, 500);
    match state.catalog.top_played_tracks(limit) {
        Ok(tracks) => HttpResponse::Ok().json(tracks),
        Err(err) => {
            tracing::error!(error = %err, "top played failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tracks/stats/recent",
    params(StatsQuery),
    responses(
        (status = 200, description = "Recently added tracks", body = [TrackSummary])
    )
)]
#[get("/api/tracks/stats/recent")]
/// Recently added tracks, newest first.
pub async fn tracks_recent(
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(20).clamp(1, 500);
    match state.catalog.recent_tracks(limit) {
        Ok(tracks) => HttpResponse::Ok().json(tracks),
        Err(err) => {
            tracing::error!(error = %err, "recent tracks failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}
