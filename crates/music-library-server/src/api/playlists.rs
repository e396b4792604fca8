//! Playlist API handlers.

use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::catalog::PlaylistSummary;
use crate::models::{
    ErrorResponse, PlaylistAddTrackRequest, PlaylistAddTrackResponse, PlaylistCreateRequest,
    PlaylistCreatedResponse, PlaylistDetailResponse, PlaylistUpdateRequest, SuccessResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/playlists",
    responses(
        (status = 200, description = "All playlists with track counts", body = [PlaylistSummary])
    )
)]
#[get("/api/playlists")]
/// List all playlists with track counts.
pub async fn playlists_list(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.list_playlists() {
        Ok(playlists) => HttpResponse::Ok().json(playlists),
        Err(err) => {
            tracing::error!(error = %err, "list playlists failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/playlists/{id}",
    params(("id" = i64, Path, description = "Playlist id")),
    responses(
        (status = 200, description = "Playlist with its tracks in order", body = PlaylistDetailResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[get("/api/playlists/{id}")]
/// Fetch one playlist with its tracks ordered by position.
pub async fn playlists_get(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let playlist = match state.catalog.playlist_by_id(id) {
        Ok(Some(playlist)) => playlist,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("playlist not found"));
        }
        Err(err) => {
            tracing::error!(error = %err, id, "fetch playlist failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    let tracks = match state.catalog.playlist_tracks(id) {
        Ok(tracks) => tracks,
        Err(err) => {
            tracing::error!(error = %err, id, "fetch playlist tracks failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    HttpResponse::Ok().json(PlaylistDetailResponse { playlist, tracks })
}

#[utoipa::path(
    post,
    path = "/api/playlists",
    request_body = PlaylistCreateRequest,
    responses(
        (status = 201, description = "Playlist created", body = PlaylistCreatedResponse),
        (status = 400, description = "Name missing", body = ErrorResponse)
    )
)]
#[post("/api/playlists")]
/// Create a playlist.
pub async fn playlists_create(
    state: web::Data<AppState>,
    body: web::Json<PlaylistCreateRequest>,
) -> impl Responder {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("name is required"));
    }
    match state.catalog.create_playlist(name, body.description.as_deref()) {
        Ok(id) => HttpResponse::Created().json(PlaylistCreatedResponse {
            id,
            name: name.to_string(),
            description: body.description.clone(),
        }),
        Err(err) => {
            tracing::error!(error = %err, name, "create playlist failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/playlists/{id}",
    params(("id" = i64, Path, description = "Playlist id")),
    request_body = PlaylistUpdateRequest,
    responses(
        (status = 200, description = "Playlist updated", body = SuccessResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[put("/api/playlists/{id}")]
/// Update a playlist; absent fields are left unchanged.
pub async fn playlists_update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PlaylistUpdateRequest>,
) -> impl Responder {
    let id = path.into_inner();
    match state
        .catalog
        .update_playlist(id, body.name.as_deref(), body.description.as_deref())
    {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::new("playlist not found")),
        Err(err) => {
            tracing::error!(error = %err, id, "update playlist failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/playlists/{id}",
    params(("id" = i64, Path, description = "Playlist id")),
    responses(
        (status = 200, description = "Playlist deleted", body = SuccessResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[delete("/api/playlists/{id}")]
/// Delete a playlist and its entries.
pub async fn playlists_delete(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.delete_playlist(id) {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::new("playlist not found")),
        Err(err) => {
            tracing::error!(error = %err, id, "delete playlist failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/playlists/{id}/tracks",
    params(("id" = i64, Path, description = "Playlist id")),
    request_body = PlaylistAddTrackRequest,
    responses(
        (status = 200, description = "Track appended", body = PlaylistAddTrackResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[post("/api/playlists/{id}/tracks")]
/// Append a track at the next free position.
pub async fn playlists_add_track(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PlaylistAddTrackRequest>,
) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.playlist_by_id(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("playlist not found"));
        }
        Err(err) => {
            tracing::error!(error = %err, id, "fetch playlist failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    }
    match state.catalog.add_playlist_track(id, body.track_id) {
        Ok(position) => HttpResponse::Ok().json(PlaylistAddTrackResponse {
            success: true,
            position,
        }),
        Err(err) => {
            tracing::error!(error = %err, id, track_id = body.track_id, "add playlist track failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/playlists/{id}/tracks/{track_id}",
    params(
        ("id" = i64, Path, description = "Playlist id"),
        ("track_id" = i64, Path, description = "Track id")
    ),
    responses(
        (status = 200, description = "Track removed", body = SuccessResponse),
        (status = 404, description = "Track not in playlist", body = ErrorResponse)
    )
)]
#[delete("/api/playlists/{id}/tracks/{track_id}")]
/// Remove a track from a playlist.
pub async fn playlists_remove_track(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (id, track_id) = path.into_inner();
    match state.catalog.remove_playlist_track(id, track_id) {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => {
            HttpResponse::NotFound().json(ErrorResponse::new("track not in playlist"))
        }
        Err(err) => {
            tracing::error!(error = %err, id, track_id, "remove playlist track failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}
