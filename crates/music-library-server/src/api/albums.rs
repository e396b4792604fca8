//! Album API handlers.

use actix_web::{HttpResponse, Responder, get, post, put, web};

use crate::catalog::AlbumSummary;
use crate::models::{
    AlbumCreateRequest, AlbumCreatedResponse, AlbumDetailResponse, AlbumUpdateRequest,
    ErrorResponse, SuccessResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/albums",
    responses(
        (status = 200, description = "All albums with track counts", body = [AlbumSummary])
    )
)]
#[get("/api/albums")]
/// List all albums with track counts.
pub async fn albums_list(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.list_albums() {
        Ok(albums) => HttpResponse::Ok().json(albums),
        Err(err) => {
            tracing::error!(error = %err, "list albums failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/albums/{id}",
    params(("id" = i64, Path, description = "Album id")),
    responses(
        (status = 200, description = "Album with its tracks", body = AlbumDetailResponse),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
#[get("/api/albums/{id}")]
/// Fetch one album with its tracks in (disc, track) order.
pub async fn albums_get(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let album = match state.catalog.album_by_id(id) {
        Ok(Some(album)) => album,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("album not found"));
        }
        Err(err) => {
            tracing::error!(error = %err, id, "fetch album failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    let tracks = match state.catalog.album_tracks(id) {
        Ok(tracks) => tracks,
        Err(err) => {
            tracing::error!(error = %err, id, "fetch album tracks failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    HttpResponse::Ok().json(AlbumDetailResponse { album, tracks })
}

#[utoipa::path(
    post,
    path = "/api/albums",
    request_body = AlbumCreateRequest,
    responses(
        (status = 201, description = "Album created", body = AlbumCreatedResponse),
        (status = 400, description = "Title or artist missing", body = ErrorResponse)
    )
)]
#[post("/api/albums")]
/// Create an album under an existing artist.
pub async fn albums_create(
    state: web::Data<AppState>,
    body: web::Json<AlbumCreateRequest>,
) -> impl Responder {
    let title = body.title.trim();
    if title.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("title and artist are required"));
    }
    match state.catalog.create_album(
        title,
        body.artist_id,
        body.year,
        body.genre.as_deref(),
        body.cover_path.as_deref(),
    ) {
        Ok(id) => HttpResponse::Created().json(AlbumCreatedResponse {
            id,
            title: title.to_string(),
        }),
        Err(err) => {
            tracing::error!(error = %err, title, "create album failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/albums/{id}",
    params(("id" = i64, Path, description = "Album id")),
    request_body = AlbumUpdateRequest,
    responses(
        (status = 200, description = "Album updated", body = SuccessResponse),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
#[put("/api/albums/{id}")]
/// Update an album; absent fields are left unchanged.
pub async fn albums_update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AlbumUpdateRequest>,
) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.update_album(
        id,
        body.title.as_deref(),
        body.artist_id,
        body.year,
        body.genre.as_deref(),
        body.cover_path.as_deref(),
    ) {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::new("album not found")),
        Err(err) => {
            tracing::error!(error = %err, id, "update album failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}
