//! Artist API handlers.

use actix_web::{HttpResponse, Responder, get, post, put, web};

use crate::catalog::ArtistSummary;
use crate::models::{
    ArtistCreateRequest, ArtistCreatedResponse, ArtistDetailResponse, ArtistUpdateRequest,
    ErrorResponse, SuccessResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/artists",
    responses(
        (status = 200, description = "All artists with album/track counts", body = [ArtistSummary])
    )
)]
#[get("/api/artists")]
/// List all artists with album and track counts.
pub async fn artists_list(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.list_artists() {
        Ok(artists) => HttpResponse::Ok().json(artists),
        Err(err) => {
            tracing::error!(error = %err, "list artists failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/artists/{id}",
    params(("id" = i64, Path, description = "Artist id")),
    responses(
        (status = 200, description = "Artist with albums and tracks", body = ArtistDetailResponse),
        (status = 404, description = "Artist not found", body = ErrorResponse)
    )
)]
#[get("/api/artists/{id}")]
/// Fetch one artist with its albums and tracks.
pub async fn artists_get(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let artist = match state.catalog.artist_by_id(id) {
        Ok(Some(artist)) => artist,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("artist not found"));
        }
        Err(err) => {
            tracing::error!(error = %err, id, "fetch artist failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    let albums = match state.catalog.artist_albums(id) {
        Ok(albums) => albums,
        Err(err) => {
            tracing::error!(error = %err, id, "fetch artist albums failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    let tracks = match state.catalog.artist_tracks(id) {
        Ok(tracks) => tracks,
        Err(err) => {
            tracing::error!(error = %err, id, "fetch artist tracks failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    HttpResponse::Ok().json(ArtistDetailResponse {
        artist,
        albums,
        tracks,
    })
}

#[utoipa::path(
    post,
    path = "/api/artists",
    request_body = ArtistCreateRequest,
    responses(
        (status = 201, description = "Artist created", body = ArtistCreatedResponse),
        (status = 400, description = "Name missing", body = ErrorResponse)
    )
)]
#[post("/api/artists")]
/// Create an artist.
pub async fn artists_create(
    state: web::Data<AppState>,
    body: web::Json<ArtistCreateRequest>,
) -> impl Responder {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("name is required"));
    }
    match state.catalog.create_artist(
        name,
        body.sort_name.as_deref(),
        body.biography.as_deref(),
        body.image_path.as_deref(),
    ) {
        Ok(id) => HttpResponse::Created().json(ArtistCreatedResponse {
            id,
            name: name.to_string(),
        }),
        Err(err) => {
            tracing::error!(error = %err, name, "create artist failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/artists/{id}",
    params(("id" = i64, Path, description = "Artist id")),
    request_body = ArtistUpdateRequest,
    responses(
        (status = 200, description = "Artist updated", body = SuccessResponse),
        (status = 404, description = "Artist not found", body = ErrorResponse)
    )
)]
#[put("/api/artists/{id}")]
/// Update an artist; absent fields are left unchanged.
pub async fn artists_update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ArtistUpdateRequest>,
) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.update_artist(
        id,
        body.name.as_deref(),
        body.sort_name.as_deref(),
        body.biography.as_deref(),
        body.image_path.as_deref(),
    ) {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::new("artist not found")),
        Err(err) => {
            tracing::error!(error = %err, id, "update artist failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}
