//! Byte-range audio streaming.

use std::path::Path;

use actix_web::body::SizedStream;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::models::ErrorResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/stream/{track_id}",
    params(("track_id" = i64, Path, description = "Track id")),
    responses(
        (status = 200, description = "Full file stream"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "Track or file not found", body = ErrorResponse),
        (status = 416, description = "Invalid range")
    )
)]
#[get("/stream/{track_id}")]
/// Stream a track with HTTP range support. Each request bumps the track's
/// play counter and appends a play-history row.
pub async fn stream_track(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let track_id = path.into_inner();
    let track = match state.catalog.track_by_id(track_id) {
        Ok(Some(track)) => track,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("track not found"));
        }
        Err(err) => {
            tracing::error!(error = %err, track_id, "fetch track failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };

    let file_path = std::path::PathBuf::from(&track.file_path);
    let mut file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        Err(_) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("file not found"));
        }
    };
    let meta = match file.metadata().await {
        Ok(meta) => meta,
        Err(_) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("file not found"));
        }
    };
    let total_len = meta.len();

    let range_header = req
        .headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok());
    let range = match range_header.and_then(|h| parse_single_range(h, total_len)) {
        Some(r) => Some(r),
        None if range_header.is_some() => {
            return HttpResponse::RangeNotSatisfiable()
                .insert_header((header::ACCEPT_RANGES, "bytes"))
                .finish();
        }
        None => None,
    };

    let (start, len, status_code) = if let Some((start, end)) = range {
        let len = end.saturating_sub(start).saturating_add(1);
        (start, len, StatusCode::PARTIAL_CONTENT)
    } else {
        (0, total_len, StatusCode::OK)
    };

    if start > 0 {
        if file.seek(std::io::SeekFrom::Start(start)).await.is_err() {
            return HttpResponse::InternalServerError().finish();
        }
    }

    if let Err(err) = state.catalog.increment_play_count(track_id) {
        tracing::warn!(error = %err, track_id, "play count update failed");
    }

    let stream = ReaderStream::new(file.take(len));
    let body = SizedStream::new(len, stream);

    let mut resp = HttpResponse::build(status_code);
    resp.insert_header((header::ACCEPT_RANGES, "bytes"));
    resp.insert_header((header::CONTENT_TYPE, content_type_for(&file_path)));
    if let Some((start, end)) = range {
        resp.insert_header((
            header::CONTENT_RANGE,
            format!("bytes {start}-{end}/{total_len}"),
        ));
    }
    resp.insert_header((header::CONTENT_LENGTH, len.to_string()));
    resp.body(body)
}

pub(crate) fn parse_single_range(header: &str, total_len: u64) -> Option<(u64, u64)> {
    let header = header.trim();
    if !header.starts_with("bytes=") {
        return None;
    }
    let range = header.trim_start_matches("bytes=");
    let first = range.split(',').next()?;
    let (start_s, end_s) = first.split_once('-')?;
    if start_s.is_empty() {
        return None;
    }
    let start = start_s.parse::<u64>().ok()?;
    let end = if end_s.is_empty() {
        total_len.saturating_sub(1)
    } else {
        end_s.parse::<u64>().ok()?
    };
    if start >= total_len || end < start {
        return None;
    }
    Some((start, end.min(total_len.saturating_sub(1))))
}

pub(crate) fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "wma" => "audio/x-ms-wma",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}
