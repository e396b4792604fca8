//! Scan control API handlers.
//!
//! Status polling, scan start/stop, scan-root settings, and the directory
//! browser backing the path-picker UI.

use std::path::PathBuf;

use actix_web::{HttpResponse, Responder, get, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::config;
use crate::library::SUPPORTED_EXTENSIONS;
use crate::models::{
    BrowseResponse, DirectoryEntry, ErrorResponse, PathRequest, ScanPathsResponse,
    ScanPathsUpdateResponse, ScanStartResponse, SuccessResponse,
};
use crate::scanner::{ScanError, Scanner};
use crate::state::AppState;
use crate::status::{ScanStatus, now_ms};

#[utoipa::path(
    get,
    path = "/api/scan/status",
    responses(
        (status = 200, description = "Current scan status snapshot", body = ScanStatus)
    )
)]
#[get("/api/scan/status")]
/// Current scan status snapshot.
pub async fn scan_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.scan_status.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/scan/start",
    responses(
        (status = 200, description = "Scan started; proceeds in the background", body = ScanStartResponse),
        (status = 400, description = "No scan paths configured", body = ErrorResponse),
        (status = 409, description = "A scan is already running", body = ErrorResponse)
    )
)]
#[post("/api/scan/start")]
/// Start a library scan over the configured roots.
pub async fn scan_start(state: web::Data<AppState>) -> impl Responder {
    let paths = match config::load_scan_paths(&state.settings_path, &state.default_paths) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::error!(error = %err, "load scan settings failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    if paths.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new(ScanError::NoPathsConfigured.to_string()));
    }
    if !state.scan_status.try_begin(now_ms()) {
        return HttpResponse::Conflict()
            .json(ErrorResponse::new(ScanError::AlreadyRunning.to_string()));
    }

    let scanner = Scanner::new(
        state.catalog.clone(),
        state.scan_status.clone(),
        state.walk_options,
    );
    let roots: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    let spawned = std::thread::Builder::new()
        .name("library-scan".to_string())
        .spawn(move || {
            scanner.scan_all(&roots);
        });
    if let Err(err) = spawned {
        tracing::error!(error = %err, "spawn scan thread failed");
        state.scan_status.finish(0, 0);
        return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
    }

    HttpResponse::Ok().json(ScanStartResponse {
        message: "scan started".to_string(),
        status: state.scan_status.snapshot(),
        paths,
    })
}

#[utoipa::path(
    post,
    path = "/api/scan/stop",
    responses(
        (status = 200, description = "Cancellation requested; the scan stops at the next file", body = SuccessResponse)
    )
)]
#[post("/api/scan/stop")]
/// Ask the running scan to stop. Progress already committed stays.
pub async fn scan_stop(state: web::Data<AppState>) -> impl Responder {
    let was_running = state.scan_status.request_cancel();
    HttpResponse::Ok().json(SuccessResponse {
        success: was_running,
    })
}

#[utoipa::path(
    get,
    path = "/api/scan/paths",
    responses(
        (status = 200, description = "Configured roots and supported formats", body = ScanPathsResponse)
    )
)]
#[get("/api/scan/paths")]
/// List the configured scan roots and the supported extensions.
pub async fn scan_paths(state: web::Data<AppState>) -> impl Responder {
    match config::load_scan_paths(&state.settings_path, &state.default_paths) {
        Ok(paths) => HttpResponse::Ok().json(ScanPathsResponse {
            paths,
            formats: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }),
        Err(err) => {
            tracing::error!(error = %err, "load scan settings failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new("server error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/scan/paths/add",
    request_body = PathRequest,
    responses(
        (status = 200, description = "Updated root list", body = ScanPathsUpdateResponse),
        (status = 400, description = "Path missing or already configured", body = ErrorResponse)
    )
)]
#[post("/api/scan/paths/add")]
/// Append a scan root. Exact duplicates are rejected.
pub async fn scan_paths_add(
    state: web::Data<AppState>,
    body: web::Json<PathRequest>,
) -> impl Responder {
    let Some(new_path) = body
        .path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    else {
        return HttpResponse::BadRequest().json(ErrorResponse::new("path is required"));
    };

    let mut paths = match config::load_scan_paths(&state.settings_path, &state.default_paths) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::error!(error = %err, "load scan settings failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    if paths.iter().any(|p| p == new_path) {
        return HttpResponse::BadRequest().json(ErrorResponse::new("path already configured"));
    }
    paths.push(new_path.to_string());

    if let Err(err) = config::update_scan_paths(&state.settings_path, &paths) {
        tracing::error!(error = %err, "write scan settings failed");
        return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
    }
    HttpResponse::Ok().json(ScanPathsUpdateResponse {
        success: true,
        paths,
    })
}

#[utoipa::path(
    post,
    path = "/api/scan/paths/remove",
    request_body = PathRequest,
    responses(
        (status = 200, description = "Updated root list", body = ScanPathsUpdateResponse),
        (status = 400, description = "Path missing", body = ErrorResponse)
    )
)]
#[post("/api/scan/paths/remove")]
/// Remove a scan root by exact string match.
pub async fn scan_paths_remove(
    state: web::Data<AppState>,
    body: web::Json<PathRequest>,
) -> impl Responder {
    let Some(remove) = body
        .path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    else {
        return HttpResponse::BadRequest().json(ErrorResponse::new("path is required"));
    };

    let mut paths = match config::load_scan_paths(&state.settings_path, &state.default_paths) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::error!(error = %err, "load scan settings failed");
            return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
        }
    };
    paths.retain(|p| p != remove);

    if let Err(err) = config::update_scan_paths(&state.settings_path, &paths) {
        tracing::error!(error = %err, "write scan settings failed");
        return HttpResponse::InternalServerError().json(ErrorResponse::new("server error"));
    }
    HttpResponse::Ok().json(ScanPathsUpdateResponse {
        success: true,
        paths,
    })
}

/// Browse query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BrowseQuery {
    /// Directory to list; defaults to the home directory.
    #[serde(default)]
    pub path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/scan/browse",
    params(BrowseQuery),
    responses(
        (status = 200, description = "Subdirectories of the requested path", body = BrowseResponse),
        (status = 500, description = "Directory unreadable", body = ErrorResponse)
    )
)]
#[get("/api/scan/browse")]
/// List subdirectories of a path for the path-picker UI.
pub async fn scan_browse(query: web::Query<BrowseQuery>) -> impl Responder {
    let target = query
        .path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(home_dir);

    let entries = match std::fs::read_dir(&target) {
        Ok(entries) => entries,
        Err(err) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new(err.to_string()));
        }
    };

    let mut directories = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        directories.push(DirectoryEntry {
            path: entry.path().to_string_lossy().to_string(),
            name,
        });
    }
    directories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let parent_path = target.parent().map(|p| p.to_string_lossy().to_string());
    HttpResponse::Ok().json(BrowseResponse {
        current_path: target.to_string_lossy().to_string(),
        parent_path,
        directories,
    })
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}
