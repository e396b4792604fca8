//! Actix server startup + app wiring.
//!
//! Builds the shared state, routes, middleware, and OpenAPI endpoints.

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpServer, web};
use anyhow::Result;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::catalog::CatalogDb;
use crate::config;
use crate::openapi;
use crate::state::AppState;
use crate::status::ScanStatusStore;

/// Build server state and start the Actix HTTP server.
pub(crate) async fn run(args: crate::Args) -> Result<()> {
    let config_path = resolve_config_path(args.config);
    let cfg = match config_path.as_ref() {
        Some(path) => config::ServerConfig::load(path)?,
        None => config::ServerConfig::default(),
    };
    let bind = resolve_bind(args.bind, &cfg)?;
    let db_path = args
        .database
        .unwrap_or_else(|| config::database_path_from_config(&cfg));
    let settings_path = config::settings_path_from_config(&cfg, config_path.as_deref());
    let walk_options = config::walk_options_from_config(&cfg);
    let default_paths = cfg.music_paths.clone().unwrap_or_default();

    tracing::info!(
        bind = %bind,
        database = %db_path.display(),
        settings = %settings_path.display(),
        "starting music-library-server"
    );

    let catalog = CatalogDb::new(&db_path)?;
    let scan_status = ScanStatusStore::new();

    let web_dir = locate_web_dir(cfg.web_dir.as_deref());
    if let Some(dir) = web_dir.as_ref() {
        tracing::info!(path = %dir.display(), "static frontend enabled");
    } else {
        tracing::info!("static frontend disabled (no public directory found)");
    }

    let state = web::Data::new(AppState {
        catalog,
        scan_status,
        settings_path,
        default_paths,
        walk_options,
    });
    setup_shutdown();

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let mut app = App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(FilteredLogger)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", openapi::ApiDoc::openapi()),
            )
            .service(api::health::health)
            .service(api::artists_list)
            .service(api::artists_create)
            .service(api::artists_get)
            .service(api::artists_update)
            .service(api::albums_list)
            .service(api::albums_create)
            .service(api::albums_get)
            .service(api::albums_update)
            .service(api::tracks_top)
            .service(api::tracks_recent)
            .service(api::tracks_list)
            .service(api::tracks_get)
            .service(api::playlists_list)
            .service(api::playlists_create)
            .service(api::playlists_get)
            .service(api::playlists_update)
            .service(api::playlists_delete)
            .service(api::playlists_add_track)
            .service(api::playlists_remove_track)
            .service(api::search::search)
            .service(api::scan_status)
            .service(api::scan_start)
            .service(api::scan_stop)
            .service(api::scan_paths)
            .service(api::scan_paths_add)
            .service(api::scan_paths_remove)
            .service(api::scan_browse)
            .service(api::stream_track);

        if let Some(dir) = web_dir.clone() {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }

        app
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

/// Resolve the config file path: explicit flag, else a `config.toml` in the
/// working directory or next to the executable when one exists.
fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let mut candidates = Vec::new();
    if let Ok(dir) = std::env::current_dir() {
        candidates.push(dir.join("config.toml"));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            candidates.push(parent.join("config.toml"));
        }
    }
    candidates.into_iter().find(|path| path.exists())
}

/// Resolve the final bind address from args + config.
fn resolve_bind(
    bind: Option<std::net::SocketAddr>,
    cfg: &config::ServerConfig,
) -> Result<std::net::SocketAddr> {
    Ok(match bind {
        Some(addr) => addr,
        None => config::bind_from_config(cfg)?
            .unwrap_or_else(|| "0.0.0.0:3001".parse().expect("default bind")),
    })
}

/// Find the static frontend directory, if any.
fn locate_web_dir(configured: Option<&str>) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = configured.map(str::trim).filter(|d| !d.is_empty()) {
        candidates.push(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::current_dir() {
        candidates.push(dir.join("public"));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            candidates.push(parent.join("public"));
        }
    }
    candidates.into_iter().find(|path| path.is_dir())
}

/// Install Ctrl+C handler to stop the server cleanly.
fn setup_shutdown() {
    let _ = ctrlc::set_handler(move || {
        if let Some(system) = actix_web::rt::System::try_current() {
            system.stop();
        } else {
            std::process::exit(0);
        }
    });
}

/// Return true when the request path should be logged.
fn should_log_path(path: &str) -> bool {
    if path == "/api/scan/status" {
        return false;
    }
    if path.starts_with("/stream/") {
        return false;
    }
    true
}

/// Actix middleware that filters high-frequency polling paths from logging.
struct FilteredLogger;

impl<S, B> actix_web::dev::Transform<S, ServiceRequest> for FilteredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = FilteredLoggerMiddleware<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(FilteredLoggerMiddleware { service }))
    }
}

/// Service wrapper that applies the logging filter.
struct FilteredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for FilteredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();
        let should_log = should_log_path(&path);
        let method = req.method().clone();
        let peer = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();
        let start = std::time::Instant::now();
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            if should_log {
                tracing::info!(
                    method = %method,
                    path = %path,
                    status = %res.status().as_u16(),
                    peer = %peer,
                    elapsed_ms = %start.elapsed().as_millis(),
                    "http request"
                );
            }
            Ok(res)
        })
    }
}
