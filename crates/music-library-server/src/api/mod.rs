//! HTTP API handlers.
//!
//! Defines the Actix routes for the catalog, playlists, search, scanning,
//! and streaming.

pub mod albums;
pub mod artists;
pub mod health;
pub mod playlists;
pub mod scan;
pub mod search;
pub mod stream;
pub mod tracks;

pub use albums::{albums_create, albums_get, albums_list, albums_update};
pub use artists::{artists_create, artists_get, artists_list, artists_update};
pub use playlists::{
    playlists_add_track, playlists_create, playlists_delete, playlists_get, playlists_list,
    playlists_remove_track, playlists_update,
};
pub use scan::{
    scan_browse, scan_paths, scan_paths_add, scan_paths_remove, scan_start, scan_status, scan_stop,
};
pub use stream::stream_track;
pub use tracks::{tracks_get, tracks_list, tracks_recent, tracks_top};

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};

    use crate::api;
    use crate::catalog::{CatalogDb, TrackFields};
    use crate::library::WalkOptions;
    use crate::models::{
        ArtistCreateRequest, ArtistCreatedResponse, PathRequest, PlaylistAddTrackRequest,
        PlaylistAddTrackResponse, PlaylistCreateRequest, PlaylistCreatedResponse,
        ScanPathsResponse, SearchResponse,
    };
    use crate::state::AppState;
    use crate::status::ScanStatusStore;

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "music-library-api-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn make_state() -> web::Data<AppState> {
        let dir = temp_dir();
        let catalog = CatalogDb::new(&dir.join("catalog.sqlite")).expect("open catalog");
        web::Data::new(AppState {
            catalog,
            scan_status: ScanStatusStore::new(),
            settings_path: dir.join("settings.toml"),
            default_paths: Vec::new(),
            walk_options: WalkOptions::default(),
        })
    }

    #[actix_web::test]
    async fn health_ok() {
        let app = test::init_service(App::new().service(api::health::health)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn scan_status_starts_idle() {
        let state = make_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).service(api::scan_status)).await;

        let req = test::TestRequest::get().uri("/api/scan/status").to_request();
        let status: crate::status::ScanStatus = test::call_and_read_body_json(&app, req).await;
        assert!(!status.is_scanning);
        assert_eq!(status.scanned_files, 0);
    }

    #[actix_web::test]
    async fn scan_start_without_paths_is_400() {
        let state = make_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).service(api::scan_start)).await;

        let req = test::TestRequest::post().uri("/api/scan/start").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn scan_start_conflicts_while_running() {
        let state = make_state();
        crate::config::update_scan_paths(&state.settings_path, &["/music".to_string()])
            .expect("seed settings");
        assert!(state.scan_status.try_begin(1));
        state.scan_status.on_file(7, 0, "/music/a.mp3");

        let app =
            test::init_service(App::new().app_data(state.clone()).service(api::scan_start)).await;
        let req = test::TestRequest::post().uri("/api/scan/start").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);

        // The refused start must leave the running scan's counters untouched.
        let snapshot = state.scan_status.snapshot();
        assert!(snapshot.is_scanning);
        assert_eq!(snapshot.scanned_files, 7);
    }

    #[actix_web::test]
    async fn scan_paths_add_list_remove_round_trip() {
        let state = make_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(api::scan_paths)
                .service(api::scan_paths_add)
                .service(api::scan_paths_remove),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/scan/paths").to_request();
        let listed: ScanPathsResponse = test::call_and_read_body_json(&app, req).await;
        assert!(listed.paths.is_empty());
        assert!(listed.formats.contains(&"mp3".to_string()));

        let req = test::TestRequest::post()
            .uri("/api/scan/paths/add")
            .set_json(PathRequest {
                path: Some("/music".to_string()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri("/api/scan/paths/add")
            .set_json(PathRequest {
                path: Some("/music".to_string()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/scan/paths/add")
            .set_json(PathRequest { path: None })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/scan/paths").to_request();
        let listed: ScanPathsResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.paths, vec!["/music".to_string()]);

        let req = test::TestRequest::post()
            .uri("/api/scan/paths/remove")
            .set_json(PathRequest {
                path: Some("/music".to_string()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/scan/paths").to_request();
        let listed: ScanPathsResponse = test::call_and_read_body_json(&app, req).await;
        assert!(listed.paths.is_empty());
    }

    #[actix_web::test]
    async fn scan_browse_lists_directories() {
        let dir = temp_dir();
        std::fs::create_dir_all(dir.join("visible")).unwrap();
        std::fs::create_dir_all(dir.join(".hidden")).unwrap();
        std::fs::write(dir.join("file.mp3"), b"x").unwrap();

        let app = test::init_service(App::new().service(api::scan_browse)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/scan/browse?path={}", dir.display()))
            .to_request();
        let browse: crate::models::BrowseResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(browse.current_path, dir.to_string_lossy());
        assert!(browse.parent_path.is_some());
        assert_eq!(browse.directories.len(), 1);
        assert_eq!(browse.directories[0].name, "visible");
    }

    #[actix_web::test]
    async fn artists_create_fetch_and_update() {
        let state = make_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(api::artists_list)
                .service(api::artists_get)
                .service(api::artists_create)
                .service(api::artists_update),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/artists")
            .set_json(ArtistCreateRequest {
                name: "Art1".to_string(),
                sort_name: None,
                biography: None,
                image_path: None,
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let created: ArtistCreatedResponse = test::read_body_json(resp).await;

        let req = test::TestRequest::get().uri("/api/artists").to_request();
        let artists: Vec<crate::catalog::ArtistSummary> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].sort_name.as_deref(), Some("Art1"));

        let req = test::TestRequest::get()
            .uri(&format!("/api/artists/{}", created.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::put()
            .uri(&format!("/api/artists/{}", created.id))
            .set_json(serde_json::json!({ "biography": "a band" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/artists/9999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn tracks_list_and_missing_track() {
        let state = make_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(api::tracks_list)
                .service(api::tracks_get),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/tracks").to_request();
        let page: crate::catalog::TrackPage = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);

        let req = test::TestRequest::get().uri("/api/tracks/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn playlist_flow_assigns_positions() {
        let state = make_state();
        let track_id = state
            .catalog
            .upsert_track(
                "/music/one.mp3",
                &TrackFields {
                    title: "One".to_string(),
                    ..TrackFields::default()
                },
            )
            .expect("seed track");

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(api::playlists_create)
                .service(api::playlists_get)
                .service(api::playlists_add_track)
                .service(api::playlists_remove_track)
                .service(api::playlists_delete),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/playlists")
            .set_json(PlaylistCreateRequest {
                name: "Mix".to_string(),
                description: None,
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let created: PlaylistCreatedResponse = test::read_body_json(resp).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/playlists/{}/tracks", created.id))
            .set_json(PlaylistAddTrackRequest { track_id })
            .to_request();
        let added: PlaylistAddTrackResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(added.position, 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/playlists/{}", created.id))
            .to_request();
        let detail: crate::models::PlaylistDetailResponse =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail.playlist.track_count, 1);
        assert_eq!(detail.tracks[0].track.id, track_id);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/playlists/{}/tracks/{}", created.id, track_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/playlists/{}", created.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/playlists/{}", created.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn search_short_query_returns_empty() {
        let state = make_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(api::search::search),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/search?q=a").to_request();
        let results: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert!(results.artists.is_empty());
        assert!(results.albums.is_empty());
        assert!(results.tracks.is_empty());
    }

    #[actix_web::test]
    async fn stream_missing_track_is_404() {
        let state = make_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).service(api::stream_track))
                .await;

        let req = test::TestRequest::get().uri("/stream/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn stream_serves_ranges_and_counts_plays() {
        let state = make_state();
        let dir = temp_dir();
        let file_path = dir.join("song.mp3");
        std::fs::write(&file_path, b"abcdefgh").unwrap();
        let track_id = state
            .catalog
            .upsert_track(
                &file_path.to_string_lossy(),
                &TrackFields {
                    title: "Song".to_string(),
                    ..TrackFields::default()
                },
            )
            .expect("seed track");

        let app =
            test::init_service(App::new().app_data(state.clone()).service(api::stream_track))
                .await;

        let req = test::TestRequest::get()
            .uri(&format!("/stream/{track_id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(actix_web::http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("audio/mpeg")
        );
        let body = test::read_body(resp).await;
        assert_eq!(body.as_ref(), b"abcdefgh");

        let req = test::TestRequest::get()
            .uri(&format!("/stream/{track_id}"))
            .insert_header((actix_web::http::header::RANGE, "bytes=2-5"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            resp.headers()
                .get(actix_web::http::header::CONTENT_RANGE)
                .and_then(|v| v.to_str().ok()),
            Some("bytes 2-5/8")
        );
        let body = test::read_body(resp).await;
        assert_eq!(body.as_ref(), b"cdef");

        let req = test::TestRequest::get()
            .uri(&format!("/stream/{track_id}"))
            .insert_header((actix_web::http::header::RANGE, "bytes=99-100"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::RANGE_NOT_SATISFIABLE
        );

        let track = state
            .catalog
            .track_by_id(track_id)
            .unwrap()
            .expect("track exists");
        assert_eq!(track.play_count, 2);
    }
}
