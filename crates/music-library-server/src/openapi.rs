use utoipa::OpenApi;

use crate::api;
use crate::catalog;
use crate::models;
use crate::status;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health,
        api::artists::artists_list,
        api::artists::artists_get,
        api::artists::artists_create,
        api::artists::artists_update,
        api::albums::albums_list,
        api::albums::albums_get,
        api::albums::albums_create,
        api::albums::albums_update,
        api::tracks::tracks_list,
        api::tracks::tracks_get,
        api::tracks::tracks_top,
        api::tracks::tracks_recent,
        api::playlists::playlists_list,
        api::playlists::playlists_get,
        api::playlists::playlists_create,
        api::playlists::playlists_update,
        api::playlists::playlists_delete,
        api::playlists::playlists_add_track,
        api::playlists::playlists_remove_track,
        api::search::search,
        api::scan::scan_status,
        api::scan::scan_start,
        api::scan::scan_stop,
        api::scan::scan_paths,
        api::scan::scan_paths_add,
        api::scan::scan_paths_remove,
        api::scan::scan_browse,
        api::stream::stream_track,
    ),
    components(
        schemas(
            api::health::HealthResponse,
            catalog::ArtistRow,
            catalog::ArtistSummary,
            catalog::AlbumSummary,
            catalog::TrackSummary,
            catalog::TrackPage,
            catalog::PlaylistSummary,
            catalog::PlaylistTrack,
            status::ScanStatus,
            models::ErrorResponse,
            models::SuccessResponse,
            models::ArtistCreateRequest,
            models::ArtistUpdateRequest,
            models::ArtistCreatedResponse,
            models::ArtistDetailResponse,
            models::AlbumCreateRequest,
            models::AlbumUpdateRequest,
            models::AlbumCreatedResponse,
            models::AlbumDetailResponse,
            models::TrackSearchResponse,
            models::PlaylistCreateRequest,
            models::PlaylistUpdateRequest,
            models::PlaylistCreatedResponse,
            models::PlaylistDetailResponse,
            models::PlaylistAddTrackRequest,
            models::PlaylistAddTrackResponse,
            models::SearchResponse,
            models::ScanStartResponse,
            models::ScanPathsResponse,
            models::ScanPathsUpdateResponse,
            models::PathRequest,
            models::DirectoryEntry,
            models::BrowseResponse,
        )
    ),
    tags(
        (name = "music-library-server", description = "Music library catalog and scan API")
    )
)]
pub struct ApiDoc;
