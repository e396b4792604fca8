//! API models and OpenAPI schemas.
//!
//! Request/response structures for the library server API. Catalog row
//! types (`ArtistRow`, `TrackSummary`, ...) serialize directly; this module
//! holds the envelopes and request payloads around them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{AlbumSummary, ArtistRow, PlaylistSummary, PlaylistTrack, TrackSummary};
use crate::status::ScanStatus;

/// Error payload used across the API.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Generic success acknowledgement.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

// --- artists -----------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtistCreateRequest {
    pub name: String,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtistUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtistCreatedResponse {
    pub id: i64,
    pub name: String,
}

/// Artist detail: the artist plus its albums and tracks.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtistDetailResponse {
    pub artist: ArtistRow,
    pub albums: Vec<AlbumSummary>,
    pub tracks: Vec<TrackSummary>,
}

// --- albums ------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AlbumCreateRequest {
    pub title: String,
    pub artist_id: i64,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub cover_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AlbumUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_id: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub cover_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AlbumCreatedResponse {
    pub id: i64,
    pub title: String,
}

/// Album detail: the album plus its tracks in (disc, track) order.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AlbumDetailResponse {
    pub album: AlbumSummary,
    pub tracks: Vec<TrackSummary>,
}

// --- tracks ------------------------------------------------------------

/// Track search results (no pagination; capped by the store).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackSearchResponse {
    pub tracks: Vec<TrackSummary>,
    pub total: i64,
}

// --- playlists ---------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistCreateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistCreatedResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistDetailResponse {
    pub playlist: PlaylistSummary,
    pub tracks: Vec<PlaylistTrack>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistAddTrackRequest {
    pub track_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistAddTrackResponse {
    pub success: bool,
    /// Position assigned to the appended track.
    pub position: i64,
}

// --- search ------------------------------------------------------------

/// Global search results across all entity kinds.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub artists: Vec<ArtistRow>,
    pub albums: Vec<AlbumSummary>,
    pub tracks: Vec<TrackSummary>,
}

// --- scan --------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanStartResponse {
    pub message: String,
    pub status: ScanStatus,
    pub paths: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanPathsResponse {
    /// Configured scan roots.
    pub paths: Vec<String>,
    /// Compiled-in supported extensions.
    pub formats: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanPathsUpdateResponse {
    pub success: bool,
    pub paths: Vec<String>,
}

/// Scan path add/remove payload.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PathRequest {
    #[serde(default)]
    pub path: Option<String>,
}

/// One directory entry in a browse listing.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
}

/// Directory listing for the path-picker UI.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub current_path: String,
    pub parent_path: Option<String>,
    pub directories: Vec<DirectoryEntry>,
}
