//! SQLite catalog for artists/albums/tracks/playlists.
//!
//! Provides pooled connections and schema bootstrap. Entity identity is a
//! natural key: artist name, (album title, artist), track file path.

use std::path::Path;

use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const SCHEMA_VERSION: i32 = 1;

#[derive(Clone)]
pub struct CatalogDb {
    pool: Pool<SqliteConnectionManager>,
}

/// Descriptive track fields written by an upsert. Play statistics and the
/// creation stamp are owned by the catalog and survive rescans.
#[derive(Clone, Debug)]
pub struct TrackFields {
    pub title: String,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub duration: Option<i64>,
    pub track_number: Option<i64>,
    pub disc_number: i64,
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i64>,
    pub format: Option<String>,
    pub file_size: Option<i64>,
}

impl Default for TrackFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist_id: None,
            album_id: None,
            duration: None,
            track_number: None,
            disc_number: 1,
            bitrate: None,
            sample_rate: None,
            format: None,
            file_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArtistRow {
    pub id: i64,
    pub name: String,
    pub sort_name: Option<String>,
    pub biography: Option<String>,
    pub image_path: Option<String>,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArtistSummary {
    pub id: i64,
    pub name: String,
    pub sort_name: Option<String>,
    pub biography: Option<String>,
    pub image_path: Option<String>,
    pub album_count: i64,
    pub track_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlbumSummary {
    pub id: i64,
    pub title: String,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub cover_path: Option<String>,
    pub track_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackSummary {
    pub id: i64,
    pub title: String,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub artist_name: Option<String>,
    pub album_title: Option<String>,
    pub file_path: String,
    /// Whole seconds.
    pub duration: Option<i64>,
    pub track_number: Option<i64>,
    pub disc_number: i64,
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i64>,
    pub format: Option<String>,
    pub file_size: Option<i64>,
    pub play_count: i64,
    pub last_played_ms: Option<i64>,
    pub created_at_ms: i64,
}

/// One page of the track listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackPage {
    pub tracks: Vec<TrackSummary>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaylistSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub track_count: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// A playlist entry: the track plus its position in the list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaylistTrack {
    pub position: i64,
    pub added_at_ms: i64,
    pub track: TrackSummary,
}

const TRACK_SELECT: &str = r#"
    SELECT t.id, t.title, t.artist_id, t.album_id, ar.name, al.title, t.file_path,
           t.duration, t.track_number, t.disc_number, t.bitrate, t.sample_rate,
           t.format, t.file_size, t.play_count, t.last_played_ms, t.created_at_ms
    FROM tracks t
    LEFT JOIN artists ar ON ar.id = t.artist_id
    LEFT JOIN albums al ON al.id = t.album_id
"#;

fn map_track_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TrackSummary> {
    Ok(TrackSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        artist_id: row.get(2)?,
        album_id: row.get(3)?,
        artist_name: row.get(4)?,
        album_title: row.get(5)?,
        file_path: row.get(6)?,
        duration: row.get(7)?,
        track_number: row.get(8)?,
        disc_number: row.get(9)?,
        bitrate: row.get(10)?,
        sample_rate: row.get(11)?,
        format: row.get(12)?,
        file_size: row.get(13)?,
        play_count: row.get(14)?,
        last_played_ms: row.get(15)?,
        created_at_ms: row.get(16)?,
    })
}

fn map_artist_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtistRow> {
    Ok(ArtistRow {
        id: row.get(0)?,
        name: row.get(1)?,
        sort_name: row.get(2)?,
        biography: row.get(3)?,
        image_path: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}

fn map_album_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AlbumSummary> {
    Ok(AlbumSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        artist_id: row.get(2)?,
        artist_name: row.get(3)?,
        year: row.get(4)?,
        genre: row.get(5)?,
        cover_path: row.get(6)?,
        track_count: row.get(7)?,
    })
}

const ALBUM_SELECT: &str = r#"
    SELECT al.id, al.title, al.artist_id, ar.name, al.year, al.genre,
           al.cover_path, COUNT(t.id) AS track_count
    FROM albums al
    LEFT JOIN artists ar ON ar.id = al.artist_id
    LEFT JOIN tracks t ON t.album_id = al.id
"#;

impl CatalogDb {
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create catalog dir {:?}", parent))?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .context("create catalog db pool")?;

        {
            let conn = pool.get().context("open catalog db")?;
            init_schema(&conn)?;
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<SqliteConnectionManager> {
        &self.pool
    }

    // --- scanner-facing operations -------------------------------------

    /// Find-or-create an artist by name. Idempotent; repeated calls with the
    /// same name return the same id.
    pub fn ensure_artist(&self, name: &str) -> Result<i64> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.execute(
            "INSERT OR IGNORE INTO artists (name, sort_name, created_at_ms) VALUES (?1, ?1, ?2)",
            params![name, now_ms()],
        )
        .context("upsert artist")?;
        let id: i64 = conn.query_row(
            "SELECT id FROM artists WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Find-or-create an album by (title, artist). The same title under a
    /// different artist is a distinct album.
    pub fn ensure_album(
        &self,
        title: &str,
        artist_id: i64,
        year: Option<i64>,
        genre: Option<&str>,
    ) -> Result<i64> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.execute(
            "INSERT OR IGNORE INTO albums (title, artist_id, year, genre, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![title, artist_id, year, genre, now_ms()],
        )
        .context("upsert album")?;
        let id: i64 = conn.query_row(
            "SELECT id FROM albums WHERE title = ?1 AND artist_id IS ?2",
            params![title, artist_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Look up a track id by its file path.
    pub fn find_track_by_path(&self, file_path: &str) -> Result<Option<i64>> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.query_row(
            "SELECT id FROM tracks WHERE file_path = ?1",
            params![file_path],
            |row| row.get(0),
        )
        .optional()
        .context("find track by path")
    }

    /// Create-or-overwrite the track at `file_path`. All descriptive fields
    /// are replaced; play statistics and the creation stamp are kept.
    pub fn upsert_track(&self, file_path: &str, fields: &TrackFields) -> Result<i64> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.execute(
            r#"
            INSERT INTO tracks (
                title, artist_id, album_id, file_path, duration, track_number,
                disc_number, bitrate, sample_rate, format, file_size, created_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(file_path) DO UPDATE SET
                title = excluded.title,
                artist_id = excluded.artist_id,
                album_id = excluded.album_id,
                duration = excluded.duration,
                track_number = excluded.track_number,
                disc_number = excluded.disc_number,
                bitrate = excluded.bitrate,
                sample_rate = excluded.sample_rate,
                format = excluded.format,
                file_size = excluded.file_size
            "#,
            params![
                fields.title,
                fields.artist_id,
                fields.album_id,
                file_path,
                fields.duration,
                fields.track_number,
                fields.disc_number,
                fields.bitrate,
                fields.sample_rate,
                fields.format,
                fields.file_size,
                now_ms()
            ],
        )
        .context("upsert track")?;
        let id: i64 = conn.query_row(
            "SELECT id FROM tracks WHERE file_path = ?1",
            params![file_path],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    // --- artists -------------------------------------------------------

    pub fn list_artists(&self) -> Result<Vec<ArtistSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.id, a.name, a.sort_name, a.biography, a.image_path,
                   COUNT(DISTINCT al.id) AS album_count,
                   COUNT(DISTINCT t.id) AS track_count
            FROM artists a
            LEFT JOIN albums al ON al.artist_id = a.id
            LEFT JOIN tracks t ON t.artist_id = a.id
            GROUP BY a.id
            ORDER BY a.sort_name, a.name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ArtistSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                sort_name: row.get(2)?,
                biography: row.get(3)?,
                image_path: row.get(4)?,
                album_count: row.get(5)?,
                track_count: row.get(6)?,
            })
        })?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn artist_by_id(&self, id: i64) -> Result<Option<ArtistRow>> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.query_row(
            "SELECT id, name, sort_name, biography, image_path, created_at_ms
             FROM artists WHERE id = ?1",
            params![id],
            map_artist_row,
        )
        .optional()
        .context("select artist by id")
    }

    pub fn create_artist(
        &self,
        name: &str,
        sort_name: Option<&str>,
        biography: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<i64> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.execute(
            "INSERT INTO artists (name, sort_name, biography, image_path, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, sort_name.unwrap_or(name), biography, image_path, now_ms()],
        )
        .context("insert artist")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_artist(
        &self,
        id: i64,
        name: Option<&str>,
        sort_name: Option<&str>,
        biography: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<bool> {
        let conn = self.pool.get().context("open catalog db")?;
        let updated = conn
            .execute(
                r#"
                UPDATE artists SET
                    name = COALESCE(?1, name),
                    sort_name = COALESCE(?2, sort_name),
                    biography = COALESCE(?3, biography),
                    image_path = COALESCE(?4, image_path)
                WHERE id = ?5
                "#,
                params![name, sort_name, biography, image_path, id],
            )
            .context("update artist")?;
        Ok(updated > 0)
    }

    pub fn artist_albums(&self, artist_id: i64) -> Result<Vec<AlbumSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(&format!(
            "{ALBUM_SELECT} WHERE al.artist_id = ?1 GROUP BY al.id ORDER BY al.year DESC"
        ))?;
        let rows = stmt.query_map(params![artist_id], map_album_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn artist_tracks(&self, artist_id: i64) -> Result<Vec<TrackSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(&format!(
            "{TRACK_SELECT} WHERE t.artist_id = ?1 ORDER BY t.title"
        ))?;
        let rows = stmt.query_map(params![artist_id], map_track_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn search_artists(&self, query: &str) -> Result<Vec<ArtistRow>> {
        let conn = self.pool.get().context("open catalog db")?;
        let like = format!("%{}%", query.to_lowercase());
        let mut stmt = conn.prepare(
            "SELECT id, name, sort_name, biography, image_path, created_at_ms
             FROM artists WHERE LOWER(name) LIKE ?1 ORDER BY name LIMIT 20",
        )?;
        let rows = stmt.query_map(params![like], map_artist_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    // --- albums --------------------------------------------------------

    pub fn list_albums(&self) -> Result<Vec<AlbumSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt =
            conn.prepare(&format!("{ALBUM_SELECT} GROUP BY al.id ORDER BY al.title"))?;
        let rows = stmt.query_map([], map_album_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn album_by_id(&self, id: i64) -> Result<Option<AlbumSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.query_row(
            &format!("{ALBUM_SELECT} WHERE al.id = ?1 GROUP BY al.id"),
            params![id],
            map_album_row,
        )
        .optional()
        .context("select album by id")
    }

    pub fn create_album(
        &self,
        title: &str,
        artist_id: i64,
        year: Option<i64>,
        genre: Option<&str>,
        cover_path: Option<&str>,
    ) -> Result<i64> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.execute(
            "INSERT INTO albums (title, artist_id, year, genre, cover_path, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![title, artist_id, year, genre, cover_path, now_ms()],
        )
        .context("insert album")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_album(
        &self,
        id: i64,
        title: Option<&str>,
        artist_id: Option<i64>,
        year: Option<i64>,
        genre: Option<&str>,
        cover_path: Option<&str>,
    ) -> Result<bool> {
        let conn = self.pool.get().context("open catalog db")?;
        let updated = conn
            .execute(
                r#"
                UPDATE albums SET
                    title = COALESCE(?1, title),
                    artist_id = COALESCE(?2, artist_id),
                    year = COALESCE(?3, year),
                    genre = COALESCE(?4, genre),
                    cover_path = COALESCE(?5, cover_path)
                WHERE id = ?6
                "#,
                params![title, artist_id, year, genre, cover_path, id],
            )
            .context("update album")?;
        Ok(updated > 0)
    }

    pub fn album_tracks(&self, album_id: i64) -> Result<Vec<TrackSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(&format!(
            "{TRACK_SELECT} WHERE t.album_id = ?1
             ORDER BY t.disc_number, COALESCE(t.track_number, 0), t.title"
        ))?;
        let rows = stmt.query_map(params![album_id], map_track_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn search_albums(&self, query: &str) -> Result<Vec<AlbumSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let like = format!("%{}%", query.to_lowercase());
        let mut stmt = conn.prepare(&format!(
            "{ALBUM_SELECT} WHERE LOWER(al.title) LIKE ?1 GROUP BY al.id ORDER BY al.title LIMIT 20"
        ))?;
        let rows = stmt.query_map(params![like], map_album_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    // --- tracks --------------------------------------------------------

    pub fn list_tracks(&self, page: i64, limit: i64) -> Result<TrackPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 500);
        let offset = (page - 1) * limit;

        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(&format!(
            "{TRACK_SELECT} ORDER BY t.title LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![limit, offset], map_track_row)?;
        let tracks: Vec<TrackSummary> = rows.filter_map(Result::ok).collect();

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Ok(TrackPage {
            tracks,
            total,
            page,
            pages,
        })
    }

    pub fn track_by_id(&self, id: i64) -> Result<Option<TrackSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.query_row(
            &format!("{TRACK_SELECT} WHERE t.id = ?1"),
            params![id],
            map_track_row,
        )
        .optional()
        .context("select track by id")
    }

    pub fn search_tracks(&self, query: &str) -> Result<Vec<TrackSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let like = format!("%{}%", query.to_lowercase());
        let mut stmt = conn.prepare(&format!(
            "{TRACK_SELECT} WHERE LOWER(t.title) LIKE ?1 OR LOWER(ar.name) LIKE ?1
             ORDER BY t.title LIMIT 50"
        ))?;
        let rows = stmt.query_map(params![like], map_track_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn top_played_tracks(&self, limit: i64) -> Result<Vec<TrackSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(&format!(
            "{TRACK_SELECT} WHERE t.play_count > 0
             ORDER BY t.play_count DESC, t.last_played_ms DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], map_track_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn recent_tracks(&self, limit: i64) -> Result<Vec<TrackSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(&format!(
            "{TRACK_SELECT} ORDER BY t.created_at_ms DESC, t.id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], map_track_row)?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    /// Bump the play counter, stamp last-played, and append a history row.
    pub fn increment_play_count(&self, track_id: i64) -> Result<bool> {
        let mut conn = self.pool.get().context("open catalog db")?;
        let tx = conn.transaction().context("begin catalog tx")?;
        let now = now_ms();
        let updated = tx
            .execute(
                "UPDATE tracks SET play_count = play_count + 1, last_played_ms = ?1 WHERE id = ?2",
                params![now, track_id],
            )
            .context("update play count")?;
        if updated > 0 {
            tx.execute(
                "INSERT INTO play_history (track_id, played_at_ms) VALUES (?1, ?2)",
                params![track_id, now],
            )
            .context("append play history")?;
        }
        tx.commit().context("commit catalog tx")?;
        Ok(updated > 0)
    }

    // --- playlists -----------------------------------------------------

    pub fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.name, p.description, COUNT(pt.id) AS track_count,
                   p.created_at_ms, p.updated_at_ms
            FROM playlists p
            LEFT JOIN playlist_tracks pt ON pt.playlist_id = p.id
            GROUP BY p.id
            ORDER BY p.name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PlaylistSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                track_count: row.get(3)?,
                created_at_ms: row.get(4)?,
                updated_at_ms: row.get(5)?,
            })
        })?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    pub fn playlist_by_id(&self, id: i64) -> Result<Option<PlaylistSummary>> {
        let conn = self.pool.get().context("open catalog db")?;
        conn.query_row(
            r#"
            SELECT p.id, p.name, p.description, COUNT(pt.id) AS track_count,
                   p.created_at_ms, p.updated_at_ms
            FROM playlists p
            LEFT JOIN playlist_tracks pt ON pt.playlist_id = p.id
            WHERE p.id = ?1
            GROUP BY p.id
            "#,
            params![id],
            |row| {
                Ok(PlaylistSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    track_count: row.get(3)?,
                    created_at_ms: row.get(4)?,
                    updated_at_ms: row.get(5)?,
                })
            },
        )
        .optional()
        .context("select playlist by id")
    }

    pub fn create_playlist(&self, name: &str, description: Option<&str>) -> Result<i64> {
        let conn = self.pool.get().context("open catalog db")?;
        let now = now_ms();
        conn.execute(
            "INSERT INTO playlists (name, description, created_at_ms, updated_at_ms)
             VALUES (?1, ?2, ?3, ?3)",
            params![name, description, now],
        )
        .context("insert playlist")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_playlist(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let conn = self.pool.get().context("open catalog db")?;
        let updated = conn
            .execute(
                "UPDATE playlists SET
                     name = COALESCE(?1, name),
                     description = COALESCE(?2, description),
                     updated_at_ms = ?3
                 WHERE id = ?4",
                params![name, description, now_ms(), id],
            )
            .context("update playlist")?;
        Ok(updated > 0)
    }

    pub fn delete_playlist(&self, id: i64) -> Result<bool> {
        let conn = self.pool.get().context("open catalog db")?;
        let deleted = conn
            .execute("DELETE FROM playlists WHERE id = ?1", params![id])
            .context("delete playlist")?;
        Ok(deleted > 0)
    }

    pub fn playlist_tracks(&self, playlist_id: i64) -> Result<Vec<PlaylistTrack>> {
        let conn = self.pool.get().context("open catalog db")?;
        let mut stmt = conn.prepare(
            r#"
            SELECT pt.position, pt.added_at_ms,
                   t.id, t.title, t.artist_id, t.album_id, ar.name, al.title, t.file_path,
                   t.duration, t.track_number, t.disc_number, t.bitrate, t.sample_rate,
                   t.format, t.file_size, t.play_count, t.last_played_ms, t.created_at_ms
            FROM playlist_tracks pt
            JOIN tracks t ON t.id = pt.track_id
            LEFT JOIN artists ar ON ar.id = t.artist_id
            LEFT JOIN albums al ON al.id = t.album_id
            WHERE pt.playlist_id = ?1
            ORDER BY pt.position
            "#,
        )?;
        let rows = stmt.query_map(params![playlist_id], |row| {
            Ok(PlaylistTrack {
                position: row.get(0)?,
                added_at_ms: row.get(1)?,
                track: TrackSummary {
                    id: row.get(2)?,
                    title: row.get(3)?,
                    artist_id: row.get(4)?,
                    album_id: row.get(5)?,
                    artist_name: row.get(6)?,
                    album_title: row.get(7)?,
                    file_path: row.get(8)?,
                    duration: row.get(9)?,
                    track_number: row.get(10)?,
                    disc_number: row.get(11)?,
                    bitrate: row.get(12)?,
                    sample_rate: row.get(13)?,
                    format: row.get(14)?,
                    file_size: row.get(15)?,
                    play_count: row.get(16)?,
                    last_played_ms: row.get(17)?,
                    created_at_ms: row.get(18)?,
                },
            })
        })?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    /// Append a track at (current max position) + 1 and return the position.
    pub fn add_playlist_track(&self, playlist_id: i64, track_id: i64) -> Result<i64> {
        let mut conn = self.pool.get().context("open catalog db")?;
        let tx = conn.transaction().context("begin catalog tx")?;
        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM playlist_tracks WHERE playlist_id = ?1",
            params![playlist_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at_ms)
             VALUES (?1, ?2, ?3, ?4)",
            params![playlist_id, track_id, position, now_ms()],
        )
        .context("insert playlist track")?;
        tx.commit().context("commit catalog tx")?;
        Ok(position)
    }

    pub fn remove_playlist_track(&self, playlist_id: i64, track_id: i64) -> Result<bool> {
        let conn = self.pool.get().context("open catalog db")?;
        let removed = conn
            .execute(
                "DELETE FROM playlist_tracks WHERE playlist_id = ?1 AND track_id = ?2",
                params![playlist_id, track_id],
            )
            .context("delete playlist track")?;
        Ok(removed > 0)
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            sort_name TEXT,
            biography TEXT,
            image_path TEXT,
            created_at_ms INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            artist_id INTEGER,
            year INTEGER,
            genre TEXT,
            cover_path TEXT,
            created_at_ms INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(artist_id) REFERENCES artists(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            artist_id INTEGER,
            album_id INTEGER,
            file_path TEXT NOT NULL UNIQUE,
            duration INTEGER,
            track_number INTEGER,
            disc_number INTEGER NOT NULL DEFAULT 1,
            bitrate INTEGER,
            sample_rate INTEGER,
            format TEXT,
            file_size INTEGER,
            play_count INTEGER NOT NULL DEFAULT 0,
            last_played_ms INTEGER,
            created_at_ms INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(artist_id) REFERENCES artists(id) ON DELETE SET NULL,
            FOREIGN KEY(album_id) REFERENCES albums(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            created_at_ms INTEGER NOT NULL DEFAULT 0,
            updated_at_ms INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS playlist_tracks (
            id INTEGER PRIMARY KEY,
            playlist_id INTEGER NOT NULL,
            track_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            added_at_ms INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(playlist_id) REFERENCES playlists(id) ON DELETE CASCADE,
            FOREIGN KEY(track_id) REFERENCES tracks(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS play_history (
            id INTEGER PRIMARY KEY,
            track_id INTEGER NOT NULL,
            played_at_ms INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(track_id) REFERENCES tracks(id) ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_artists_name ON artists(name);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_albums_title_artist ON albums(title, artist_id);
        CREATE INDEX IF NOT EXISTS idx_tracks_title ON tracks(title);
        CREATE INDEX IF NOT EXISTS idx_tracks_artist_id ON tracks(artist_id);
        CREATE INDEX IF NOT EXISTS idx_tracks_album_id ON tracks(album_id);
        CREATE INDEX IF NOT EXISTS idx_albums_artist_id ON albums(artist_id);
        CREATE INDEX IF NOT EXISTS idx_playlist_tracks_playlist ON playlist_tracks(playlist_id);
        CREATE INDEX IF NOT EXISTS idx_play_history_track ON play_history(track_id);
        "#,
    )
    .context("create catalog schema")?;

    let version_raw: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if version_raw.is_none() {
        conn.execute(
            "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )
        .context("insert schema version")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db() -> CatalogDb {
        let dir = std::env::temp_dir().join(format!(
            "music-library-catalog-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        CatalogDb::new(&dir.join("catalog.sqlite")).expect("open catalog")
    }

    fn fields(title: &str, artist_id: Option<i64>, album_id: Option<i64>) -> TrackFields {
        TrackFields {
            title: title.to_string(),
            artist_id,
            album_id,
            duration: Some(180),
            format: Some("MP3".to_string()),
            file_size: Some(1024),
            ..TrackFields::default()
        }
    }

    #[test]
    fn ensure_artist_is_idempotent() {
        let db = temp_db();
        let first = db.ensure_artist("Art1").unwrap();
        let second = db.ensure_artist("Art1").unwrap();
        assert_eq!(first, second);
        assert_eq!(db.list_artists().unwrap().len(), 1);
    }

    #[test]
    fn same_album_title_is_distinct_per_artist() {
        let db = temp_db();
        let a1 = db.ensure_artist("Art1").unwrap();
        let a2 = db.ensure_artist("Art2").unwrap();
        let alb1 = db.ensure_album("Greatest Hits", a1, None, None).unwrap();
        let alb2 = db.ensure_album("Greatest Hits", a2, None, None).unwrap();
        assert_ne!(alb1, alb2);
        assert_eq!(db.ensure_album("Greatest Hits", a1, None, None).unwrap(), alb1);
    }

    #[test]
    fn upsert_track_overwrites_in_place() {
        let db = temp_db();
        let artist = db.ensure_artist("Art1").unwrap();
        let album = db.ensure_album("Alb1", artist, None, None).unwrap();

        let id = db
            .upsert_track("/music/a.mp3", &fields("Song1", Some(artist), Some(album)))
            .unwrap();
        let again = db
            .upsert_track(
                "/music/a.mp3",
                &fields("Song1-Renamed", Some(artist), Some(album)),
            )
            .unwrap();
        assert_eq!(id, again);

        let track = db.track_by_id(id).unwrap().expect("track exists");
        assert_eq!(track.title, "Song1-Renamed");
        assert_eq!(track.file_path, "/music/a.mp3");
        assert_eq!(db.list_tracks(1, 50).unwrap().total, 1);
    }

    #[test]
    fn upsert_track_keeps_play_statistics() {
        let db = temp_db();
        let id = db
            .upsert_track("/music/a.mp3", &fields("Song1", None, None))
            .unwrap();
        assert!(db.increment_play_count(id).unwrap());

        db.upsert_track("/music/a.mp3", &fields("Song1", None, None))
            .unwrap();
        let track = db.track_by_id(id).unwrap().expect("track exists");
        assert_eq!(track.play_count, 1);
        assert!(track.last_played_ms.is_some());
    }

    #[test]
    fn increment_play_count_appends_history() {
        let db = temp_db();
        let id = db
            .upsert_track("/music/a.mp3", &fields("Song1", None, None))
            .unwrap();
        assert!(db.increment_play_count(id).unwrap());
        assert!(db.increment_play_count(id).unwrap());
        assert!(!db.increment_play_count(id + 100).unwrap());

        let track = db.track_by_id(id).unwrap().expect("track exists");
        assert_eq!(track.play_count, 2);

        let conn = db.pool().get().unwrap();
        let history: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM play_history WHERE track_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(history, 2);

        let top = db.top_played_tracks(20).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, id);
    }

    #[test]
    fn deleting_artist_cascades_albums_and_nulls_tracks() {
        let db = temp_db();
        let artist = db.ensure_artist("Art1").unwrap();
        let album = db.ensure_album("Alb1", artist, None, None).unwrap();
        let track = db
            .upsert_track("/music/a.mp3", &fields("Song1", Some(artist), Some(album)))
            .unwrap();

        let conn = db.pool().get().unwrap();
        conn.execute("DELETE FROM artists WHERE id = ?1", params![artist])
            .unwrap();

        assert!(db.album_by_id(album).unwrap().is_none());
        let row = db.track_by_id(track).unwrap().expect("track survives");
        assert_eq!(row.artist_id, None);
        assert_eq!(row.album_id, None);
    }

    #[test]
    fn track_pagination_math() {
        let db = temp_db();
        for i in 0..7 {
            db.upsert_track(&format!("/music/{i}.mp3"), &fields(&format!("T{i}"), None, None))
                .unwrap();
        }
        let page = db.list_tracks(2, 3).unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.page, 2);
        assert_eq!(page.pages, 3);
        assert_eq!(page.tracks.len(), 3);

        let empty = temp_db().list_tracks(1, 50).unwrap();
        assert_eq!(empty.pages, 0);
    }

    #[test]
    fn search_tracks_matches_artist_name() {
        let db = temp_db();
        let artist = db.ensure_artist("The Searchers").unwrap();
        db.upsert_track("/music/a.mp3", &fields("Needle", Some(artist), None))
            .unwrap();
        db.upsert_track("/music/b.mp3", &fields("Haystack", None, None))
            .unwrap();

        let by_artist = db.search_tracks("searchers").unwrap();
        assert_eq!(by_artist.len(), 1);
        assert_eq!(by_artist[0].title, "Needle");

        let by_title = db.search_tracks("HAYSTACK").unwrap();
        assert_eq!(by_title.len(), 1);
    }

    #[test]
    fn playlist_append_assigns_increasing_positions() {
        let db = temp_db();
        let t1 = db
            .upsert_track("/music/1.mp3", &fields("One", None, None))
            .unwrap();
        let t2 = db
            .upsert_track("/music/2.mp3", &fields("Two", None, None))
            .unwrap();
        let t3 = db
            .upsert_track("/music/3.mp3", &fields("Three", None, None))
            .unwrap();
        let playlist = db.create_playlist("Mix", Some("test")).unwrap();

        assert_eq!(db.add_playlist_track(playlist, t1).unwrap(), 1);
        assert_eq!(db.add_playlist_track(playlist, t2).unwrap(), 2);
        assert_eq!(db.add_playlist_track(playlist, t3).unwrap(), 3);

        assert!(db.remove_playlist_track(playlist, t3).unwrap());
        assert_eq!(db.add_playlist_track(playlist, t3).unwrap(), 3);

        // Removing from the middle leaves a gap; appends still go past the max.
        assert!(db.remove_playlist_track(playlist, t1).unwrap());
        assert_eq!(db.add_playlist_track(playlist, t1).unwrap(), 4);

        let entries = db.playlist_tracks(playlist).unwrap();
        let positions: Vec<i64> = entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![2, 3, 4]);
    }

    #[test]
    fn deleting_playlist_cascades_entries_and_keeps_tracks() {
        let db = temp_db();
        let track = db
            .upsert_track("/music/1.mp3", &fields("One", None, None))
            .unwrap();
        let playlist = db.create_playlist("Mix", None).unwrap();
        db.add_playlist_track(playlist, track).unwrap();

        assert!(db.delete_playlist(playlist).unwrap());
        assert!(db.playlist_by_id(playlist).unwrap().is_none());

        let conn = db.pool().get().unwrap();
        let entries: i64 = conn
            .query_row("SELECT COUNT(*) FROM playlist_tracks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(entries, 0);
        assert!(db.track_by_id(track).unwrap().is_some());
    }

    #[test]
    fn recent_tracks_returns_newest_first() {
        let db = temp_db();
        let first = db
            .upsert_track("/music/1.mp3", &fields("One", None, None))
            .unwrap();
        let second = db
            .upsert_track("/music/2.mp3", &fields("Two", None, None))
            .unwrap();

        let recent = db.recent_tracks(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second);
        assert_eq!(recent[1].id, first);
    }

    #[test]
    fn find_track_by_path_round_trips() {
        let db = temp_db();
        assert_eq!(db.find_track_by_path("/music/a.mp3").unwrap(), None);
        let id = db
            .upsert_track("/music/a.mp3", &fields("Song1", None, None))
            .unwrap();
        assert_eq!(db.find_track_by_path("/music/a.mp3").unwrap(), Some(id));
    }

    #[test]
    fn schema_reopens_cleanly() {
        let dir = std::env::temp_dir().join(format!(
            "music-library-catalog-reopen-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path: PathBuf = dir.join("catalog.sqlite");

        let db = CatalogDb::new(&path).expect("open catalog");
        let id = db
            .upsert_track("/music/a.mp3", &fields("Song1", None, None))
            .unwrap();
        drop(db);

        let db = CatalogDb::new(&path).expect("reopen catalog");
        assert_eq!(db.find_track_by_path("/music/a.mp3").unwrap(), Some(id));
    }
}
