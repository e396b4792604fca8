//! Audio file probing.
//!
//! Reads embedded tags and stream properties for a single file and applies
//! the catalog's placeholder defaults for missing fields.

use std::path::Path;

use lofty::{Accessor, AudioFile, LoftyError, TaggedFileExt, read_from_path};
use thiserror::Error;

/// Placeholder used when a file carries no artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Placeholder used when a file carries no album tag.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Probe failure for a single file. Counted by the scan, never fatal to it.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unreadable file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unparseable audio: {0}")]
    Parse(#[from] LoftyError),
}

/// Metadata extracted from one audio file, defaults already applied.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackProbe {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub track_number: Option<i64>,
    pub disc_number: i64,
    /// Whole seconds, rounded.
    pub duration: Option<i64>,
    /// Kilobits per second as reported by the decoder.
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i64>,
    /// Uppercased container/extension label.
    pub format: String,
    pub file_size: i64,
}

/// Probe a single audio file for tags and stream properties.
pub fn probe_file(path: &Path) -> Result<TrackProbe, ProbeError> {
    let tagged = read_from_path(path)?;
    let fs_meta = std::fs::metadata(path)?;

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
    let properties = tagged.properties();

    let title = tag
        .and_then(|t| t.title().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| file_stem_title(path));
    let artist = tag
        .and_then(|t| t.artist().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let album = tag
        .and_then(|t| t.album().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());
    let genre = tag
        .and_then(|t| t.genre().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty());

    let duration = properties.duration();
    let duration = if duration.is_zero() {
        None
    } else {
        Some(duration.as_secs_f64().round() as i64)
    };

    Ok(TrackProbe {
        title,
        artist,
        album,
        genre,
        year: tag.and_then(|t| t.year()).map(i64::from),
        track_number: tag.and_then(|t| t.track()).map(i64::from),
        disc_number: tag.and_then(|t| t.disk()).map(i64::from).unwrap_or(1),
        duration,
        bitrate: properties
            .audio_bitrate()
            .or_else(|| properties.overall_bitrate())
            .map(i64::from),
        sample_rate: properties.sample_rate().map(i64::from),
        format: format_label(path),
        file_size: fs_meta.len() as i64,
    })
}

fn file_stem_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

fn format_label(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::{Tag, TagExt, TagType};
    use std::path::PathBuf;

    fn temp_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "music-library-probe-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }

    /// Minimal mono 16-bit PCM WAV with `seconds` of silence.
    fn write_wav(path: &Path, seconds: u32) {
        let sample_rate = 44_100u32;
        let data_len = sample_rate * seconds * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        std::fs::write(path, bytes).expect("write wav");
    }

    #[test]
    fn probe_missing_file_fails() {
        let path = temp_root().join("gone.mp3");
        assert!(probe_file(&path).is_err());
    }

    #[test]
    fn probe_garbage_fails() {
        let path = temp_root().join("broken.mp3");
        std::fs::write(&path, b"this is not an mp3 stream").unwrap();
        assert!(probe_file(&path).is_err());
    }

    #[test]
    fn probe_untagged_wav_applies_defaults() {
        let root = temp_root();
        let path = root.join("morning song.wav");
        write_wav(&path, 2);

        let probe = probe_file(&path).expect("probe wav");
        assert_eq!(probe.title, "morning song");
        assert_eq!(probe.artist, UNKNOWN_ARTIST);
        assert_eq!(probe.album, UNKNOWN_ALBUM);
        assert_eq!(probe.genre, None);
        assert_eq!(probe.disc_number, 1);
        assert_eq!(probe.duration, Some(2));
        assert_eq!(probe.sample_rate, Some(44_100));
        assert_eq!(probe.format, "WAV");
        assert!(probe.file_size > 44);
    }

    #[test]
    fn probe_tagged_wav_reads_tags() {
        let root = temp_root();
        let path = root.join("song.wav");
        write_wav(&path, 1);

        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title("Song One".to_string());
        tag.set_artist("Art1".to_string());
        tag.set_album("Alb1".to_string());
        tag.set_genre("Jazz".to_string());
        tag.set_track(3);
        tag.set_disk(2);
        tag.set_year(1999);
        tag.save_to_path(&path).expect("write tags");

        let probe = probe_file(&path).expect("probe wav");
        assert_eq!(probe.title, "Song One");
        assert_eq!(probe.artist, "Art1");
        assert_eq!(probe.album, "Alb1");
        assert_eq!(probe.genre, Some("Jazz".to_string()));
        assert_eq!(probe.track_number, Some(3));
        assert_eq!(probe.disc_number, 2);
        assert_eq!(probe.year, Some(1999));
    }
}
