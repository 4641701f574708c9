//! Metadata normalizer
//!
//! Turns a [`ProbeRawResult`] into a flat, typed [`AudioMetadata`] record.
//!
//! Technical fields never fail: unparsable or missing text becomes zero.
//! Tags come from the first audio stream; only when that leaves the title
//! empty are title/artist/album taken from the container-level tags instead.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::AnalysisError;
use crate::probe::{MediaProber, ProbeRawResult, StreamDescriptor};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Normalized metadata for one audio file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioMetadata {
    // Technical
    pub file_name: String,
    pub container_format: String,
    pub file_size_mb: f64,
    pub duration_sec: f64,
    /// Probe confidence score, 0-100
    #[serde(rename = "integritas_score_100")]
    pub integrity_score: i64,
    pub codec: String,
    pub sample_rate_hz: u32,
    pub bit_rate_kbps: u64,
    pub channel_layout: String,

    // Descriptive tags, omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Probe a file and normalize the result
pub fn analyze_file(prober: &dyn MediaProber, path: &Path) -> Result<AudioMetadata, AnalysisError> {
    let raw = prober.probe(path)?;
    normalize(&raw)
}

/// Build [`AudioMetadata`] from a raw probe report
pub fn normalize(raw: &ProbeRawResult) -> Result<AudioMetadata, AnalysisError> {
    let stream = first_audio_stream(raw).ok_or(AnalysisError::NoAudioStream)?;
    let format = &raw.format;

    let mut metadata = AudioMetadata {
        file_name: base_name(&format.filename),
        container_format: format.format_name.clone(),
        file_size_mb: parse_f64(&format.size) / BYTES_PER_MB,
        duration_sec: parse_f64(&format.duration),
        integrity_score: format.probe_score,
        codec: stream.codec_name.clone(),
        sample_rate_hz: parse_int(&stream.sample_rate),
        bit_rate_kbps: parse_int::<u64>(&stream.bit_rate) / 1000,
        channel_layout: stream.channel_layout.clone(),
        ..Default::default()
    };

    if let Some(tags) = &stream.tags {
        metadata.title = tag(tags, "title");
        metadata.artist = tag(tags, "artist");
        metadata.album = tag(tags, "album");
        metadata.genre = tag(tags, "genre");
        metadata.year = tag(tags, "year");
        metadata.track = tag(tags, "track");
        metadata.composer = tag(tags, "composer");
        metadata.comment = tag(tags, "comment");
        metadata.copyright = tag(tags, "copyright");
    }

    // Container-level fallback covers only these three fields
    if metadata.title.is_none() {
        if let Some(tags) = &format.tags {
            metadata.title = tag(tags, "title");
            metadata.artist = tag(tags, "artist");
            metadata.album = tag(tags, "album");
        }
    }

    Ok(metadata)
}

/// First stream with codec type "audio", in document order
pub fn first_audio_stream(raw: &ProbeRawResult) -> Option<&StreamDescriptor> {
    raw.streams.iter().find(|s| s.is_audio())
}

/// Final path segment; "" when there is none
fn base_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_f64(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_int<T: std::str::FromStr + Default>(text: &str) -> T {
    text.trim().parse().unwrap_or_default()
}

/// Tag lookup; exact key first, then case-insensitive. Empty values are absent.
fn tag(tags: &HashMap<String, String>, key: &str) -> Option<String> {
    tags.get(key)
        .or_else(|| {
            tags.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .filter(|v| !v.is_empty())
        .cloned()
}
