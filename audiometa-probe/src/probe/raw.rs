//! Raw probe output (`-print_format json -show_format -show_streams`)
//!
//! Numeric values arrive as text and are kept as text here; turning them into
//! numbers is the normalizer's job. Every field is optional so that a sparse
//! document still parses.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Whole probe document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeRawResult {
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub streams: Vec<StreamDescriptor>,
}

/// Container-level section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatSection {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub format_name: String,
    /// Size in bytes, as text
    #[serde(default, deserialize_with = "text_or_number")]
    pub size: String,
    /// Duration in seconds, as text
    #[serde(default, deserialize_with = "text_or_number")]
    pub duration: String,
    /// Probe confidence, 0-100
    #[serde(default)]
    pub probe_score: i64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// One stream entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub codec_name: String,
    /// "audio", "video", "subtitle", "data", ...
    #[serde(default)]
    pub codec_type: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub sample_rate: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub bit_rate: String,
    #[serde(default)]
    pub channels: i64,
    #[serde(default)]
    pub channel_layout: String,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

impl StreamDescriptor {
    pub fn is_audio(&self) -> bool {
        self.codec_type == "audio"
    }
}

/// Accept `"44100"`, `44100`, `44100.0` or `null`, keeping the text form
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(
        match Option::<TextOrNumber>::deserialize(deserializer)? {
            Some(TextOrNumber::Text(s)) => s,
            Some(TextOrNumber::Int(n)) => n.to_string(),
            Some(TextOrNumber::Float(f)) => f.to_string(),
            None => String::new(),
        },
    )
}
