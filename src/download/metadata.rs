//! Client-facing media metadata and the filtering applied to raw engine output.

use serde::Serialize;

use crate::download::source::{RawFormat, RawMediaInfo};

/// Label used when the engine supplies neither a resolution nor a format note
pub const RESOLUTION_FALLBACK: &str = "N/A";

/// One selectable quality/container variant of a media item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub ext: Option<String>,
    /// Always display-ready, never empty
    pub resolution: String,
    pub filesize: Option<u64>,
    pub format_note: Option<String>,
}

/// Metadata returned by `POST /info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub description: Option<String>,
    pub formats: Vec<FormatDescriptor>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Display label for a format: resolution, then format note, then "N/A".
pub fn resolution_label(raw: &RawFormat) -> String {
    non_empty(raw.resolution.as_deref())
        .or_else(|| non_empty(raw.format_note.as_deref()))
        .unwrap_or(RESOLUTION_FALLBACK)
        .to_string()
}

impl FormatDescriptor {
    /// Convert a raw entry, dropping it when it has no identifier or no
    /// source location (it could never be downloaded).
    pub fn from_raw(raw: &RawFormat) -> Option<Self> {
        let format_id = non_empty(raw.format_id.as_deref())?;
        non_empty(raw.url.as_deref())?;

        Some(Self {
            format_id: format_id.to_string(),
            ext: raw.ext.clone(),
            resolution: resolution_label(raw),
            filesize: raw.filesize.filter(|s| s.is_finite() && *s >= 0.0).map(|s| s as u64),
            format_note: raw.format_note.clone(),
        })
    }
}

impl From<RawMediaInfo> for MediaMetadata {
    fn from(raw: RawMediaInfo) -> Self {
        let formats = raw.formats.iter().filter_map(FormatDescriptor::from_raw).collect();

        Self {
            title: raw.title,
            thumbnail: raw.thumbnail,
            duration: raw.duration,
            uploader: raw.uploader,
            description: raw.description,
            formats,
        }
    }
}
