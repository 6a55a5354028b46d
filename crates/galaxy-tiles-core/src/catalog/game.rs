//! Normalized game records.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Everything outside this set is stripped from titles and file names.
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 +_#!()=-]+").unwrap());

/// One row as returned by the store, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGameRow {
    pub release_key: String,
    pub icon_file_name: String,
    pub title: String,
}

impl RawGameRow {
    pub fn new(
        release_key: impl Into<String>,
        icon_file_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            release_key: release_key.into(),
            icon_file_name: icon_file_name.into(),
            title: title.into(),
        }
    }
}

/// A game ready to be placed as a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    /// Stable identifier from the store, e.g. `gog_1207658924`.
    pub release_key: String,
    pub raw_title: String,
    /// Display title, also used as the shortcut file name.
    pub sanitized_title: String,
    /// Release key reduced to file-name safe characters.
    pub file_safe_key: String,
    /// Icon resource name in the locally cached image format.
    pub icon_reference: String,
}

impl GameRecord {
    /// Build a normalized record from a store row.
    pub fn from_row(row: RawGameRow) -> Self {
        Self {
            sanitized_title: sanitize(strip_prefix(&row.title)),
            file_safe_key: sanitize(&row.release_key),
            icon_reference: normalize_icon(&row.icon_file_name),
            release_key: row.release_key,
            raw_title: row.title,
        }
    }
}

/// Remove characters outside the allow-list.
pub fn sanitize(value: &str) -> String {
    DISALLOWED_CHARS.replace_all(value, "").into_owned()
}

/// Drop everything up to and including the first colon.
///
/// Titles without a colon are already bare.
pub fn strip_prefix(title: &str) -> &str {
    match title.split_once(':') {
        Some((_, rest)) => rest,
        None => title,
    }
}

/// Icons are cached as PNG even when the store references WebP.
pub fn normalize_icon(file_name: &str) -> String {
    file_name.replace(".webp", ".png")
}
