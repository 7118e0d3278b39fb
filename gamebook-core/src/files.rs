//! YAML export/import of a whole sheet.
//!
//! The core owns the document format and naming; hosts own the actual
//! download and file picker through [`FilePersistence`].
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::state::GameState;

pub const SAVE_EXTENSION: &str = ".yaml";
const BOOK_FALLBACK: &str = "book";
const CHARACTER_FALLBACK: &str = "character";

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^A-Za-z0-9]").expect("filename pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("no file persistence configured")]
    Unavailable,
    #[error("could not encode sheet: {0}")]
    Encode(#[from] serde_yaml::Error),
    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Download/upload side of the sheet. Loading never fails loudly: every
/// problem resolves to `None`.
#[async_trait(?Send)]
pub trait FilePersistence {
    /// Name for a new export; uses the local time of the call.
    fn generate_filename(&self, book: &str, character: &str) -> String {
        generate_filename(book, character, Local::now().naive_local())
    }

    /// Write `state` as a new export.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded or written.
    fn save_to_file(
        &self,
        state: &GameState,
        book: &str,
        character: &str,
    ) -> Result<(), FileError>;

    /// Let the player pick an export and return its parsed document.
    async fn load_from_file(&self) -> Option<Value>;
}

/// Lowercase `raw` with every non-alphanumeric character turned into `-`.
/// Blank input becomes `fallback`.
#[must_use]
pub fn sanitize_component(raw: &str, fallback: &str) -> String {
    if raw.trim().is_empty() {
        return fallback.to_string();
    }
    NON_ALPHANUMERIC
        .replace_all(raw, "-")
        .to_lowercase()
}

/// `<book>-<character>-<YYYYMMDD>-<HHMMSS>.yaml`
#[must_use]
pub fn generate_filename(book: &str, character: &str, at: NaiveDateTime) -> String {
    format!(
        "{}-{}-{}{SAVE_EXTENSION}",
        sanitize_component(book, BOOK_FALLBACK),
        sanitize_component(character, CHARACTER_FALLBACK),
        at.format("%Y%m%d-%H%M%S"),
    )
}

/// Serialize a sheet into export text.
///
/// # Errors
///
/// Returns an error if the state cannot be represented as YAML.
pub fn encode_document(state: &GameState) -> Result<String, FileError> {
    Ok(serde_yaml::to_string(state)?)
}

/// Validate and parse an export the player picked.
///
/// Rejects a missing selection, a name without the `.yaml` extension, text
/// that is not YAML, and documents that are not a mapping.
#[must_use]
pub fn decode_document(file_name: Option<&str>, text: &str) -> Option<Value> {
    let Some(file_name) = file_name else {
        log::warn!("no file selected");
        return None;
    };
    if !has_save_extension(file_name) {
        log::warn!("rejecting {file_name}: expected a {SAVE_EXTENSION} file");
        return None;
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(document @ Value::Object(_)) => Some(document),
        Ok(_) => {
            log::warn!("rejecting {file_name}: document is not a mapping");
            None
        }
        Err(err) => {
            log::warn!("rejecting {file_name}: {err}");
            None
        }
    }
}

#[must_use]
pub fn has_save_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(SAVE_EXTENSION)
}

/// Persistence for hosts without file access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFiles;

#[async_trait(?Send)]
impl FilePersistence for NoFiles {
    fn save_to_file(
        &self,
        _state: &GameState,
        _book: &str,
        _character: &str,
    ) -> Result<(), FileError> {
        Err(FileError::Unavailable)
    }

    async fn load_from_file(&self) -> Option<Value> {
        None
    }
}
