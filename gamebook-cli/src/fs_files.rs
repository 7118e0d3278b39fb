//! Exports as YAML files in a directory; imports from a chosen path.
use async_trait::async_trait;
use gamebook_core::{FileError, FilePersistence, GameState, decode_document, encode_document};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_DIR: &str = "exports";

#[derive(Debug, Clone)]
pub struct DirectoryFiles {
    dir: PathBuf,
    selection: Option<PathBuf>,
}

impl DirectoryFiles {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(EXPORT_DIR),
            selection: None,
        }
    }

    /// The file an import will read, standing in for a file picker.
    #[must_use]
    pub fn with_selection(mut self, selection: Option<PathBuf>) -> Self {
        self.selection = selection;
        self
    }

    /// Exports newest first.
    pub fn list(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = match fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err),
        };
        files.sort();
        files.reverse();
        Ok(files)
    }
}

#[async_trait(?Send)]
impl FilePersistence for DirectoryFiles {
    fn save_to_file(
        &self,
        state: &GameState,
        book: &str,
        character: &str,
    ) -> Result<(), FileError> {
        let document = encode_document(state)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(self.generate_filename(book, character));
        fs::write(&path, document)?;
        log::info!("exported sheet to {}", path.display());
        Ok(())
    }

    async fn load_from_file(&self) -> Option<Value> {
        let path = self.selection.as_ref()?;
        let name = path.file_name().and_then(|name| name.to_str());
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("could not read {}: {err}", path.display());
                return None;
            }
        };
        decode_document(name, &text)
    }
}
