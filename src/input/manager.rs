//! Input manager: path in, plain text out

use crate::error::{Result, ScreenerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    DocxExtractor, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Extracts document text by file type, caching results per path.
///
/// A missing path is an error. An existing file that cannot be read or
/// parsed yields an empty string, which callers treat as "no content".
pub struct InputManager {
    cache: RwLock<HashMap<PathBuf, String>>,
    enable_cache: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.read().await.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(ScreenerError::NotFound(path.to_path_buf()));
        }

        let file_type = FileType::from_path(path);
        let extracted = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await
            }
            FileType::Docx => {
                info!("Extracting text from DOCX: {}", path.display());
                DocxExtractor.extract(path).await
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await
            }
            FileType::Text | FileType::Unknown => {
                info!("Reading text file: {}", path.display());
                PlainTextExtractor.extract(path).await
            }
        };

        let text = match extracted {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read {} ({:?}), treating as empty: {}", path.display(), file_type, e);
                String::new()
            }
        };

        if self.enable_cache {
            self.cache.write().await.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    /// Supported documents directly inside `dir`, sorted by path
    pub fn collect_documents(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Err(ScreenerError::NotFound(dir.to_path_buf()));
        }

        let mut documents: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && FileType::from_path(path).is_supported())
            .collect();
        documents.sort();
        Ok(documents)
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let manager = InputManager::new();
        let result = manager.extract_text(Path::new("/definitely/not/here.txt")).await;
        assert!(matches!(result, Err(ScreenerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reads_and_caches_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.txt");
        std::fs::write(&path, "Rust engineer").unwrap();

        let manager = InputManager::new();
        assert_eq!(manager.extract_text(&path).await.unwrap(), "Rust engineer");
        assert_eq!(manager.cache_size().await, 1);

        // served from cache even after the file changes
        std::fs::write(&path, "changed").unwrap();
        assert_eq!(manager.extract_text(&path).await.unwrap(), "Rust engineer");

        manager.clear_cache().await;
        assert_eq!(manager.extract_text(&path).await.unwrap(), "changed");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("photo.bin");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        let broken_pdf = temp_dir.path().join("broken.pdf");
        std::fs::write(&broken_pdf, b"garbage").unwrap();
        let broken_docx = temp_dir.path().join("broken.docx");
        std::fs::write(&broken_docx, b"not a zip archive").unwrap();

        let manager = InputManager::new().with_cache(false);
        assert_eq!(manager.extract_text(&binary).await.unwrap(), "");
        assert_eq!(manager.extract_text(&broken_pdf).await.unwrap(), "");
        assert_eq!(manager.extract_text(&broken_docx).await.unwrap(), "");
    }

    #[test]
    fn test_collect_documents() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.md"), "# B").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "A").unwrap();
        std::fs::write(temp_dir.path().join("c.doc"), "C").unwrap();
        std::fs::write(temp_dir.path().join("d.docx"), "D").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested.txt")).unwrap();

        let documents = InputManager::collect_documents(temp_dir.path()).unwrap();
        let names: Vec<_> = documents
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md", "d.docx"]);
    }
}
