//! Curriculum document loaders
//!
//! Two formats: paginated documents (PDF, one document per page) and slide
//! decks (markdown/plain text, slides separated by `---` lines). Paths are
//! loaded concurrently; a path that fails to load is logged and skipped, and
//! ingestion as a whole fails only if zero documents are produced.

use crate::errors::{PipelineError, Result};
use anyhow::Context;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One unit of ingested curriculum content: a page or a slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Source file this document came from
    pub source: PathBuf,
    /// Ordinal position within the source (page or slide number, 1-based)
    pub position: usize,
    /// Raw extracted text
    pub text: String,
}

/// Supported curriculum file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Page-oriented document (PDF)
    Paginated,
    /// Slide deck: markdown or plain text with `---` slide separators
    SlideDeck,
}

impl DocumentFormat {
    /// Determine the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentFormat::Paginated),
            "md" | "txt" => Ok(DocumentFormat::SlideDeck),
            _ => Err(PipelineError::Validation(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

/// Load one curriculum file into documents. Blocking; callers run it on a
/// blocking task.
pub fn load_file(path: &Path) -> Result<Vec<Document>> {
    if !path.is_file() {
        return Err(PipelineError::Validation(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let format = DocumentFormat::from_path(path)?;

    let documents = match format {
        DocumentFormat::Paginated => load_pdf(path)?,
        DocumentFormat::SlideDeck => load_slide_deck(path)?,
    };

    Ok(documents)
}

fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    // pdf-extract separates pages with form feeds
    let documents = text
        .split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .enumerate()
        .map(|(i, page)| Document {
            source: path.to_path_buf(),
            position: i + 1,
            text: page.to_string(),
        })
        .collect();

    Ok(documents)
}

fn load_slide_deck(path: &Path) -> Result<Vec<Document>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read slide deck: {}", path.display()))?;

    let mut slides: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in contents.lines() {
        if line.trim() == "---" {
            slides.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    slides.push(current);

    let documents = slides
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, slide)| Document {
            source: path.to_path_buf(),
            position: i + 1,
            text: slide.to_string(),
        })
        .collect();

    Ok(documents)
}

/// Load all paths concurrently, preserving path order in the result.
///
/// Per-path failures are logged and skipped; only an entirely empty result
/// set is an error.
pub async fn ingest(paths: &[PathBuf]) -> Result<Vec<Document>> {
    let tasks: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            tokio::task::spawn_blocking(move || (path.clone(), load_file(&path)))
        })
        .collect();

    let mut documents = Vec::new();
    for joined in join_all(tasks).await {
        let (path, result) = joined
            .map_err(|e| PipelineError::Generic(format!("ingestion task panicked: {e}")))?;

        match result {
            Ok(mut docs) => {
                eprintln!("[INGEST] loaded {} documents from {}", docs.len(), path.display());
                documents.append(&mut docs);
            }
            Err(e) => {
                eprintln!("[INGEST] skipping {}: {}", path.display(), e);
            }
        }
    }

    if documents.is_empty() {
        return Err(PipelineError::EmptyIngestion);
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_deck(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("course.pdf")).unwrap(),
            DocumentFormat::Paginated
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("deck.md")).unwrap(),
            DocumentFormat::SlideDeck
        );
        assert!(DocumentFormat::from_path(Path::new("notes.docx")).is_err());
    }

    #[test]
    fn test_slide_deck_splitting() {
        let dir = TempDir::new().unwrap();
        let path = write_deck(
            &dir,
            "deck.md",
            "# Intro\nWelcome\n---\n# Models\nLinear regression\n---\n# Wrap up\n",
        );

        let docs = load_file(&path).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].position, 1);
        assert!(docs[1].text.contains("Linear regression"));
        assert_eq!(docs[2].position, 3);
    }

    #[test]
    fn test_empty_slides_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_deck(&dir, "deck.md", "First\n---\n---\n\n---\nLast\n");

        let docs = load_file(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "First");
        assert_eq!(docs[1].text, "Last");
    }

    #[test]
    fn test_missing_file() {
        let result = load_file(Path::new("/nonexistent/deck.md"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ingest_skips_bad_paths() {
        let dir = TempDir::new().unwrap();
        let good = write_deck(&dir, "deck.md", "Alpha\n---\nBeta\n");
        let bad = dir.path().join("missing.md");

        let docs = ingest(&[good.clone(), bad]).await.unwrap();
        let only_good = ingest(&[good]).await.unwrap();
        assert_eq!(docs, only_good);
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_all_bad_paths_fails() {
        let dir = TempDir::new().unwrap();
        let result = ingest(&[dir.path().join("a.md"), dir.path().join("b.pdf")]).await;
        assert!(matches!(result, Err(PipelineError::EmptyIngestion)));
    }
}
