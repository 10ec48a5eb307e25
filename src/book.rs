use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use html2text::from_read;
use zip::ZipArchive;

use crate::pages::{PAGE_END_PREFIX, PAGE_START_PREFIX};

/// How many book pages to batch into one annotation request.
pub const DEFAULT_PAGE_CHUNK_SIZE: usize = 8;

/// Render width for the HTML-to-text pass.
const TEXT_WIDTH: usize = 80;

#[derive(Debug)]
pub enum BookError {
    Io(std::io::Error),
    Zip(zip::result::ZipError),
    /// The container held no readable chapter text.
    Empty(String),
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::Io(e) => write!(f, "IO error: {e}"),
            BookError::Zip(e) => write!(f, "ZIP error: {e}"),
            BookError::Empty(path) => write!(f, "No chapter text found in {path}"),
        }
    }
}

impl Error for BookError {}

impl From<std::io::Error> for BookError {
    fn from(err: std::io::Error) -> Self {
        BookError::Io(err)
    }
}

impl From<zip::result::ZipError> for BookError {
    fn from(err: zip::result::ZipError) -> Self {
        BookError::Zip(err)
    }
}

/// Extract chapter text from an EPUB, each chapter wrapped in
/// `page_start_<id>` / `page_end_<id>` markers, grouped into chunks of
/// `page_chunk_size` pages per annotation request.
///
/// Chapter ids lose their underscores: the page id is recovered later by
/// splitting the marker on its last underscore.
pub fn extract_text_from_epub(
    path: &Path,
    page_chunk_size: usize,
) -> Result<Vec<String>, BookError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut page_texts: Vec<(String, String)> = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let lowered = name.to_lowercase();
        if !(lowered.ends_with(".xhtml") || lowered.ends_with(".html") || lowered.ends_with(".htm"))
        {
            continue;
        }

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;

        let text = from_read(content.as_slice(), TEXT_WIDTH).unwrap_or_else(|_| {
            log::warn!("Failed to render chapter {name} as text, skipping it");
            String::new()
        });
        if text.trim().is_empty() {
            continue;
        }

        page_texts.push((chapter_id(&name), text));
    }

    if page_texts.is_empty() {
        return Err(BookError::Empty(path.display().to_string()));
    }

    log::info!("Extracted {} pages from {}", page_texts.len(), path.display());

    let chunks = page_texts
        .chunks(page_chunk_size.max(1))
        .map(|pages| {
            let mut chunk = String::new();
            for (id, text) in pages {
                chunk.push_str(PAGE_START_PREFIX);
                chunk.push_str(id);
                chunk.push(' ');
                chunk.push_str(text);
                chunk.push_str("\n. ");
                chunk.push_str(PAGE_END_PREFIX);
                chunk.push_str(id);
                chunk.push_str(". \n ");
            }
            chunk
        })
        .collect();

    Ok(chunks)
}

/// Chapter id from the entry path: the file stem with underscores removed,
/// since the id must not contain the marker separator.
fn chapter_id(entry_name: &str) -> String {
    let stem = Path::new(entry_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    stem.replace('_', "")
}
