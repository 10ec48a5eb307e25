use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use crate::sentence::Sentence;

/// Prefix shared by every synthetic page-marker token.
pub const PAGE_MARKER_PREFIX: &str = "page_";
/// First token of the sentence that opens a page.
pub const PAGE_START_PREFIX: &str = "page_start_";
/// First token of the sentence that closes a page.
pub const PAGE_END_PREFIX: &str = "page_end_";

/// True for tokens injected purely to mark page boundaries.
pub fn is_marker_token(form: &str) -> bool {
    form.starts_with(PAGE_MARKER_PREFIX)
}

#[derive(Debug)]
pub enum SegmentError {
    /// An end marker appeared with no unmatched start marker before it.
    UnmatchedEnd {
        sentence_index: usize,
        marker: String,
    },
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::UnmatchedEnd {
                sentence_index,
                marker,
            } => write!(
                f,
                "end marker {marker:?} at sentence {sentence_index} has no matching start marker"
            ),
        }
    }
}

impl Error for SegmentError {}

/// One page of the book: its identifier and the contiguous sentence span
/// between its start marker (included) and end marker (excluded).
///
/// Text, lemma text, and the stopword union are derived at construction.
/// The ranked key words are attached exactly once, after the ledger pass.
#[derive(Debug)]
pub struct Page<'a> {
    pub id: String,
    pub sentences: &'a [Sentence],
    pub text: String,
    /// Lowercased lemma text, the input for keyword extraction.
    pub lemma_text: String,
    /// Union of the sentences' named-entity stopwords.
    pub stop_words: HashSet<String>,
    key_words: Option<Vec<(String, String)>>,
}

impl<'a> Page<'a> {
    fn new(id: String, sentences: &'a [Sentence]) -> Self {
        let text = sentences
            .iter()
            .map(|sentence| sentence.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let lemma_text = sentences
            .iter()
            .map(|sentence| sentence.lemma_text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let mut stop_words = HashSet::new();
        for sentence in sentences {
            stop_words.extend(sentence.stop_words.iter().cloned());
        }

        Page {
            id,
            sentences,
            text,
            lemma_text,
            stop_words,
            key_words: None,
        }
    }

    /// Ranked (key word, translation) pairs, empty until ranking ran.
    pub fn key_words(&self) -> &[(String, String)] {
        self.key_words.as_deref().unwrap_or(&[])
    }

    /// Attach the ranked key words and their translations.
    pub fn set_key_words(&mut self, pairs: Vec<(String, String)>) {
        assert!(
            self.key_words.is_none(),
            "key words are ranked exactly once per page"
        );
        self.key_words = Some(pairs);
    }
}

/// Split the annotated sentence stream into pages.
///
/// Single forward scan; the most recently seen start marker opens the next
/// page, and every end marker must have a pending start. Pages come out in
/// document order.
pub fn segment_pages(sentences: &[Sentence]) -> Result<Vec<Page<'_>>, SegmentError> {
    let mut pages = Vec::new();
    let mut pending_start: Option<(usize, String)> = None;

    for (index, sentence) in sentences.iter().enumerate() {
        let Some(first_form) = sentence.first_form() else {
            continue;
        };

        if first_form.starts_with(PAGE_START_PREFIX) {
            pending_start = Some((index, page_id(first_form)));
        } else if first_form.starts_with(PAGE_END_PREFIX) {
            let (start, id) = pending_start
                .take()
                .ok_or_else(|| SegmentError::UnmatchedEnd {
                    sentence_index: index,
                    marker: first_form.to_string(),
                })?;
            pages.push(Page::new(id, &sentences[start..index]));
        }
    }

    Ok(pages)
}

/// The page id is whatever follows the last `_` of the marker form.
fn page_id(marker_form: &str) -> String {
    marker_form.rsplit('_').next().unwrap_or_default().to_string()
}
