use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Language-wide default stopwords, always part of the ledger.
const DEFAULT_STOPWORDS: &str = include_str!("stopwords/lv.txt");

/// The set of words already shown to the learner for one document.
///
/// The ledger only ever grows. It is loaded once per run, extended while the
/// pages are ranked in order, and written back with an explicit
/// [`StopwordLedger::persist`] call after each page completes.
#[derive(Debug)]
pub struct StopwordLedger {
    path: PathBuf,
    words: HashSet<String>,
}

impl StopwordLedger {
    /// Load the ledger for one document: the bundled language defaults plus
    /// whatever a previous run persisted under `document_key`. A missing
    /// ledger file is an empty ledger, not an error.
    pub fn load(dir: &Path, document_key: &str) -> anyhow::Result<Self> {
        let path = dir.join(format!("{document_key}.txt"));

        let mut words: HashSet<String> = DEFAULT_STOPWORDS
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();

        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read stopword ledger {}", path.display()))?;
            words.extend(
                content
                    .lines()
                    .map(|line| line.trim().to_lowercase())
                    .filter(|line| !line.is_empty()),
            );
        }

        Ok(StopwordLedger { path, words })
    }

    /// Union `words` into the ledger.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Current contents, defaults included.
    pub fn words(&self) -> &HashSet<String> {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Write the complete current set back, replacing the previous file.
    pub fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create ledger directory {}", parent.display())
            })?;
        }

        let mut lines: Vec<&str> = self.words.iter().map(String::as_str).collect();
        lines.sort_unstable();

        fs::write(&self.path, lines.join("\n") + "\n")
            .with_context(|| format!("Failed to write stopword ledger {}", self.path.display()))
    }
}
