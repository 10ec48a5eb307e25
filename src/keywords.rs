use std::collections::HashSet;

use anyhow::Context;
use yake_rust::{Config, StopWords, get_n_best};

use crate::pages::Page;
use crate::stopwords::StopwordLedger;

/// How many key words to surface per page.
pub const DEFAULT_KEY_WORDS_PER_PAGE: usize = 20;

/// Single-word statistical keyword extraction over a page's lemma text.
///
/// Implementations return words ranked by importance, best first, and never
/// return anything contained in `stopwords`.
pub trait KeywordExtractor {
    fn extract(
        &self,
        text: &str,
        stopwords: &HashSet<String>,
        max_keywords: usize,
    ) -> anyhow::Result<Vec<String>>;
}

/// YAKE-backed extractor fixed to single words, window size 1, and a 0.9
/// deduplication threshold. The caller's stopword set replaces any built-in
/// language list.
pub struct YakeExtractor;

impl KeywordExtractor for YakeExtractor {
    fn extract(
        &self,
        text: &str,
        stopwords: &HashSet<String>,
        max_keywords: usize,
    ) -> anyhow::Result<Vec<String>> {
        let config = Config {
            ngrams: 1,
            window_size: 1,
            deduplication_threshold: 0.9,
            ..Config::default()
        };
        let stopwords = StopWords::custom(stopwords.iter().cloned().collect());

        let ranked = get_n_best(max_keywords, text, &stopwords, &config);
        Ok(ranked.into_iter().map(|item| item.raw).collect())
    }
}

/// The per-page ranking protocol around the shared ledger.
///
/// Pages must be ranked strictly in document order: each call reads the
/// ledger, then grows it with the page's named-entity words and the accepted
/// key words, then persists it.
pub struct KeywordRanker<'e> {
    extractor: &'e dyn KeywordExtractor,
    max_keywords: usize,
}

impl<'e> KeywordRanker<'e> {
    pub fn new(extractor: &'e dyn KeywordExtractor, max_keywords: usize) -> Self {
        KeywordRanker {
            extractor,
            max_keywords,
        }
    }

    /// Rank one page against the ledger and feed the accepted words back.
    /// The ledger is persisted only after extraction succeeds.
    pub fn rank_page(
        &self,
        page: &Page<'_>,
        ledger: &mut StopwordLedger,
    ) -> anyhow::Result<Vec<String>> {
        ledger.extend(page.stop_words.iter().cloned());

        let accepted = self
            .extractor
            .extract(&page.lemma_text, ledger.words(), self.max_keywords)
            .with_context(|| format!("Keyword extraction failed for page {}", page.id))?;

        ledger.extend(accepted.iter().cloned());
        ledger
            .persist()
            .with_context(|| format!("Failed to persist the ledger after page {}", page.id))?;

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::segment_pages;
    use crate::sentence::{AnnotatedSentence, NamedEntity, Sentence, Token, sentence_from_pairs};
    use tempfile::tempdir;

    /// Returns its canned words minus whatever the ledger already holds.
    struct StubExtractor {
        canned: Vec<&'static str>,
    }

    impl KeywordExtractor for StubExtractor {
        fn extract(
            &self,
            _text: &str,
            stopwords: &HashSet<String>,
            max_keywords: usize,
        ) -> anyhow::Result<Vec<String>> {
            Ok(self
                .canned
                .iter()
                .filter(|word| !stopwords.contains(**word))
                .take(max_keywords)
                .map(|word| word.to_string())
                .collect())
        }
    }

    fn marker(form: &str) -> Sentence {
        sentence_from_pairs(&[(form, form)])
    }

    fn content_with_ner(words: &[&str], ner: &[&str]) -> Sentence {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, word)| Token {
                index: i + 1,
                form: word.to_string(),
                lemma: word.to_string(),
            })
            .collect();
        let ner = ner
            .iter()
            .map(|text| NamedEntity {
                text: text.to_string(),
                entity_type: "person".to_string(),
            })
            .collect();
        Sentence::new(AnnotatedSentence { tokens, ner })
    }

    #[test]
    fn test_rank_page_feeds_ledger_and_persists() {
        let dir = tempdir().unwrap();
        let sentences = vec![
            marker("page_start_1"),
            content_with_ner(&["zivs", "kaķis"], &["Harijs Poters"]),
            marker("page_end_1"),
        ];
        let pages = segment_pages(&sentences).unwrap();

        let mut ledger = StopwordLedger::load(dir.path(), "book").unwrap();
        let extractor = StubExtractor {
            canned: vec!["zivs", "kaķis"],
        };
        let ranker = KeywordRanker::new(&extractor, 20);

        let accepted = ranker.rank_page(&pages[0], &mut ledger).unwrap();

        assert_eq!(accepted, vec!["zivs".to_string(), "kaķis".to_string()]);
        // Named-entity words went in before ranking, accepted words after.
        assert!(ledger.contains("harijs"));
        assert!(ledger.contains("poters"));
        assert!(ledger.contains("zivs"));
        assert!(ledger.contains("kaķis"));

        let reloaded = StopwordLedger::load(dir.path(), "book").unwrap();
        assert!(reloaded.contains("zivs"));
    }

    #[test]
    fn test_named_entities_are_never_surfaced() {
        let dir = tempdir().unwrap();
        let sentences = vec![
            marker("page_start_1"),
            content_with_ner(&["zivs"], &["Zivs"]),
            marker("page_end_1"),
        ];
        let pages = segment_pages(&sentences).unwrap();

        let mut ledger = StopwordLedger::load(dir.path(), "book").unwrap();
        let extractor = StubExtractor {
            canned: vec!["zivs"],
        };
        let ranker = KeywordRanker::new(&extractor, 20);

        let accepted = ranker.rank_page(&pages[0], &mut ledger).unwrap();
        assert!(accepted.is_empty());
    }

    #[test]
    fn test_key_words_disjoint_across_pages() {
        let dir = tempdir().unwrap();
        let sentences = vec![
            marker("page_start_1"),
            content_with_ner(&["zivs", "kaķis"], &[]),
            marker("page_end_1"),
            marker("page_start_2"),
            content_with_ner(&["zivs", "suns"], &[]),
            marker("page_end_2"),
        ];
        let pages = segment_pages(&sentences).unwrap();

        let mut ledger = StopwordLedger::load(dir.path(), "book").unwrap();
        let extractor = StubExtractor {
            canned: vec!["zivs", "kaķis", "suns"],
        };
        let ranker = KeywordRanker::new(&extractor, 2);

        let first = ranker.rank_page(&pages[0], &mut ledger).unwrap();
        let second = ranker.rank_page(&pages[1], &mut ledger).unwrap();

        assert_eq!(first, vec!["zivs".to_string(), "kaķis".to_string()]);
        assert_eq!(second, vec!["suns".to_string()]);
        for word in &first {
            assert!(!second.contains(word));
        }
    }

    #[test]
    fn test_max_keywords_caps_accepted_words() {
        let dir = tempdir().unwrap();
        let sentences = vec![
            marker("page_start_1"),
            content_with_ner(&["viens", "divi", "trīs"], &[]),
            marker("page_end_1"),
        ];
        let pages = segment_pages(&sentences).unwrap();

        let mut ledger = StopwordLedger::load(dir.path(), "book").unwrap();
        let extractor = StubExtractor {
            canned: vec!["viens", "divi", "trīs"],
        };
        let ranker = KeywordRanker::new(&extractor, 2);

        let accepted = ranker.rank_page(&pages[0], &mut ledger).unwrap();
        assert_eq!(accepted.len(), 2);
    }
}
