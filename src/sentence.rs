use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::pages::is_marker_token;

/// Punctuation that must not be preceded by a space in display text.
const NO_SPACE_BEFORE: [&str; 6] = [".", ";", ":", ",", "!", "?"];

/// One token as returned by the annotation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Position of the token within its sentence.
    #[serde(default)]
    pub index: usize,
    /// Surface form as it appears in the text.
    pub form: String,
    /// Canonical dictionary form.
    pub lemma: String,
}

/// A named-entity span as returned by the annotation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
}

/// One sentence of raw annotation output, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub ner: Vec<NamedEntity>,
}

/// A sentence normalized for the card pipeline.
///
/// Every derived view is computed once at construction; a `Sentence` is
/// immutable afterwards. Page-marker tokens are excluded from all of them.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    pub ner: Vec<NamedEntity>,
    /// Reading text, punctuation attached to the preceding word.
    pub text: String,
    /// Lowercased lemmas joined with single spaces.
    pub lemma_text: String,
    /// Lowercased words taken from the sentence's named-entity spans.
    pub stop_words: HashSet<String>,
    /// (lowercased lemma, lowercased form) per token, in token order.
    pub lemma_forms: Vec<(String, String)>,
}

impl Sentence {
    pub fn new(annotated: AnnotatedSentence) -> Self {
        let text = make_text(&annotated.tokens);
        let lemma_text = make_lemma_text(&annotated.tokens);
        let stop_words = make_stop_words(&annotated.ner);
        let lemma_forms = annotated
            .tokens
            .iter()
            .filter(|token| !is_marker_token(&token.form))
            .map(|token| (token.lemma.to_lowercase(), token.form.to_lowercase()))
            .collect();

        Sentence {
            tokens: annotated.tokens,
            ner: annotated.ner,
            text,
            lemma_text,
            stop_words,
            lemma_forms,
        }
    }

    /// Number of tokens, markers included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Form of the first token, the place page markers appear.
    pub fn first_form(&self) -> Option<&str> {
        self.tokens.first().map(|token| token.form.as_str())
    }
}

fn make_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if is_marker_token(&token.form) {
            continue;
        }
        text.push_str(&token.form);
        let next_is_punctuation = tokens
            .get(i + 1)
            .is_some_and(|next| NO_SPACE_BEFORE.contains(&next.form.as_str()));
        if !next_is_punctuation {
            text.push(' ');
        }
    }
    text
}

fn make_lemma_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| !is_marker_token(&token.form))
        .map(|token| token.lemma.to_lowercase())
        .join(" ")
}

fn make_stop_words(ner: &[NamedEntity]) -> HashSet<String> {
    let mut words = HashSet::new();
    for entity in ner {
        for word in entity.text.to_lowercase().split_whitespace() {
            words.insert(word.to_string());
        }
    }
    words
}

/// Build a sentence from (form, lemma) pairs, for tests across the crate.
#[cfg(test)]
pub(crate) fn sentence_from_pairs(pairs: &[(&str, &str)]) -> Sentence {
    let tokens = pairs
        .iter()
        .enumerate()
        .map(|(i, (form, lemma))| Token {
            index: i + 1,
            form: form.to_string(),
            lemma: lemma.to_string(),
        })
        .collect();
    Sentence::new(AnnotatedSentence {
        tokens,
        ner: Vec::new(),
    })
}
