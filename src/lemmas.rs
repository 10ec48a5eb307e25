use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use itertools::Itertools;

use crate::sentence::Sentence;

/// All recorded surface forms of one lemma, each with the sentences the
/// form occurs in. Identity is the lemma string alone.
#[derive(Debug, Clone)]
pub struct Lemma<'a> {
    lemma: String,
    forms: IndexMap<String, Vec<&'a Sentence>>,
}

impl<'a> Lemma<'a> {
    fn new(lemma: &str) -> Self {
        Lemma {
            lemma: lemma.to_string(),
            forms: IndexMap::new(),
        }
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    fn add_form(&mut self, form: &str, sentence: &'a Sentence) {
        self.forms.entry(form.to_string()).or_default().push(sentence);
    }

    /// Sentences recorded for one surface form.
    pub fn sentences_for(&self, form: &str) -> &[&'a Sentence] {
        self.forms.get(form).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Surface forms with their example sentences, in first-seen order.
    pub fn forms(&self) -> impl Iterator<Item = (&str, &[&'a Sentence])> {
        self.forms
            .iter()
            .map(|(form, sentences)| (form.as_str(), sentences.as_slice()))
    }

    pub fn has_forms(&self) -> bool {
        !self.forms.is_empty()
    }
}

impl PartialEq for Lemma<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.lemma == other.lemma
    }
}

impl Eq for Lemma<'_> {}

impl Hash for Lemma<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lemma.hash(state);
    }
}

/// Document-wide index from lemma to surface form to example sentences.
///
/// Entries are created on [`LemmaIndex::add`] only; lookups never insert.
#[derive(Debug, Clone, Default)]
pub struct LemmaIndex<'a> {
    lemmas: IndexMap<String, Lemma<'a>>,
}

impl<'a> LemmaIndex<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index for a whole document in one pass. Page boundaries
    /// play no role here. A (lemma, form) pair repeated within one sentence
    /// records the sentence once.
    pub fn from_sentences(sentences: impl IntoIterator<Item = &'a Sentence>) -> Self {
        let mut index = LemmaIndex::new();
        for sentence in sentences {
            for (lemma, form) in sentence.lemma_forms.iter().unique() {
                index.add(lemma, form, sentence);
            }
        }
        index
    }

    /// Record that `form` occurs for `lemma` in `sentence`, creating the
    /// lemma entry and the form's sentence list on first use.
    pub fn add(&mut self, lemma: &str, form: &str, sentence: &'a Sentence) {
        self.lemmas
            .entry(lemma.to_string())
            .or_insert_with(|| Lemma::new(lemma))
            .add_form(form, sentence);
    }

    /// Look up a lemma. Absent lemmas are not created.
    pub fn get(&self, lemma: &str) -> Option<&Lemma<'a>> {
        self.lemmas.get(lemma)
    }

    /// Every stored lemma, in first-seen order.
    pub fn all(&self) -> impl Iterator<Item = &Lemma<'a>> {
        self.lemmas.values()
    }

    /// Union another index into this one. Lemmas and forms already present
    /// keep their insertion order.
    pub fn merge(&mut self, other: LemmaIndex<'a>) {
        for (lemma, entry) in other.lemmas {
            let target = self
                .lemmas
                .entry(lemma.clone())
                .or_insert_with(|| Lemma::new(&lemma));
            for (form, sentences) in entry.forms {
                target.forms.entry(form).or_default().extend(sentences);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}
