use anyhow::Context;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::annotate::Annotator;
use crate::cards::{AnkiCard, select_cards};
use crate::keywords::{KeywordExtractor, KeywordRanker};
use crate::lemmas::LemmaIndex;
use crate::pages::segment_pages;
use crate::sentence::{AnnotatedSentence, Sentence};
use crate::stopwords::StopwordLedger;
use crate::translate::Translator;

/// How many annotation requests to keep in flight.
const CONCURRENT_ANNOTATIONS: usize = 8;

/// Annotate every chunk of book text and rebuild the ordered sentence
/// stream. Requests run concurrently; results come back in chunk order.
pub async fn annotate_book<A: Annotator>(
    annotator: &A,
    chunks: &[String],
) -> anyhow::Result<Vec<Sentence>> {
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let results: Vec<anyhow::Result<Vec<AnnotatedSentence>>> = futures::stream::iter(chunks)
        .map(|chunk| {
            let pb = pb.clone();
            async move {
                let result = annotator.annotate(chunk).await;
                pb.inc(1);
                result
            }
        })
        .buffered(CONCURRENT_ANNOTATIONS)
        .collect()
        .await;

    pb.finish_and_clear();

    let mut sentences = Vec::new();
    for result in results {
        let annotated = result.context("Annotation failed for a chunk of the book")?;
        sentences.extend(annotated.into_iter().map(Sentence::new));
    }
    Ok(sentences)
}

/// Run the selection pipeline over an annotated document and produce the
/// deck's cards.
///
/// The lemma index is a whole-document fold with no ordering constraints;
/// the ranking loop is strictly sequential because every page's ranking
/// depends on the ledger state left by the page before it.
pub async fn process_book<T: Translator>(
    sentences: &[Sentence],
    ledger: &mut StopwordLedger,
    extractor: &dyn KeywordExtractor,
    translator: &T,
    max_keywords: usize,
) -> anyhow::Result<Vec<AnkiCard>> {
    let index = LemmaIndex::from_sentences(sentences);

    let mut pages = segment_pages(sentences).context("Failed to segment the book into pages")?;
    log::info!(
        "Segmented {} sentences into {} pages",
        sentences.len(),
        pages.len()
    );

    let ranker = KeywordRanker::new(extractor, max_keywords);

    for page in &mut pages {
        let accepted = ranker.rank_page(page, ledger)?;
        let translations = translator
            .translate_words(&accepted)
            .await
            .with_context(|| format!("Translation failed for page {}", page.id))?;
        if translations.len() != accepted.len() {
            anyhow::bail!(
                "Translator returned {} translations for {} words on page {}",
                translations.len(),
                accepted.len(),
                page.id
            );
        }
        page.set_key_words(accepted.into_iter().zip(translations).collect());
    }

    let mut cards = Vec::new();
    for page in &pages {
        cards.extend(select_cards(page.key_words(), &index));
    }
    Ok(cards)
}
