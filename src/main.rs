use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;

use generate_cards::annotate::AilabAnnotator;
use generate_cards::book;
use generate_cards::cards::CardDeck;
use generate_cards::keywords::{DEFAULT_KEY_WORDS_PER_PAGE, YakeExtractor};
use generate_cards::pipeline;
use generate_cards::stopwords::StopwordLedger;
use generate_cards::translate::GoogleTranslator;

/// Language of the books being read.
const SOURCE_LANGUAGE: &str = "lv";
/// Language the key words are translated into.
const TARGET_LANGUAGE: &str = "en";
/// Where the per-book taught-word ledgers live.
const LEDGER_DIR: &str = "stopwords";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let book_path = args
        .next()
        .map(PathBuf::from)
        .context("Usage: generate-cards <book.epub> [output.json]")?;
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| book_path.with_extension("cards.json"));

    let document_key = book_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .context("Book path has no usable file name")?
        .to_string();

    println!("Reading {}", book_path.display());
    let chunks = book::extract_text_from_epub(&book_path, book::DEFAULT_PAGE_CHUNK_SIZE)?;
    println!("Extracted {} annotation chunks", chunks.len());

    println!("Annotating...");
    let annotator = AilabAnnotator::new();
    let sentences = pipeline::annotate_book(&annotator, &chunks).await?;
    println!("Annotated {} sentences", sentences.len());

    let mut ledger = StopwordLedger::load(Path::new(LEDGER_DIR), &document_key)?;
    let translator = GoogleTranslator::new(
        SOURCE_LANGUAGE,
        TARGET_LANGUAGE,
        PathBuf::from(".cache/google_translate/"),
    )?;

    let cards = pipeline::process_book(
        &sentences,
        &mut ledger,
        &YakeExtractor,
        &translator,
        DEFAULT_KEY_WORDS_PER_PAGE,
    )
    .await?;

    if cards.is_empty() {
        log::warn!("No cards were produced, the deck will be empty");
    }

    let deck_id: i64 = chrono::Local::now()
        .format("%Y%m%d%H%M%S")
        .to_string()
        .parse()
        .context("Failed to derive a deck id from the current time")?;
    let deck = CardDeck {
        deck_id,
        anki_cards: cards,
    };

    let output = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(output), &deck)
        .context("Failed to write the deck")?;

    println!(
        "Wrote {} cards to {}",
        deck.anki_cards.len(),
        output_path.display()
    );

    Ok(())
}
