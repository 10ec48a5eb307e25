use serde::{Deserialize, Serialize};

use crate::lemmas::LemmaIndex;
use crate::sentence::Sentence;

/// One cloze flashcard. Field names are what the deck importer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnkiCard {
    pub header: String,
    pub cloze_string: String,
    pub backside: String,
}

/// A complete deck, ready to be serialized to JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct CardDeck {
    pub deck_id: i64,
    pub anki_cards: Vec<AnkiCard>,
}

/// Pick one card per (key word, translation) pair.
///
/// For each key word: the surface form with the most example sentences
/// (first-inserted form wins ties), then that form's shortest example
/// sentence by token count (first-encountered wins). The form is
/// cloze-masked everywhere it literally occurs in the sentence's display
/// text. A key word with no recorded forms yields no card.
pub fn select_cards(key_words: &[(String, String)], index: &LemmaIndex<'_>) -> Vec<AnkiCard> {
    let mut cards = Vec::new();

    for (key_word, translation) in key_words {
        let Some(lemma) = index.get(key_word) else {
            continue;
        };

        let mut best: Option<(&str, &[&Sentence])> = None;
        for (form, sentences) in lemma.forms() {
            let better = match best {
                Some((_, current)) => sentences.len() > current.len(),
                None => true,
            };
            if better {
                best = Some((form, sentences));
            }
        }
        let Some((form, sentences)) = best else {
            continue;
        };
        let Some(example) = sentences.iter().min_by_key(|sentence| sentence.len()) else {
            continue;
        };

        let header = if key_word.as_str() == form {
            format!("_ ({translation})")
        } else {
            format!("{key_word} ({translation})")
        };
        let cloze_string = example.text.replace(form, &format!("{{{{c1::{form}}}}}"));

        cards.push(AnkiCard {
            header,
            cloze_string,
            backside: String::new(),
        });
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::sentence_from_pairs;

    #[test]
    fn test_card_for_inflected_key_word() {
        let sentence = sentence_from_pairs(&[
            ("page_start_1", "page_start_1"),
            ("Kaķis", "kaķis"),
            ("ēd", "ēst"),
            ("zivi", "zivs"),
        ]);
        let index = LemmaIndex::from_sentences([&sentence]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].header, "zivs (fish)");
        assert_eq!(cards[0].cloze_string, "Kaķis ēd {{c1::zivi}} ");
        assert_eq!(cards[0].backside, "");
    }

    #[test]
    fn test_underscore_header_when_key_word_equals_form() {
        let sentence = sentence_from_pairs(&[("kaķis", "kaķis"), ("ēd", "ēd")]);
        let index = LemmaIndex::from_sentences([&sentence]);

        let key_words = vec![("ēd".to_string(), "eats".to_string())];
        let cards = select_cards(&key_words, &index);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].header, "_ (eats)");
        assert_eq!(cards[0].cloze_string, "kaķis {{c1::ēd}} ");
    }

    #[test]
    fn test_unknown_lemma_yields_no_card() {
        let sentence = sentence_from_pairs(&[("kaķis", "kaķis")]);
        let index = LemmaIndex::from_sentences([&sentence]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        assert!(select_cards(&key_words, &index).is_empty());
    }

    #[test]
    fn test_picks_form_with_most_sentences() {
        let first = sentence_from_pairs(&[("zivi", "zivs")]);
        let second = sentence_from_pairs(&[("zivis", "zivs"), ("un", "un")]);
        let third = sentence_from_pairs(&[("zivis", "zivs"), ("ēd", "ēst")]);
        let index = LemmaIndex::from_sentences([&first, &second, &third]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        assert!(cards[0].cloze_string.contains("{{c1::zivis}}"));
    }

    #[test]
    fn test_form_tie_breaks_to_first_inserted() {
        let first = sentence_from_pairs(&[("zivi", "zivs")]);
        let second = sentence_from_pairs(&[("zivis", "zivs")]);
        let index = LemmaIndex::from_sentences([&first, &second]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        assert!(cards[0].cloze_string.contains("{{c1::zivi}}"));
    }

    #[test]
    fn test_picks_shortest_example_sentence() {
        let long = sentence_from_pairs(&[
            ("Lielais", "liels"),
            ("kaķis", "kaķis"),
            ("ēd", "ēst"),
            ("zivi", "zivs"),
        ]);
        let short = sentence_from_pairs(&[("Kaķis", "kaķis"), ("ēd", "ēst"), ("zivi", "zivs")]);
        let index = LemmaIndex::from_sentences([&long, &short]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        assert_eq!(cards[0].cloze_string, "Kaķis ēd {{c1::zivi}} ");
    }

    #[test]
    fn test_sentence_tie_breaks_to_first_encountered() {
        let first = sentence_from_pairs(&[("Kaķis", "kaķis"), ("ēd", "ēst"), ("zivi", "zivs")]);
        let second = sentence_from_pairs(&[("Suns", "suns"), ("redz", "redzēt"), ("zivi", "zivs")]);
        let index = LemmaIndex::from_sentences([&first, &second]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        assert_eq!(cards[0].cloze_string, "Kaķis ēd {{c1::zivi}} ");
    }

    #[test]
    fn test_cards_follow_key_word_order() {
        let sentence = sentence_from_pairs(&[("zivi", "zivs"), ("kaķi", "kaķis")]);
        let index = LemmaIndex::from_sentences([&sentence]);

        let key_words = vec![
            ("kaķis".to_string(), "cat".to_string()),
            ("zivs".to_string(), "fish".to_string()),
        ];
        let cards = select_cards(&key_words, &index);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].header, "kaķis (cat)");
        assert_eq!(cards[1].header, "zivs (fish)");
    }

    #[test]
    fn test_cloze_round_trip() {
        let sentence = sentence_from_pairs(&[("Kaķis", "kaķis"), ("ēd", "ēst"), ("zivi", "zivs")]);
        let index = LemmaIndex::from_sentences([&sentence]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        let stripped = cards[0]
            .cloze_string
            .replace("{{c1::", "")
            .replace("}}", "");
        assert_eq!(stripped, sentence.text);
    }

    #[test]
    fn test_every_occurrence_is_masked() {
        let sentence = sentence_from_pairs(&[
            ("zivi", "zivs"),
            ("un", "un"),
            ("zivi", "zivs"),
        ]);
        let index = LemmaIndex::from_sentences([&sentence]);

        let key_words = vec![("zivs".to_string(), "fish".to_string())];
        let cards = select_cards(&key_words, &index);

        assert_eq!(cards[0].cloze_string, "{{c1::zivi}} un {{c1::zivi}} ");
    }

    #[test]
    fn test_deck_serializes_with_expected_field_names() {
        let deck = CardDeck {
            deck_id: 20240101000000,
            anki_cards: vec![AnkiCard {
                header: "zivs (fish)".to_string(),
                cloze_string: "Kaķis ēd {{c1::zivi}} ".to_string(),
                backside: String::new(),
            }],
        };

        let json = serde_json::to_string(&deck).unwrap();
        assert!(json.contains("\"deck_id\""));
        assert!(json.contains("\"anki_cards\""));
        assert!(json.contains("\"header\""));
        assert!(json.contains("\"cloze_string\""));
        assert!(json.contains("\"backside\""));
    }
}
