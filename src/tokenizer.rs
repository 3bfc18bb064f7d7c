//! Closed-vocabulary tokenizer for rules text.
//!
//! `tokenize` lowercases its input, strips sentence punctuation and scans
//! word-by-word, attempting maximal-munch phrase lookup against the trigger
//! and timing phrase tables (windows of 5, 4, 3 and 2 words) before falling
//! back to single-word classification. Every input produces a token
//! sequence; words outside every vocabulary become `Unknown` tokens.
//!
//! Commas survive as their own `Unknown`-kind tokens: the clause parser
//! treats them as clause boundaries.

use crate::lexicon;

/// Classification of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    TriggerWord,
    ConditionWord,
    ActionWord,
    CostWord,
    TargetingWord,
    ZoneReference,
    TimingModifier,
    AbilityKeyword,
    Numeric,
    ArticleIndefinite,
    ArticleDefinite,
    PronounSubject,
    PronounPossessive,
    Quantifier,
    VerbControl,
    VerbState,
    VerbBe,
    ModalVerb,
    Preposition,
    TemporalModifier,
    PlayerRole,
    ResourceTerm,
    ObjectTerm,
    EffectTerm,
    Unknown,
}

/// A single token of rules text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// True if this token is a clause boundary (a comma or "then").
    pub fn is_clause_boundary(&self) -> bool {
        self.text == "," || self.text == "then"
    }
}

fn contains(table: &[&str], word: &str) -> bool {
    table.contains(&word)
}

/// Strip sentence punctuation, keeping commas as standalone words.
fn clean_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '.' | ';' | ':' | '!' | '?' => {}
            ',' => {
                out.push(' ');
                out.push(',');
                out.push(' ');
            }
            '\u{2014}' => out.push('-'),
            _ => out.push(ch),
        }
    }
    out
}

/// Tokenize `text` into a flat token sequence.
///
/// Deterministic: identical input text always yields the identical token
/// sequence. Never fails; unrecognized words become `Unknown` tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let cleaned = clean_punctuation(&text.to_lowercase());
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut tokens = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let word = words[i];

        // Maximal munch: multi-word phrase lookup before single words. A
        // recognized phrase must never be re-tokenized as its components.
        let max_window = usize::min(5, words.len() - i);
        let mut matched = false;
        for window in (2..=max_window).rev() {
            let phrase = words[i..i + window].join(" ");
            if contains(lexicon::TRIGGER_WORDS, &phrase) {
                tokens.push(Token::new(phrase, TokenKind::TriggerWord));
                i += window;
                matched = true;
                break;
            }
            if contains(lexicon::TIMING_WORDS, &phrase) {
                tokens.push(Token::new(phrase, TokenKind::TimingModifier));
                i += window;
                matched = true;
                break;
            }
        }
        if matched {
            continue;
        }

        let kind = if contains(lexicon::TRIGGER_WORDS, word) {
            TokenKind::TriggerWord
        } else if contains(lexicon::CONDITION_WORDS, word) {
            TokenKind::ConditionWord
        } else if contains(lexicon::ACTION_WORDS, word) {
            TokenKind::ActionWord
        } else if contains(lexicon::TARGETING_WORDS, word) {
            TokenKind::TargetingWord
        } else if contains(lexicon::ZONE_WORDS, word) {
            TokenKind::ZoneReference
        } else if contains(lexicon::TIMING_WORDS, word) {
            TokenKind::TimingModifier
        } else if contains(lexicon::ABILITY_KEYWORDS, word) {
            TokenKind::AbilityKeyword
        } else if contains(lexicon::COST_WORDS, word) {
            TokenKind::CostWord
        } else if contains(lexicon::ARTICLES_INDEFINITE, word) {
            TokenKind::ArticleIndefinite
        } else if contains(lexicon::ARTICLES_DEFINITE, word) {
            TokenKind::ArticleDefinite
        } else if contains(lexicon::PRONOUNS_SUBJECT, word) {
            TokenKind::PronounSubject
        } else if contains(lexicon::PRONOUNS_POSSESSIVE, word) {
            TokenKind::PronounPossessive
        } else if contains(lexicon::QUANTIFIERS, word) {
            TokenKind::Quantifier
        } else if contains(lexicon::VERBS_CONTROL, word) {
            TokenKind::VerbControl
        } else if contains(lexicon::VERBS_STATE, word) {
            TokenKind::VerbState
        } else if contains(lexicon::VERBS_BE, word) {
            TokenKind::VerbBe
        } else if contains(lexicon::MODAL_VERBS, word) {
            TokenKind::ModalVerb
        } else if contains(lexicon::PREPOSITIONS, word) {
            TokenKind::Preposition
        } else if contains(lexicon::TEMPORAL_MODIFIERS, word) {
            TokenKind::TemporalModifier
        } else if contains(lexicon::PLAYER_ROLES, word) {
            TokenKind::PlayerRole
        } else if contains(lexicon::RESOURCE_TERMS, word) {
            TokenKind::ResourceTerm
        } else if contains(lexicon::OBJECT_TERMS, word) {
            TokenKind::ObjectTerm
        } else if contains(lexicon::EFFECT_TERMS, word) {
            TokenKind::EffectTerm
        } else if word.chars().all(|c| c.is_ascii_digit()) && !word.is_empty() {
            TokenKind::Numeric
        } else {
            TokenKind::Unknown
        };

        tokens.push(Token::new(word, kind));
        i += 1;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "Whenever a creature dies, draw a card.";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn test_maximal_munch_trigger_phrase() {
        let tokens = tokenize("at the beginning of your upkeep draw a card");
        assert_eq!(tokens[0].text, "at the beginning of");
        assert_eq!(tokens[0].kind, TokenKind::TriggerWord);
        // The phrase must appear as exactly one token, never split.
        assert!(tokens.iter().filter(|t| t.text == "at").count() == 0);
        assert!(tokens.iter().filter(|t| t.text == "beginning").count() == 0);
    }

    #[test]
    fn test_maximal_munch_timing_phrase() {
        let tokens = tokenize("only as a sorcery");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::TimingModifier);
        assert_eq!(tokens[0].text, "only as a sorcery");
    }

    #[test]
    fn test_single_word_classification() {
        let tokens = tokenize("destroy target creature");
        assert_eq!(tokens[0].kind, TokenKind::ActionWord);
        assert_eq!(tokens[1].kind, TokenKind::TargetingWord);
        assert_eq!(tokens[2].kind, TokenKind::TargetingWord);
    }

    #[test]
    fn test_unknown_words_never_fail() {
        let tokens = tokenize("blorbo the xyzzy");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].kind, TokenKind::ArticleDefinite);
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_commas_survive_as_boundaries() {
        let tokens = tokenize("when this creature dies, draw a card");
        assert!(tokens.iter().any(|t| t.text == ","));
        assert!(tokens.iter().all(|t| !t.text.contains('.')));
    }

    #[test]
    fn test_numeric_token() {
        let tokens = tokenize("deals 2 damage");
        assert_eq!(tokens[1].kind, TokenKind::Numeric);
        assert_eq!(tokens[1].text, "2");
    }
}
