//! Closed vocabulary tables for rules-text tokenization.
//!
//! This module is the single source of truth for the word and phrase sets
//! shared by the tokenizer, the clause parser and the phrase registry. No
//! game-state logic lives here.

/// Words and phrases that start triggered abilities.
pub const TRIGGER_WORDS: &[&str] = &[
    "when",
    "whenever",
    "at the beginning of",
    "at end of combat",
    "at the start of your upkeep",
    "at the end of your turn",
    "at your end step",
];

/// Words that introduce conditional clauses.
pub const CONDITION_WORDS: &[&str] = &[
    "if", "unless", "as long as", "until", "during", "instead", "after", "before", "whilst",
];

/// Common action verbs found in rules text.
pub const ACTION_WORDS: &[&str] = &[
    "draw",
    "discard",
    "destroy",
    "exile",
    "tap",
    "untap",
    "create",
    "gain",
    "lose",
    "search",
    "reveal",
    "return",
    "counter",
    "sacrifice",
    "sacrifices",
    "pay",
    "cast",
    "attack",
    "block",
    "equip",
    "enchant",
    "flip",
    "mill",
    "venture",
    "explore",
    "investigate",
    "amass",
    "fight",
    "adapt",
    "proliferate",
    "scry",
    "connive",
];

/// Targeting indicators and common object descriptors.
pub const TARGETING_WORDS: &[&str] = &[
    "target",
    "choose",
    "each",
    "any",
    "up to",
    "each opponent",
    "each player",
    "each creature",
    "opponent",
    "player",
    "planeswalker",
    "artifact",
    "enchantment",
    "creature",
    "land",
    "spell",
    "permanent",
    "nonland",
    "nontoken",
    "noncreature",
    "nonartifact",
];

/// Zones referenced within card text.
pub const ZONE_WORDS: &[&str] = &[
    "battlefield",
    "graveyard",
    "exile",
    "library",
    "hand",
    "stack",
    "command zone",
];

/// Timing restrictions or clauses.
pub const TIMING_WORDS: &[&str] = &[
    "only as a sorcery",
    "instant speed",
    "during your upkeep",
    "during combat",
    "end of turn",
    "before damage",
    "after blockers are declared",
    "at any time",
];

/// Static ability keywords recognised by the engine.
pub const ABILITY_KEYWORDS: &[&str] = &[
    "flying",
    "first strike",
    "double strike",
    "deathtouch",
    "lifelink",
    "vigilance",
    "trample",
    "hexproof",
    "menace",
    "ward",
    "indestructible",
    "protection",
    "haste",
    "reach",
];

/// Cost-related verbs.
pub const COST_WORDS: &[&str] = &["sacrifice", "discard", "pay"];

pub const ARTICLES_INDEFINITE: &[&str] = &["a", "an"];
pub const ARTICLES_DEFINITE: &[&str] = &["the"];
pub const PRONOUNS_SUBJECT: &[&str] = &["you", "they"];
pub const PRONOUNS_POSSESSIVE: &[&str] = &["your", "their"];

/// Quantifiers including common number words.
pub const QUANTIFIERS: &[&str] = &[
    "each",
    "any",
    "one",
    "all",
    "up to",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "x",
    "any number",
    "at least",
    "no more than",
];

pub const VERBS_CONTROL: &[&str] = &["control", "controls"];
pub const VERBS_STATE: &[&str] = &["has", "have"];
pub const VERBS_BE: &[&str] = &["is", "are", "was", "were"];
pub const MODAL_VERBS: &[&str] = &["choose", "may", "must", "can", "shall", "could"];
pub const PREPOSITIONS: &[&str] = &["of", "with", "without"];
pub const TEMPORAL_MODIFIERS: &[&str] = &["during", "before", "after"];
pub const PLAYER_ROLES: &[&str] = &["opponent", "player"];
pub const RESOURCE_TERMS: &[&str] = &["life", "mana", "damage", "counter", "token"];
pub const OBJECT_TERMS: &[&str] = &["card", "spell", "permanent", "player", "ability", "emblem"];
pub const EFFECT_TERMS: &[&str] = &[
    "gain", "lose", "prevent", "add", "remove", "create", "destroy",
];

/// The five card colors, used by token-creation phrase parsing.
pub const COLORS: &[&str] = &["white", "blue", "black", "red", "green"];

/// Number words the quantifier table carries, in value order starting at one.
const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Map a digit string or spelled-out number word to its value.
///
/// Returns `None` for variable amounts ("x", "any number") and anything
/// outside the closed set; callers decide how to flag those.
pub fn numeral_value(word: &str) -> Option<u32> {
    let word = word.trim().to_ascii_lowercase();
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    NUMBER_WORDS
        .iter()
        .position(|w| *w == word)
        .map(|i| i as u32 + 1)
}
