//! Clause-level parsing of rules text.
//!
//! A clause is one newline-delimited line of a card's rules text. This
//! module segments a token stream into trigger, condition, cost and action
//! parts, derives zone-change information for trigger events and assembles
//! the immutable [`ClauseBlock`] that a compiled card stores per line.

use crate::effect::EffectNode;
use crate::layers::StaticEffectDescriptor;
use crate::tokenizer::{Token, TokenKind};
use crate::zone::Zone;

/// What role a clause plays within a card's rules text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Trigger,
    Condition,
    Action,
}

/// A zone transition implied by a trigger clause ("dies", "enters the
/// battlefield", ...). `None` on either side means "any zone".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneChange {
    pub from: Option<Zone>,
    pub to: Option<Zone>,
}

/// Who controls the subject of a trigger or condition clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectController {
    You,
    Opponent,
}

/// How many subjects the clause talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectAmount {
    Exactly(u32),
    Each,
    Any,
    UpTo,
}

/// Parsed description of a trigger event's subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSubject {
    pub amount: Option<SubjectAmount>,
    pub controller: Option<SubjectController>,
    pub types: Vec<String>,
}

/// Structured form of a trigger clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerNode {
    /// The trigger word that opened the clause ("when", "whenever", ...).
    pub word: String,
    pub subject: TriggerSubject,
    /// Joined action text of the event, if any.
    pub action: Option<String>,
    /// Joined condition text attached to the event, if any.
    pub condition: Option<String>,
    pub zone_change: Option<ZoneChange>,
    /// True for delayed triggers ("at the beginning of the next end step").
    pub delayed: bool,
}

/// Structured form of a condition clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionNode {
    pub controller: Option<SubjectController>,
    pub type_name: Option<String>,
    /// True when the clause implies at least one subject must exist.
    pub count_at_least_one: bool,
    pub raw: String,
}

/// One parsed line of a card's rules text. Immutable after creation.
#[derive(Debug, Clone)]
pub struct ClauseBlock {
    pub raw: String,
    pub kind: ClauseKind,
    pub effect_ir: Option<EffectNode>,
    pub trigger: Option<TriggerNode>,
    pub condition: Option<ConditionNode>,
    pub cost: Option<String>,
    pub static_effect: Option<StaticEffectDescriptor>,
    /// Index of the line within the card's rules text.
    pub source_index: usize,
}

fn joined(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Interpret subject tokens into a [`TriggerSubject`].
fn parse_subject(tokens: &[Token]) -> TriggerSubject {
    let mut subject = TriggerSubject::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        match token.text.as_str() {
            "each" => subject.amount = Some(SubjectAmount::Each),
            "any" => subject.amount = Some(SubjectAmount::Any),
            "one" | "a" => subject.amount = Some(SubjectAmount::Exactly(1)),
            "up" if tokens.get(i + 1).is_some_and(|t| t.text == "to") => {
                subject.amount = Some(SubjectAmount::UpTo);
                i += 1;
            }
            "you" | "your" => {
                subject.controller = Some(SubjectController::You);
                if tokens
                    .get(i + 1)
                    .is_some_and(|t| t.kind == TokenKind::VerbControl)
                {
                    i += 1;
                }
            }
            "opponent" => {
                subject.controller = Some(SubjectController::Opponent);
                if tokens
                    .get(i + 1)
                    .is_some_and(|t| t.kind == TokenKind::VerbControl)
                {
                    i += 1;
                }
            }
            "creature" | "land" | "planeswalker" | "artifact" | "enchantment" | "spell"
            | "permanent" => subject.types.push(token.text.clone()),
            _ if token.kind == TokenKind::TargetingWord => subject.types.push(token.text.clone()),
            _ => {}
        }
        i += 1;
    }
    subject
}

/// Parse tokens beginning at a trigger word.
///
/// Consumes tokens until a clause boundary (comma or "then"), partitioning
/// the remainder into subject, action and condition tokens. Once a
/// condition word is seen, every further token belongs to the condition --
/// the flip is one-way. Returns the trigger node and the index of the
/// first unconsumed token.
pub fn parse_trigger_tokens(tokens: &[Token], start: usize) -> (TriggerNode, usize) {
    let word = tokens
        .get(start)
        .map(|t| t.text.clone())
        .unwrap_or_default();
    let mut i = start + 1;

    let mut subject_tokens: Vec<Token> = Vec::new();
    let mut action_tokens: Vec<Token> = Vec::new();
    let mut condition_tokens: Vec<Token> = Vec::new();
    let mut in_condition = false;

    while i < tokens.len() {
        let token = &tokens[i];
        if token.is_clause_boundary() {
            break;
        }
        if token.kind == TokenKind::ConditionWord {
            in_condition = true;
        }
        if in_condition {
            condition_tokens.push(token.clone());
        } else if matches!(token.kind, TokenKind::ActionWord | TokenKind::AbilityKeyword) {
            action_tokens.push(token.clone());
        } else {
            subject_tokens.push(token.clone());
        }
        i += 1;
    }

    let combined_subject = joined(&subject_tokens);
    let combined_action = joined(&action_tokens);

    let zone_change = if combined_subject.contains("dies") {
        Some(ZoneChange {
            from: Some(Zone::Battlefield),
            to: Some(Zone::Graveyard),
        })
    } else if combined_subject.contains("is exiled") {
        Some(ZoneChange {
            from: Some(Zone::Battlefield),
            to: Some(Zone::Exile),
        })
    } else if combined_subject.contains("enters the battlefield") {
        Some(ZoneChange {
            from: None,
            to: Some(Zone::Battlefield),
        })
    } else if combined_subject.contains("leaves the battlefield") {
        Some(ZoneChange {
            from: Some(Zone::Battlefield),
            to: None,
        })
    } else {
        None
    };

    let delayed = combined_subject.contains("next end step")
        || combined_action.contains("next end step");

    let node = TriggerNode {
        word,
        subject: parse_subject(&subject_tokens),
        action: (!combined_action.is_empty()).then_some(combined_action),
        condition: (!condition_tokens.is_empty()).then(|| joined(&condition_tokens)),
        zone_change,
        delayed,
    };

    (node, i)
}

/// Parse tokens beginning at a condition word.
///
/// Collects tokens up to (and past) the next clause boundary and derives
/// the condition's subject. Returns the node and the first unconsumed
/// index.
pub fn parse_condition_tokens(tokens: &[Token], start: usize) -> (ConditionNode, usize) {
    let mut collected: Vec<Token> = Vec::new();
    let mut i = start + 1;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.is_clause_boundary() {
            i += 1;
            break;
        }
        collected.push(token.clone());
        i += 1;
    }

    let mut node = ConditionNode {
        controller: None,
        type_name: None,
        count_at_least_one: false,
        raw: joined(&collected),
    };
    for token in &collected {
        match token.text.as_str() {
            "you" | "your" => node.controller = Some(SubjectController::You),
            "opponent" => node.controller = Some(SubjectController::Opponent),
            "creature" | "artifact" | "permanent" | "spell" => {
                node.type_name = Some(token.text.clone());
            }
            "another" | "a" | "one" | "two" => node.count_at_least_one = true,
            _ => {}
        }
    }

    (node, i)
}

/// Result of segmenting a clause's tokens into tagged spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Trigger,
    Condition,
    Cost,
    Action,
}

/// Break a token stream into tagged segments (trigger, condition, cost,
/// action). Cost segments run from a cost word up to the next trigger or
/// condition word.
pub fn segment_patterns(tokens: &[Token]) -> Vec<(String, SegmentKind)> {
    let mut segments = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::TriggerWord => {
                let (_, next) = parse_trigger_tokens(tokens, i);
                segments.push((joined(&tokens[i..next]), SegmentKind::Trigger));
                i = next;
            }
            TokenKind::ConditionWord => {
                let (_, next) = parse_condition_tokens(tokens, i);
                segments.push((joined(&tokens[i..next]), SegmentKind::Condition));
                i = next;
            }
            // Cost words double as action words in the lexicon, so match on
            // text membership rather than token kind.
            _ if crate::lexicon::COST_WORDS.contains(&tokens[i].text.as_str()) => {
                let mut j = i + 1;
                while j < tokens.len()
                    && !matches!(
                        tokens[j].kind,
                        TokenKind::TriggerWord | TokenKind::ConditionWord
                    )
                {
                    j += 1;
                }
                segments.push((joined(&tokens[i..j]), SegmentKind::Cost));
                i = j;
            }
            _ => {
                let mut j = i;
                while j < tokens.len()
                    && !matches!(
                        tokens[j].kind,
                        TokenKind::TriggerWord | TokenKind::ConditionWord
                    )
                {
                    j += 1;
                }
                let text = joined(&tokens[i..j]);
                if !text.is_empty() {
                    segments.push((text, SegmentKind::Action));
                }
                i = j;
            }
        }
    }
    segments
}

/// Split a clause's tokens into its structural parts.
///
/// Returns the clause kind, the optional trigger and condition nodes and
/// the remaining action text. Activated-ability costs are split off before
/// tokenization (on the colon in the raw line) by the card compiler.
pub fn split_clause(
    tokens: &[Token],
) -> (ClauseKind, Option<TriggerNode>, Option<ConditionNode>, String) {
    let mut kind = ClauseKind::Action;
    let mut trigger = None;
    let mut condition = None;
    let mut i = 0;

    if tokens.first().map(|t| t.kind) == Some(TokenKind::TriggerWord) {
        let (node, next) = parse_trigger_tokens(tokens, 0);
        trigger = Some(node);
        kind = ClauseKind::Trigger;
        i = next;
        // Skip the boundary token itself.
        if tokens.get(i).is_some_and(Token::is_clause_boundary) {
            i += 1;
        }
    }

    if tokens.get(i).map(|t| t.kind) == Some(TokenKind::ConditionWord) {
        let (node, next) = parse_condition_tokens(tokens, i);
        condition = Some(node);
        if trigger.is_none() {
            kind = ClauseKind::Condition;
        }
        i = next;
    }

    let action_text = joined(&tokens[i..]);
    (kind, trigger, condition, action_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn trigger_for(text: &str) -> TriggerNode {
        let tokens = tokenize(text);
        let (node, _) = parse_trigger_tokens(&tokens, 0);
        node
    }

    #[test]
    fn test_dies_zone_change() {
        let node = trigger_for("whenever a creature dies, draw a card");
        assert_eq!(
            node.zone_change,
            Some(ZoneChange {
                from: Some(Zone::Battlefield),
                to: Some(Zone::Graveyard),
            })
        );
    }

    #[test]
    fn test_is_exiled_zone_change() {
        let node = trigger_for("whenever a creature is exiled, you gain 1 life");
        assert_eq!(
            node.zone_change,
            Some(ZoneChange {
                from: Some(Zone::Battlefield),
                to: Some(Zone::Exile),
            })
        );
    }

    #[test]
    fn test_enters_the_battlefield_zone_change() {
        let node = trigger_for("when this creature enters the battlefield, draw a card");
        assert_eq!(
            node.zone_change,
            Some(ZoneChange {
                from: None,
                to: Some(Zone::Battlefield),
            })
        );
    }

    #[test]
    fn test_leaves_the_battlefield_zone_change() {
        let node = trigger_for("when this creature leaves the battlefield, draw a card");
        assert_eq!(
            node.zone_change,
            Some(ZoneChange {
                from: Some(Zone::Battlefield),
                to: None,
            })
        );
    }

    #[test]
    fn test_condition_flip_is_one_way() {
        let tokens = tokenize("whenever a creature attacks if you control an artifact you gain 1 life");
        let (node, _) = parse_trigger_tokens(&tokens, 0);
        let condition = node.condition.expect("condition text");
        assert!(condition.starts_with("if"));
        // Everything after the condition word stays in the condition, even
        // action-looking words.
        assert!(condition.contains("gain"));
    }

    #[test]
    fn test_boundary_stops_trigger_clause() {
        let tokens = tokenize("whenever a creature dies, draw a card");
        let (_, next) = parse_trigger_tokens(&tokens, 0);
        assert_eq!(tokens[next].text, ",");
    }

    #[test]
    fn test_delayed_detection() {
        let node = trigger_for("at the beginning of the next end step return it to the battlefield");
        assert!(node.delayed);
    }

    #[test]
    fn test_subject_controller_and_type() {
        let node = trigger_for("whenever a creature you control dies, draw a card");
        assert_eq!(node.subject.controller, Some(SubjectController::You));
        assert!(node.subject.types.contains(&"creature".to_string()));
    }

    #[test]
    fn test_split_clause_trigger_then_action() {
        let tokens = tokenize("when this creature dies, draw a card");
        let (kind, trigger, _, action) = split_clause(&tokens);
        assert_eq!(kind, ClauseKind::Trigger);
        assert!(trigger.is_some());
        assert_eq!(action, "draw a card");
    }

    #[test]
    fn test_split_clause_condition() {
        let tokens = tokenize("if you control a creature, draw a card");
        let (kind, trigger, condition, _) = split_clause(&tokens);
        assert_eq!(kind, ClauseKind::Condition);
        assert!(trigger.is_none());
        let condition = condition.expect("condition node");
        assert_eq!(condition.controller, Some(SubjectController::You));
        assert!(condition.count_at_least_one);
    }

    #[test]
    fn test_cost_segmentation() {
        let tokens = tokenize("sacrifice a creature draw a card");
        let segments = segment_patterns(&tokens);
        assert_eq!(segments[0].1, SegmentKind::Cost);
        assert!(segments[0].0.starts_with("sacrifice"));
    }
}
