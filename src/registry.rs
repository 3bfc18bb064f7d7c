//! Phrase registry: ordered matching of effect text to IR builders.
//!
//! Each entry owns a list of trigger phrases and a builder function. The
//! first entry whose phrase list contains a substring of the leaf text wins
//! -- insertion order is significant, this is first-match-wins, not
//! longest-match. Text no entry matches becomes an `Unparsed` diagnostic
//! leaf; parsing one bad clause never blocks the rest of the card.

use crate::ast::AstNode;
use crate::effect::{Action, ActionKind, Amount, EffectNode, TokenSpec};
use crate::lexicon;

type Builder = fn(&str) -> EffectNode;

/// One phrase-table entry.
pub struct RegistryEntry {
    pub name: &'static str,
    pub phrases: Vec<String>,
    builder: Builder,
}

/// The ordered phrase registry.
pub struct PhraseRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for PhraseRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Text helpers shared by builders
// ---------------------------------------------------------------------------

/// Pull a numeric amount out of clause text. Digits and spelled-out number
/// words give fixed amounts; "x" is carried as a variable amount and
/// flagged at execution time instead of being guessed.
fn extract_amount(text: &str) -> Option<Amount> {
    for word in text.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if word == "x" {
            return Some(Amount::Variable("x".to_string()));
        }
        if let Some(n) = lexicon::numeral_value(word) {
            return Some(Amount::Fixed(n));
        }
    }
    // "a card", "an artifact": the indefinite article means one.
    if text.contains(" a ") || text.contains(" an ") || text.starts_with("a ") {
        return Some(Amount::Fixed(1));
    }
    None
}

/// Ordinal depth words for "put it into your library third from the top".
fn extract_ordinal(text: &str) -> Option<u32> {
    const ORDINALS: &[(&str, u32)] = &[
        ("second", 2),
        ("third", 3),
        ("fourth", 4),
        ("fifth", 5),
        ("sixth", 6),
        ("seventh", 7),
    ];
    ORDINALS
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, n)| *n)
}

/// Find a "3/3"-style power/toughness pair in token text.
fn extract_power_toughness(text: &str) -> Option<(u32, u32)> {
    let bytes = text.as_bytes();
    for i in 1..bytes.len().saturating_sub(1) {
        if bytes[i] == b'/' && bytes[i - 1].is_ascii_digit() && bytes[i + 1].is_ascii_digit() {
            let power = (bytes[i - 1] - b'0') as u32;
            let toughness = (bytes[i + 1] - b'0') as u32;
            return Some((power, toughness));
        }
    }
    None
}

fn reference_tag_for(text: &str) -> Option<String> {
    if text.contains("that creature") {
        Some("that_creature".to_string())
    } else if text.contains("that spell") {
        Some("that_spell".to_string())
    } else if text.contains("those tokens") {
        Some("those_tokens".to_string())
    } else {
        None
    }
}

fn action_with_amount(kind: ActionKind, text: &str) -> EffectNode {
    let mut action = Action::new(kind);
    action.amount = extract_amount(text);
    EffectNode::Action(action)
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn build_draw_card(text: &str) -> EffectNode {
    action_with_amount(ActionKind::DrawCard, text)
}

fn build_gain_life(text: &str) -> EffectNode {
    action_with_amount(ActionKind::GainLife, text)
}

fn build_lose_life(text: &str) -> EffectNode {
    action_with_amount(ActionKind::LoseLife, text)
}

fn build_deal_damage(text: &str) -> EffectNode {
    action_with_amount(ActionKind::DealDamage, text)
}

fn build_destroy_target(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::DestroyTarget))
}

fn build_exile_target(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::ExileTarget))
}

fn build_tap_target(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::TapTarget))
}

fn build_untap_target(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::UntapTarget))
}

fn build_return_to_hand(text: &str) -> EffectNode {
    let mut action = Action::new(ActionKind::ReturnToHand);
    action.reference_tag = reference_tag_for(text);
    EffectNode::Action(action)
}

fn build_counter_spell(text: &str) -> EffectNode {
    let mut action = Action::new(ActionKind::CounterSpell);
    action.reference_tag = reference_tag_for(text);
    EffectNode::Action(action)
}

fn build_return_to_battlefield(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::ReturnToBattlefield))
}

fn build_create_token(text: &str) -> EffectNode {
    let mut token = TokenSpec::default();
    if let Some((power, toughness)) = extract_power_toughness(text) {
        token.power = Some(power);
        token.toughness = Some(toughness);
    }
    for color in lexicon::COLORS {
        if text.contains(color) {
            token.colors.push(color.to_string());
        }
    }
    for keyword in lexicon::ABILITY_KEYWORDS {
        if text.contains(keyword) {
            token.abilities.push(keyword.to_string());
        }
    }
    if text.contains("offspring") {
        token.copy_of_source = true;
        token.power = Some(1);
        token.toughness = Some(1);
    }

    let mut action = Action::new(ActionKind::CreateToken);
    action.amount = extract_amount(text);
    action.token = Some(token);
    // Later leaves in the same resolution refer back with "those tokens".
    action.store_as = Some("those_tokens".to_string());
    EffectNode::Action(action)
}

fn build_search_library(text: &str) -> EffectNode {
    let mut action = Action::new(ActionKind::SearchLibrary);
    action.reveal = text.contains("reveal");
    EffectNode::Action(action)
}

fn build_multi_player_discard(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::MultiPlayerDiscard))
}

fn build_discard_cards(text: &str) -> EffectNode {
    action_with_amount(ActionKind::DiscardCards, text)
}

fn build_exile_from_hand(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::ExileFromHand))
}

fn build_untap_permanents(text: &str) -> EffectNode {
    action_with_amount(ActionKind::UntapPermanents, text)
}

fn build_put_into_library_depth(text: &str) -> EffectNode {
    let mut action = Action::new(ActionKind::PutIntoLibraryDepth);
    action.position = extract_ordinal(text);
    EffectNode::Action(action)
}

fn build_apply_pt_modifier(text: &str) -> EffectNode {
    let mut action = Action::new(ActionKind::ApplyPtModifier);
    if text.contains("+1/+1") {
        action.pt_modifier = Some((1, 1));
    } else if text.contains("-1/-1") {
        action.pt_modifier = Some((-1, -1));
    }
    action.reference_tag = reference_tag_for(text);
    EffectNode::Action(action)
}

fn build_grant_keyword(text: &str) -> EffectNode {
    let keyword = lexicon::ABILITY_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| text.contains(keyword));
    let mut action = Action::new(ActionKind::GrantKeyword);
    action.keyword = keyword.map(str::to_string);
    action.reference_tag = reference_tag_for(text);
    EffectNode::Action(action)
}

fn build_conditional_fallback(_text: &str) -> EffectNode {
    EffectNode::Action(Action::new(ActionKind::ConditionalFallback))
}

fn build_set_state_flag(_text: &str) -> EffectNode {
    let mut action = Action::new(ActionKind::SetStateFlag);
    action.flag = Some("solved".to_string());
    EffectNode::Action(action)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

impl PhraseRegistry {
    /// The standard entry set, in match-priority order.
    pub fn standard() -> Self {
        let entries = vec![
            RegistryEntry {
                name: "draw_card",
                phrases: phrases(&["draw a card", "draws a card", "draw two cards", "draw three cards", "draw x cards"]),
                builder: build_draw_card,
            },
            RegistryEntry {
                name: "gain_life",
                phrases: phrases(&["gain life", "you gain", "gains life"]),
                builder: build_gain_life,
            },
            RegistryEntry {
                name: "lose_life",
                phrases: phrases(&["lose life", "you lose", "loses life", "each opponent loses"]),
                builder: build_lose_life,
            },
            RegistryEntry {
                name: "deal_damage",
                phrases: phrases(&["deal damage", "deals damage", "deals", "deal "]),
                builder: build_deal_damage,
            },
            RegistryEntry {
                name: "destroy_target",
                phrases: phrases(&[
                    "destroy target",
                    "destroy target tapped creature",
                    "destroy target artifact",
                    "destroy target planeswalker",
                ]),
                builder: build_destroy_target,
            },
            RegistryEntry {
                name: "exile_target",
                phrases: phrases(&["exile target", "exile up to one target"]),
                builder: build_exile_target,
            },
            RegistryEntry {
                name: "exile_from_hand",
                phrases: phrases(&["exile a card from", "exiles a card from"]),
                builder: build_exile_from_hand,
            },
            RegistryEntry {
                name: "tap_target",
                phrases: phrases(&["tap target creature", "tap target permanent", "tap target"]),
                builder: build_tap_target,
            },
            RegistryEntry {
                name: "untap_permanents",
                phrases: phrases(&["untap up to", "untap all"]),
                builder: build_untap_permanents,
            },
            RegistryEntry {
                name: "untap_target",
                phrases: phrases(&["untap target creature", "untap target permanent", "untap target"]),
                builder: build_untap_target,
            },
            RegistryEntry {
                name: "return_to_battlefield",
                phrases: phrases(&["return it to the battlefield", "return that card to the battlefield"]),
                builder: build_return_to_battlefield,
            },
            RegistryEntry {
                name: "return_to_hand",
                phrases: phrases(&[
                    "return target creature to its owner's hand",
                    "return target permanent to its owner's hand",
                    "return that creature",
                    "return that spell",
                    "to its owner's hand",
                ]),
                builder: build_return_to_hand,
            },
            RegistryEntry {
                name: "counter_spell",
                phrases: phrases(&[
                    "counter target spell",
                    "counter target activated ability",
                    "counter target triggered ability",
                ]),
                builder: build_counter_spell,
            },
            RegistryEntry {
                name: "create_token",
                phrases: phrases(&["create a token", "create a", "create an", "creates a"]),
                builder: build_create_token,
            },
            RegistryEntry {
                name: "search_library",
                phrases: phrases(&["search your library", "searches their library"]),
                builder: build_search_library,
            },
            RegistryEntry {
                name: "multi_player_discard",
                phrases: phrases(&["each opponent discards", "each player discards"]),
                builder: build_multi_player_discard,
            },
            RegistryEntry {
                name: "discard_cards",
                phrases: phrases(&["discard a card", "discards a card", "discard two cards", "discard"]),
                builder: build_discard_cards,
            },
            RegistryEntry {
                name: "put_into_library_depth",
                phrases: phrases(&["into your library", "into their library", "from the top of your library"]),
                builder: build_put_into_library_depth,
            },
            RegistryEntry {
                name: "apply_pt_modifier",
                phrases: phrases(&["gets +1/+1 until end of turn", "gets -1/-1 until end of turn"]),
                builder: build_apply_pt_modifier,
            },
            RegistryEntry {
                name: "grant_keyword",
                phrases: phrases(&["gains ", "gain flying", "gain haste"]),
                builder: build_grant_keyword,
            },
            RegistryEntry {
                name: "conditional_fallback",
                phrases: phrases(&["if they can't"]),
                builder: build_conditional_fallback,
            },
            RegistryEntry {
                name: "set_state_flag",
                phrases: phrases(&["solve the case", "solved"]),
                builder: build_set_state_flag,
            },
        ];
        Self { entries }
    }

    /// Match leaf text against the registry, first match wins. Unmatched
    /// text becomes an `Unparsed` diagnostic leaf -- never an error.
    pub fn parse_effect(&self, text: &str) -> EffectNode {
        let text = text.to_lowercase();
        for entry in &self.entries {
            if entry.phrases.iter().any(|phrase| text.contains(phrase.as_str())) {
                return (entry.builder)(&text);
            }
        }
        EffectNode::Action(Action::unparsed(text))
    }

    /// Mirror one AST node into the canonical effect tree.
    pub fn parse_ast(&self, node: &AstNode) -> EffectNode {
        match node {
            AstNode::Modal { options } => EffectNode::Modal {
                choices: options.iter().map(|option| self.parse_ast(option)).collect(),
                choose_count: 1,
            },
            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => EffectNode::Conditional {
                condition: condition.clone(),
                then_branch: Box::new(self.parse_nodes(then_branch)),
                else_branch: else_branch
                    .as_ref()
                    .map(|nodes| Box::new(self.parse_nodes(nodes))),
            },
            AstNode::Repeat { children, .. } => EffectNode::Repeat(
                children.iter().map(|child| self.parse_ast(child)).collect(),
            ),
            AstNode::Effect { content } => self.parse_effect(content),
        }
    }

    /// Compile a list of AST nodes into a single chain.
    pub fn parse_nodes(&self, nodes: &[AstNode]) -> EffectNode {
        match nodes {
            [single] => self.parse_ast(single),
            _ => EffectNode::Chain(nodes.iter().map(|node| self.parse_ast(node)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let registry = PhraseRegistry::standard();
        // "destroy target" appears before any later phrase that could also
        // match; the destroy entry must win.
        let node = registry.parse_effect("destroy target creature");
        let EffectNode::Action(action) = node else {
            panic!("expected action leaf");
        };
        assert_eq!(action.kind, ActionKind::DestroyTarget);
    }

    #[test]
    fn test_unmatched_text_parses_to_unparsed_verbatim() {
        let registry = PhraseRegistry::standard();
        let text = "venture into the dungeon with great enthusiasm";
        let EffectNode::Action(action) = registry.parse_effect(text) else {
            panic!("expected action leaf");
        };
        assert_eq!(action.kind, ActionKind::Unparsed);
        assert_eq!(action.raw_text.as_deref(), Some(text));
    }

    #[test]
    fn test_numeral_amount_extraction() {
        let registry = PhraseRegistry::standard();
        let EffectNode::Action(action) = registry.parse_effect("you gain 3 life") else {
            panic!("expected action leaf");
        };
        assert_eq!(action.kind, ActionKind::GainLife);
        assert_eq!(action.amount, Some(Amount::Fixed(3)));

        let EffectNode::Action(action) = registry.parse_effect("draw two cards") else {
            panic!("expected action leaf");
        };
        assert_eq!(action.amount, Some(Amount::Fixed(2)));
    }

    #[test]
    fn test_variable_amount_is_flagged_not_guessed() {
        let registry = PhraseRegistry::standard();
        let EffectNode::Action(action) = registry.parse_effect("draw x cards") else {
            panic!("expected action leaf");
        };
        assert_eq!(action.amount, Some(Amount::Variable("x".to_string())));
    }

    #[test]
    fn test_create_token_extraction() {
        let registry = PhraseRegistry::standard();
        let EffectNode::Action(action) =
            registry.parse_effect("create a 3/3 green beast creature token")
        else {
            panic!("expected action leaf");
        };
        assert_eq!(action.kind, ActionKind::CreateToken);
        let token = action.token.expect("token spec");
        assert_eq!(token.power, Some(3));
        assert_eq!(token.toughness, Some(3));
        assert_eq!(token.colors, vec!["green".to_string()]);
    }

    #[test]
    fn test_offspring_token_copies_source() {
        let registry = PhraseRegistry::standard();
        let EffectNode::Action(action) = registry.parse_effect("create an offspring token") else {
            panic!("expected action leaf");
        };
        let token = action.token.expect("token spec");
        assert!(token.copy_of_source);
        assert_eq!(token.power, Some(1));
    }

    #[test]
    fn test_modal_ast_maps_to_modal_tree() {
        let registry = PhraseRegistry::standard();
        let ast = crate::ast::compile("Choose one — Destroy target creature; draw a card.");
        let EffectNode::Modal {
            choices,
            choose_count,
        } = registry.parse_nodes(&ast)
        else {
            panic!("expected modal tree");
        };
        assert_eq!(choose_count, 1);
        assert_eq!(choices.len(), 2);
    }

    #[test]
    fn test_reference_tag_round_trip() {
        let registry = PhraseRegistry::standard();
        let EffectNode::Action(action) =
            registry.parse_effect("return that creature to its owner's hand")
        else {
            panic!("expected action leaf");
        };
        assert_eq!(action.kind, ActionKind::ReturnToHand);
        assert_eq!(action.reference_tag.as_deref(), Some("that_creature"));
    }
}
