//! The canonical effect IR.
//!
//! Parsing compiles each rules-text line into a tree of [`EffectNode`]s.
//! The tree is produced once per card; targets are resolved fresh each time
//! the card is cast. The interpreter in [`crate::engine`] walks this tree.
//!
//! Action names form a closed enumeration with an `Unparsed` diagnostic
//! variant, so an unrecognized clause degrades to a logged no-op instead of
//! an error.

/// A numeric amount attached to an action.
///
/// Variable amounts ("x", "any number") are carried as written and flagged
/// at execution time rather than silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Amount {
    Fixed(u32),
    Variable(String),
}

impl Amount {
    /// The fixed value, if this amount is fixed.
    pub fn fixed(&self) -> Option<u32> {
        match self {
            Amount::Fixed(n) => Some(*n),
            Amount::Variable(_) => None,
        }
    }
}

/// The closed vocabulary of one-shot actions the interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    DrawCard,
    GainLife,
    LoseLife,
    DealDamage,
    GrantKeyword,
    CreateToken,
    ApplyPtModifier,
    SearchLibrary,
    DiscardCards,
    ExileFromHand,
    MultiPlayerDiscard,
    UntapPermanents,
    PutIntoLibraryDepth,
    DestroyTarget,
    ConditionalFallback,
    ExileTarget,
    TapTarget,
    UntapTarget,
    ReturnToHand,
    CounterSpell,
    ReturnToBattlefield,
    SetStateFlag,
    /// Diagnostic leaf for text no registry entry matched.
    Unparsed,
}

impl ActionKind {
    /// The snake_case action name used in logs and serialized IR.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::DrawCard => "draw_card",
            ActionKind::GainLife => "gain_life",
            ActionKind::LoseLife => "lose_life",
            ActionKind::DealDamage => "deal_damage",
            ActionKind::GrantKeyword => "grant_keyword",
            ActionKind::CreateToken => "create_token",
            ActionKind::ApplyPtModifier => "apply_pt_modifier",
            ActionKind::SearchLibrary => "search_library",
            ActionKind::DiscardCards => "discard_cards",
            ActionKind::ExileFromHand => "exile_from_hand",
            ActionKind::MultiPlayerDiscard => "multi_player_discard",
            ActionKind::UntapPermanents => "untap_permanents",
            ActionKind::PutIntoLibraryDepth => "put_into_library_depth",
            ActionKind::DestroyTarget => "destroy_target",
            ActionKind::ConditionalFallback => "conditional_fallback",
            ActionKind::ExileTarget => "exile_target",
            ActionKind::TapTarget => "tap_target",
            ActionKind::UntapTarget => "untap_target",
            ActionKind::ReturnToHand => "return_to_hand",
            ActionKind::CounterSpell => "counter_spell",
            ActionKind::ReturnToBattlefield => "return_to_battlefield",
            ActionKind::SetStateFlag => "set_state_flag",
            ActionKind::Unparsed => "unparsed_effect",
        }
    }
}

/// Description of a creature or artifact token to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenSpec {
    pub power: Option<u32>,
    pub toughness: Option<u32>,
    pub colors: Vec<String>,
    pub abilities: Vec<String>,
    /// Token copies its source ("offspring"-style effects).
    pub copy_of_source: bool,
}

/// A single action leaf of the effect tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub kind: ActionKind,
    pub amount: Option<Amount>,
    /// Keyword being granted, for `GrantKeyword`.
    pub keyword: Option<String>,
    /// Token description, for `CreateToken`.
    pub token: Option<TokenSpec>,
    /// Power/toughness delta, for `ApplyPtModifier` (until end of turn).
    pub pt_modifier: Option<(i32, i32)>,
    /// Pronoun reference this leaf reads ("that_creature", "those_tokens").
    pub reference_tag: Option<String>,
    /// Pronoun reference this leaf writes for later leaves in the same
    /// resolution.
    pub store_as: Option<String>,
    /// Whether a searched card is revealed, for `SearchLibrary`.
    pub reveal: bool,
    /// Depth from the top of the library, for `PutIntoLibraryDepth`.
    pub position: Option<u32>,
    /// State flag name, for `SetStateFlag`.
    pub flag: Option<String>,
    /// Original clause text, kept on diagnostic leaves.
    pub raw_text: Option<String>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            amount: None,
            keyword: None,
            token: None,
            pt_modifier: None,
            reference_tag: None,
            store_as: None,
            reveal: false,
            position: None,
            flag: None,
            raw_text: None,
        }
    }

    /// Diagnostic leaf carrying the unmatched clause text verbatim.
    pub fn unparsed(raw_text: impl Into<String>) -> Self {
        let mut action = Action::new(ActionKind::Unparsed);
        action.raw_text = Some(raw_text.into());
        action
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_reference_tag(mut self, tag: impl Into<String>) -> Self {
        self.reference_tag = Some(tag.into());
        self
    }

    pub fn with_store_as(mut self, tag: impl Into<String>) -> Self {
        self.store_as = Some(tag.into());
        self
    }
}

/// A node of the canonical effect tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectNode {
    /// Execute children in order.
    Chain(Vec<EffectNode>),
    /// Evaluate `condition` and take one branch.
    Conditional {
        condition: String,
        then_branch: Box<EffectNode>,
        else_branch: Option<Box<EffectNode>>,
    },
    /// One of `choices` is selected before resolution.
    Modal {
        choices: Vec<EffectNode>,
        choose_count: u32,
    },
    /// Execute children once per player.
    Repeat(Vec<EffectNode>),
    /// A single action leaf.
    Action(Action),
}

impl EffectNode {
    /// Convenience constructor for a single-action tree.
    pub fn action(action: Action) -> Self {
        EffectNode::Action(action)
    }

    /// True if this tree contains no action leaves at all.
    pub fn is_empty(&self) -> bool {
        match self {
            EffectNode::Chain(children) | EffectNode::Repeat(children) => {
                children.iter().all(EffectNode::is_empty)
            }
            EffectNode::Conditional {
                then_branch,
                else_branch,
                ..
            } => {
                then_branch.is_empty()
                    && else_branch.as_ref().is_none_or(|branch| branch.is_empty())
            }
            EffectNode::Modal { choices, .. } => choices.iter().all(EffectNode::is_empty),
            EffectNode::Action(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsed_keeps_raw_text() {
        let action = Action::unparsed("blorbo the magnificent");
        assert_eq!(action.kind, ActionKind::Unparsed);
        assert_eq!(action.raw_text.as_deref(), Some("blorbo the magnificent"));
    }

    #[test]
    fn test_empty_detection() {
        assert!(EffectNode::Chain(vec![]).is_empty());
        assert!(!EffectNode::Action(Action::new(ActionKind::DrawCard)).is_empty());
    }

    #[test]
    fn test_action_names_are_snake_case() {
        assert_eq!(ActionKind::DrawCard.name(), "draw_card");
        assert_eq!(ActionKind::Unparsed.name(), "unparsed_effect");
    }
}
