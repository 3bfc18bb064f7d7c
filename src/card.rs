//! Card metadata, the compile pipeline and the metadata repository.
//!
//! [`OracleCompiler`] owns the full text-to-IR pipeline: each line of a
//! card's rules text is tokenized, clause-split, AST-compiled and matched
//! against the phrase registry, producing one [`ClauseBlock`] per line.
//! Static lines compile to layer descriptors instead of one-shot IR.
//!
//! [`CardRepository`] replaces any global card-data singleton: it is a
//! plain value passed explicitly to whoever needs metadata, with
//! persistence behind the storage interface in [`crate::storage`].

use std::collections::HashMap;

use crate::ast;
use crate::clause::{split_clause, ClauseBlock, ClauseKind};
use crate::effect::EffectNode;
use crate::game_state::Target;
use crate::ids::{CardId, ObjectId, PlayerId};
use crate::layers::{self, LayerManager, StaticEffectDescriptor};
use crate::lexicon;
use crate::registry::PhraseRegistry;
use crate::stack::StackEntry;
use crate::tokenizer::tokenize;

/// Static card data as a catalog would serve it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CardMetadata {
    pub name: String,
    pub oracle_text: String,
    pub type_line: String,
    pub mana_cost: String,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub loyalty: Option<i32>,
}

impl CardMetadata {
    pub fn new(
        name: impl Into<String>,
        type_line: impl Into<String>,
        oracle_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            oracle_text: oracle_text.into(),
            type_line: type_line.into(),
            mana_cost: String::new(),
            power: None,
            toughness: None,
            loyalty: None,
        }
    }
}

/// A card whose rules text has been compiled to IR.
#[derive(Debug, Clone)]
pub struct CompiledCard {
    pub id: CardId,
    pub metadata: CardMetadata,
    pub clauses: Vec<ClauseBlock>,
    /// Keywords from bare keyword lines ("Flying, vigilance").
    pub base_abilities: Vec<String>,
}

impl CompiledCard {
    /// The one-shot effect tree executed when this card is cast: every
    /// non-trigger clause's IR, chained in line order.
    pub fn spell_effect(&self) -> Option<EffectNode> {
        let mut nodes: Vec<EffectNode> = self
            .clauses
            .iter()
            .filter(|clause| clause.kind != ClauseKind::Trigger)
            .filter_map(|clause| clause.effect_ir.clone())
            .collect();
        match nodes.len() {
            0 => None,
            1 => Some(nodes.remove(0)),
            _ => Some(EffectNode::Chain(nodes)),
        }
    }

    /// Trigger clauses, in line order.
    pub fn triggered_clauses(&self) -> impl Iterator<Item = &ClauseBlock> {
        self.clauses
            .iter()
            .filter(|clause| clause.kind == ClauseKind::Trigger)
    }

    /// Static-effect descriptors this card carries.
    pub fn static_descriptors(&self) -> Vec<StaticEffectDescriptor> {
        self.clauses
            .iter()
            .filter_map(|clause| clause.static_effect.clone())
            .collect()
    }

    pub fn is_optional(&self) -> bool {
        self.metadata.oracle_text.to_lowercase().contains("you may")
    }

    /// Build a stack entry for casting this card.
    pub fn cast(&self, controller: PlayerId, targets: Vec<Target>) -> StackEntry {
        let effect = self.spell_effect().unwrap_or(EffectNode::Chain(Vec::new()));
        StackEntry::spell(self.metadata.name.clone(), controller, effect)
            .with_targets(targets)
            .with_optional(self.is_optional())
    }
}

/// A bare keyword line ("Flying", "Deathtouch, lifelink") parses to the
/// card's own abilities rather than a one-shot effect.
fn parse_keyword_line(line: &str) -> Option<Vec<String>> {
    let lower = line.to_lowercase();
    let parts: Vec<&str> = lower
        .trim_end_matches('.')
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }
    let all_keywords = parts
        .iter()
        .all(|part| lexicon::ABILITY_KEYWORDS.contains(part));
    all_keywords.then(|| parts.iter().map(|part| part.to_string()).collect())
}

/// The text-to-IR compiler.
pub struct OracleCompiler {
    registry: PhraseRegistry,
}

impl Default for OracleCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleCompiler {
    pub fn new() -> Self {
        Self {
            registry: PhraseRegistry::standard(),
        }
    }

    /// Compile one line of rules text into a clause block.
    fn compile_line(&self, line: &str, source_index: usize) -> ClauseBlock {
        // Activated abilities separate cost from effect with a colon.
        let (cost, effect_text) = match line.split_once(':') {
            Some((cost, effect)) => (Some(cost.trim().to_string()), effect.trim()),
            None => (None, line),
        };

        let static_effect = layers::parse_static_clause(effect_text);

        let tokens = tokenize(effect_text);
        let (kind, trigger, condition, action_text) = split_clause(&tokens);

        // The AST compiler works over raw text: it needs the semicolons and
        // dashes the tokenizer strips. For trigger and condition clauses the
        // effect is the part after the clause boundary.
        let ast_input = match kind {
            ClauseKind::Trigger | ClauseKind::Condition => effect_text
                .split_once(',')
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or(action_text),
            ClauseKind::Action => effect_text.to_string(),
        };

        let effect_ir = if static_effect.is_some() {
            None
        } else {
            let nodes = ast::compile(&ast_input);
            (!nodes.is_empty()).then(|| self.registry.parse_nodes(&nodes))
        };

        ClauseBlock {
            raw: line.to_string(),
            kind,
            effect_ir,
            trigger,
            condition,
            cost,
            static_effect,
            source_index,
        }
    }

    /// Compile a card's full rules text.
    pub fn compile(&self, metadata: CardMetadata) -> CompiledCard {
        let mut clauses = Vec::new();
        let mut base_abilities = Vec::new();

        for (index, line) in metadata.oracle_text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(keywords) = parse_keyword_line(line) {
                for keyword in keywords {
                    if !base_abilities.contains(&keyword) {
                        base_abilities.push(keyword);
                    }
                }
                clauses.push(ClauseBlock {
                    raw: line.to_string(),
                    kind: ClauseKind::Action,
                    effect_ir: None,
                    trigger: None,
                    condition: None,
                    cost: None,
                    static_effect: None,
                    source_index: index,
                });
                continue;
            }

            clauses.push(self.compile_line(line, index));
        }

        CompiledCard {
            id: CardId::new(),
            metadata,
            clauses,
            base_abilities,
        }
    }
}

/// Register a compiled card's static effects when its permanent enters the
/// battlefield.
pub fn register_statics(
    card: &CompiledCard,
    source: ObjectId,
    controller: PlayerId,
    manager: &mut LayerManager,
) {
    for descriptor in card.static_descriptors() {
        manager.register_effect(descriptor.with_source(source, controller));
    }
}

/// Explicitly injected card-metadata repository.
#[derive(Debug, Default)]
pub struct CardRepository {
    cards: HashMap<String, CardMetadata>,
}

impl CardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metadata: CardMetadata) {
        self.cards.insert(metadata.name.clone(), metadata);
    }

    /// Look up card metadata by name.
    pub fn get(&self, name: &str) -> Option<&CardMetadata> {
        self.cards.get(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Replace the repository contents from a store.
    #[cfg(feature = "serialization")]
    pub fn load_from(
        &mut self,
        store: &dyn crate::storage::MetadataStore,
    ) -> Result<(), crate::storage::StorageError> {
        self.cards = store.load()?;
        Ok(())
    }

    /// Persist the repository contents to a store.
    #[cfg(feature = "serialization")]
    pub fn save_to(
        &self,
        store: &dyn crate::storage::MetadataStore,
    ) -> Result<(), crate::storage::StorageError> {
        store.save(&self.cards)
    }
}
