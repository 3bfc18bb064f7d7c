//! cantrip: a rules-text compiler and resolution engine for trading-card
//! games.
//!
//! The compile pipeline turns free-form rules text into a canonical effect
//! IR (tokenizer, clause parser, AST compiler, phrase registry), and the
//! resolution side walks that IR against mutable game state: a LIFO stack
//! with fizzle/decline semantics, an explicitly-queued trigger engine,
//! CR613-ordered continuous effects and a combat damage engine.
//!
//! Rules-coverage gaps degrade to inert, logged no-ops rather than errors,
//! so an incomplete rules implementation never halts a simulated game.

pub mod ast;
pub mod card;
pub mod clause;
pub mod combat;
pub mod effect;
pub mod engine;
pub mod events;
pub mod game_state;
pub mod ids;
pub mod layers;
pub mod lexicon;
pub mod object;
pub mod player;
pub mod registry;
pub mod stack;
#[cfg(feature = "serialization")]
pub mod storage;
pub mod tokenizer;
pub mod zone;

pub use ast::{AstNode, compile};
pub use card::{
    CardMetadata, CardRepository, CompiledCard, OracleCompiler, register_statics,
};
pub use clause::{
    ClauseBlock, ClauseKind, ConditionNode, SegmentKind, SubjectAmount, SubjectController,
    TriggerNode, TriggerSubject, ZoneChange, parse_condition_tokens, parse_trigger_tokens,
    segment_patterns, split_clause,
};
pub use combat::{
    AttackerInfo, BlockerInfo, CombatState, CombatStep, Defender, assign_combat_damage,
    declare_attackers, declare_blockers, end_combat, new_combat,
};
pub use effect::{Action, ActionKind, Amount, EffectNode, TokenSpec};
pub use engine::{
    ConditionEvaluator, DynamicRefs, EffectContext, EffectEngine, SubstringConditionEvaluator,
};
pub use events::{EventLog, GameEvent, NullObserver, Observer};
pub use game_state::{GameState, Phase, PlayerZones, Target};
pub use ids::{CardId, ObjectId, PlayerId};
pub use layers::{
    Duration, InvalidLayer, Layer, LayerManager, PtSublayer, Restriction, RulesOverwrite,
    StaticEffectDescriptor, TargetClass, parse_static_clause,
};
pub use object::GameObject;
pub use player::Player;
pub use registry::{PhraseRegistry, RegistryEntry};
pub use stack::{
    AlwaysDecline, AlwaysResolve, DecisionMaker, PendingTrigger, RegisteredTrigger,
    ResolutionOutcome, Stack, StackEntry, StackEntryKind, TriggerEngine,
};
#[cfg(feature = "serialization")]
pub use storage::{JsonFileStore, MetadataStore, StorageError};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use zone::Zone;
