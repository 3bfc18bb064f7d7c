//! The stack: LIFO resolution of spells and abilities.
//!
//! Entries resolve strictly from the top. Resolution applies the fizzle
//! law: if an entry declared targets and none remain legal, it is removed
//! with no state mutation at all; if some remain legal, it resolves against
//! the legal subset only. Optional entries ("you may ...") consult a
//! [`DecisionMaker`] before executing. Every outcome emits exactly one
//! observer event.
//!
//! The trigger engine queues triggered abilities explicitly; there is no
//! automatic scan of game events.

use std::collections::{HashMap, VecDeque};

use crate::effect::EffectNode;
use crate::engine::{EffectContext, EffectEngine};
use crate::events::{GameEvent, Observer};
use crate::game_state::{GameState, Target};
use crate::ids::{ObjectId, PlayerId};

/// What kind of object a stack entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEntryKind {
    Spell,
    ActivatedAbility,
    TriggeredAbility,
}

/// A spell or ability waiting to resolve.
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub kind: StackEntryKind,
    /// The object this entry came from, if it still exists anywhere.
    pub source: Option<ObjectId>,
    pub controller: PlayerId,
    pub targets: Vec<Target>,
    pub effect_ir: EffectNode,
    pub name: String,
    /// "You may ..." entries can be declined at resolution.
    pub optional: bool,
    /// Selections made at cast time ("modal_choice", "x").
    pub flags: HashMap<String, i64>,
    pub resolved: bool,
}

impl StackEntry {
    pub fn spell(name: impl Into<String>, controller: PlayerId, effect_ir: EffectNode) -> Self {
        Self::new(StackEntryKind::Spell, name, controller, effect_ir)
    }

    pub fn activated(name: impl Into<String>, controller: PlayerId, effect_ir: EffectNode) -> Self {
        Self::new(StackEntryKind::ActivatedAbility, name, controller, effect_ir)
    }

    pub fn triggered(name: impl Into<String>, controller: PlayerId, effect_ir: EffectNode) -> Self {
        Self::new(StackEntryKind::TriggeredAbility, name, controller, effect_ir)
    }

    fn new(
        kind: StackEntryKind,
        name: impl Into<String>,
        controller: PlayerId,
        effect_ir: EffectNode,
    ) -> Self {
        Self {
            kind,
            source: None,
            controller,
            targets: Vec::new(),
            effect_ir,
            name: name.into(),
            optional: false,
            flags: HashMap::new(),
            resolved: false,
        }
    }

    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: i64) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    /// Optional either by explicit flag or by "you may" on the source's
    /// rules text.
    pub fn is_optional(&self, game: &GameState) -> bool {
        if self.optional {
            return true;
        }
        self.source
            .and_then(|id| game.object(id))
            .map(|object| object.oracle_text.to_lowercase().contains("you may"))
            .unwrap_or(false)
    }
}

/// Chooses whether optional effects resolve. Purely a collaborator seam;
/// the default resolves everything.
pub trait DecisionMaker {
    fn resolve_optional(&mut self, _entry: &StackEntry) -> bool {
        true
    }
}

/// Resolves every optional effect.
#[derive(Debug, Default)]
pub struct AlwaysResolve;

impl DecisionMaker for AlwaysResolve {}

/// Declines every optional effect.
#[derive(Debug, Default)]
pub struct AlwaysDecline;

impl DecisionMaker for AlwaysDecline {
    fn resolve_optional(&mut self, _entry: &StackEntry) -> bool {
        false
    }
}

/// How the top entry left the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Executed; carries the effect engine's log.
    Resolved(Vec<String>),
    /// Every declared target was illegal; game state untouched.
    Fizzled,
    /// Optional and the controller declined; game state untouched.
    Declined,
}

/// The LIFO stack. No entry is ever removed except from the top.
#[derive(Debug, Default)]
pub struct Stack {
    entries: Vec<StackEntry>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StackEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pop and resolve the top entry. Returns `None` on an empty stack.
    ///
    /// Fizzle and decline outcomes leave game state untouched and never
    /// invoke the effect engine. Partial target loss is not a fizzle: the
    /// entry resolves against whatever legal subset remains.
    pub fn resolve_top(
        &mut self,
        game: &mut GameState,
        engine: &EffectEngine,
        decisions: &mut dyn DecisionMaker,
        observer: &mut dyn Observer,
    ) -> Option<ResolutionOutcome> {
        let mut entry = self.pop()?;

        if !entry.targets.is_empty() {
            let legal: Vec<Target> = entry
                .targets
                .iter()
                .copied()
                .filter(|target| game.target_is_legal(*target))
                .collect();
            if legal.is_empty() {
                entry.resolved = true;
                observer.notify(&GameEvent::Fizzled {
                    name: entry.name.clone(),
                });
                return Some(ResolutionOutcome::Fizzled);
            }
            entry.targets = legal;
        }

        if entry.is_optional(game) && !decisions.resolve_optional(&entry) {
            entry.resolved = true;
            observer.notify(&GameEvent::Declined {
                name: entry.name.clone(),
            });
            return Some(ResolutionOutcome::Declined);
        }

        let mut context = EffectContext::new(entry.controller).with_targets(entry.targets.clone());
        if let Some(source) = entry.source {
            context = context.with_source(source);
        }
        for (key, value) in &entry.flags {
            context.flags.insert(key.clone(), *value);
        }

        let log = engine.execute(&entry.effect_ir, game, &mut context);
        entry.resolved = true;
        game.drain_events(observer);
        observer.notify(&GameEvent::Resolved {
            name: entry.name.clone(),
            log: log.clone(),
        });
        Some(ResolutionOutcome::Resolved(log))
    }
}

// ---------------------------------------------------------------------------
// Trigger engine
// ---------------------------------------------------------------------------

/// A trigger registered for explicit polling.
pub struct RegisteredTrigger {
    pub condition: Box<dyn Fn(&GameState) -> bool>,
    pub effect: Box<dyn Fn() -> EffectNode>,
    pub source: String,
    pub controller: PlayerId,
}

/// A trigger that has fired and waits to be put on the stack.
#[derive(Debug, Clone)]
pub struct PendingTrigger {
    pub effect: EffectNode,
    pub source: String,
    pub controller: PlayerId,
}

/// Queues triggered abilities. Triggers are queued explicitly with
/// [`TriggerEngine::fire_now`]; registered conditions are only evaluated
/// when the caller invokes [`TriggerEngine::poll_registered`]. There is no
/// automatic event detection.
#[derive(Default)]
pub struct TriggerEngine {
    registered: Vec<RegisteredTrigger>,
    pending: VecDeque<PendingTrigger>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger for later polling.
    pub fn register(
        &mut self,
        condition: impl Fn(&GameState) -> bool + 'static,
        effect: impl Fn() -> EffectNode + 'static,
        source: impl Into<String>,
        controller: PlayerId,
    ) {
        self.registered.push(RegisteredTrigger {
            condition: Box::new(condition),
            effect: Box::new(effect),
            source: source.into(),
            controller,
        });
    }

    /// Queue a trigger that has fired.
    pub fn fire_now(
        &mut self,
        effect: EffectNode,
        source: impl Into<String>,
        controller: PlayerId,
    ) {
        self.pending.push_back(PendingTrigger {
            effect,
            source: source.into(),
            controller,
        });
    }

    /// Evaluate every registered condition against the current state and
    /// queue those that hold. Callers decide when this runs.
    pub fn poll_registered(&mut self, game: &GameState) {
        let mut fired = Vec::new();
        for trigger in &self.registered {
            if (trigger.condition)(game) {
                fired.push(PendingTrigger {
                    effect: (trigger.effect)(),
                    source: trigger.source.clone(),
                    controller: trigger.controller,
                });
            }
        }
        self.pending.extend(fired);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drain the pending queue onto the stack as triggered abilities.
    pub fn check_and_push(&mut self, stack: &mut Stack) {
        while let Some(trigger) = self.pending.pop_front() {
            stack.push(StackEntry::triggered(
                trigger.source,
                trigger.controller,
                trigger.effect,
            ));
        }
    }
}
