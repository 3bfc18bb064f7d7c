//! The effect-tree interpreter.
//!
//! [`EffectEngine::execute`] walks an [`EffectNode`] tree against game
//! state through an ephemeral [`EffectContext`], one context per stack
//! resolution. Execution never fails: unknown or unresolvable pieces
//! degrade to structured diagnostic log entries and the walk continues.

use std::collections::HashMap;

use crate::effect::{Action, ActionKind, Amount, EffectNode, TokenSpec};
use crate::game_state::{GameState, Target};
use crate::ids::{ObjectId, PlayerId};
use crate::object::GameObject;
use crate::zone::Zone;

/// Pronoun bindings written and read during a single resolution.
///
/// "That creature" and "those tokens" references are stored by earlier
/// leaves (`store_as`) and read by later leaves (`reference_tag`) of the
/// same `execute` call. The manager's scope is exactly one resolution
/// episode; nothing persists across resolutions.
#[derive(Debug, Default)]
pub struct DynamicRefs {
    refs: HashMap<String, Vec<Target>>,
}

impl DynamicRefs {
    pub fn set_reference(&mut self, tag: impl Into<String>, targets: Vec<Target>) {
        self.refs.insert(tag.into(), targets);
    }

    pub fn resolve(&self, tag: &str) -> Option<&Vec<Target>> {
        self.refs.get(tag)
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }
}

/// Per-resolution state. Created when a stack entry resolves, discarded
/// immediately after.
#[derive(Debug)]
pub struct EffectContext {
    pub source: Option<ObjectId>,
    pub controller: PlayerId,
    pub targets: Vec<Target>,
    pub dynamic_refs: DynamicRefs,
    /// Selections made before or during resolution ("modal_choice", "x").
    pub flags: HashMap<String, i64>,
    /// Zone transitions this resolution caused, in order.
    pub zone_changes: Vec<(ObjectId, Zone)>,
}

impl EffectContext {
    pub fn new(controller: PlayerId) -> Self {
        Self {
            source: None,
            controller,
            targets: Vec::new(),
            dynamic_refs: DynamicRefs::default(),
            flags: HashMap::new(),
            zone_changes: Vec::new(),
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

    pub fn with_flag(mut self, key: impl Into<String>, value: i64) -> Self {
        self.flags.insert(key.into(), value);
        self
    }
}

/// Evaluates conditional-branch conditions.
pub trait ConditionEvaluator {
    fn evaluate(&self, condition: &str, context: &EffectContext, game: &GameState) -> bool;
}

/// The default evaluator: substring matching against a small fixed phrase
/// set. An approximation carried over for behavioral compatibility, not a
/// rules-accurate condition engine.
#[derive(Debug, Default)]
pub struct SubstringConditionEvaluator;

impl ConditionEvaluator for SubstringConditionEvaluator {
    fn evaluate(&self, condition: &str, _context: &EffectContext, _game: &GameState) -> bool {
        let condition = condition.to_lowercase();
        condition.contains("you do")
            || condition.contains("you discarded")
            || condition.contains("they can't")
    }
}

/// Interprets parsed effect trees against game state.
pub struct EffectEngine {
    evaluator: Box<dyn ConditionEvaluator>,
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectEngine {
    pub fn new() -> Self {
        Self {
            evaluator: Box::new(SubstringConditionEvaluator),
        }
    }

    /// Swap in a different condition evaluator.
    pub fn with_evaluator(evaluator: Box<dyn ConditionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Execute `node`, mutating `game` through `context`. Returns the log
    /// of everything that happened. Never fails.
    pub fn execute(
        &self,
        node: &EffectNode,
        game: &mut GameState,
        context: &mut EffectContext,
    ) -> Vec<String> {
        self.walk(node, game, context)
    }

    fn walk(
        &self,
        node: &EffectNode,
        game: &mut GameState,
        context: &mut EffectContext,
    ) -> Vec<String> {
        match node {
            EffectNode::Chain(children) => children
                .iter()
                .flat_map(|child| self.walk(child, game, context))
                .collect(),

            EffectNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluator.evaluate(condition, context, game) {
                    self.walk(then_branch, game, context)
                } else if let Some(branch) = else_branch {
                    self.walk(branch, game, context)
                } else {
                    Vec::new()
                }
            }

            EffectNode::Modal { choices, .. } => {
                // The choice is supplied externally before execution; the
                // engine does not prompt.
                let index = context
                    .flags
                    .get("modal_choice")
                    .copied()
                    .unwrap_or(0);
                match usize::try_from(index).ok().and_then(|i| choices.get(i)) {
                    Some(choice) => self.walk(choice, game, context),
                    None => Vec::new(),
                }
            }

            EffectNode::Repeat(children) => {
                let players: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
                let rounds = if players.is_empty() { 1 } else { players.len() };
                let mut logs = Vec::new();
                for _ in 0..rounds {
                    for child in children {
                        logs.extend(self.walk(child, game, context));
                    }
                }
                logs
            }

            EffectNode::Action(action) => self.apply_action(action, game, context),
        }
    }

    fn resolve_amount(
        &self,
        action: &Action,
        context: &EffectContext,
        logs: &mut Vec<String>,
    ) -> u32 {
        match &action.amount {
            None => 1,
            Some(Amount::Fixed(n)) => *n,
            Some(Amount::Variable(name)) => match context.flags.get(name.as_str()) {
                Some(value) if *value >= 0 => *value as u32,
                _ => {
                    logs.push(format!(
                        "[INFO] variable amount '{name}' not supplied; treating as 0"
                    ));
                    0
                }
            },
        }
    }

    /// Targets a leaf acts on: its dynamic reference if it carries one and
    /// the binding exists, otherwise the context's resolved targets.
    fn leaf_targets(&self, action: &Action, context: &EffectContext) -> Vec<Target> {
        if let Some(tag) = &action.reference_tag {
            if let Some(bound) = context.dynamic_refs.resolve(tag) {
                return bound.clone();
            }
        }
        context.targets.clone()
    }

    fn source_has_deathtouch(&self, game: &GameState, context: &EffectContext) -> bool {
        context
            .source
            .and_then(|id| game.object(id))
            .map(|source| source.has_ability("deathtouch"))
            .unwrap_or(false)
    }

    fn apply_action(
        &self,
        action: &Action,
        game: &mut GameState,
        context: &mut EffectContext,
    ) -> Vec<String> {
        let mut logs = Vec::new();
        let targets = self.leaf_targets(action, context);
        let controller_name = game
            .player(context.controller)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "controller".to_string());

        match action.kind {
            ActionKind::DrawCard => {
                let count = self.resolve_amount(action, context, &mut logs);
                let drawn = game.draw_cards(context.controller, count);
                logs.push(format!("{controller_name} draws {drawn} card(s)."));
            }

            ActionKind::GainLife => {
                let amount = self.resolve_amount(action, context, &mut logs);
                if let Some(player) = game.player_mut(context.controller) {
                    player.gain_life(amount);
                    logs.push(format!("{controller_name} gains {amount} life."));
                }
            }

            ActionKind::LoseLife => {
                let amount = self.resolve_amount(action, context, &mut logs);
                if let Some(player) = game.player_mut(context.controller) {
                    player.lose_life(amount);
                    logs.push(format!("{controller_name} loses {amount} life."));
                }
            }

            ActionKind::DealDamage => {
                let amount = self.resolve_amount(action, context, &mut logs);
                let deathtouch = self.source_has_deathtouch(game, context);
                for target in &targets {
                    match target {
                        Target::Player(id) => {
                            if let Some(player) = game.player_mut(*id) {
                                player.lose_life(amount);
                                logs.push(format!(
                                    "{} takes {amount} damage (life).",
                                    player.name
                                ));
                            }
                        }
                        Target::Object(id) => {
                            if let Some(object) = game.object_mut(*id) {
                                if let Some(loyalty) = object.loyalty {
                                    object.loyalty = Some(loyalty - amount as i32);
                                    logs.push(format!(
                                        "{} loses {amount} loyalty.",
                                        object.name
                                    ));
                                } else {
                                    object.damage += amount;
                                    if deathtouch {
                                        object.damaged_by_deathtouch = true;
                                    }
                                    logs.push(format!(
                                        "{} takes {amount} damage (marked).",
                                        object.name
                                    ));
                                }
                            }
                        }
                    }
                }
            }

            ActionKind::GrantKeyword => {
                let Some(keyword) = &action.keyword else {
                    logs.push("[INFO] keyword grant with no keyword parsed.".to_string());
                    return logs;
                };
                for target in &targets {
                    if let Target::Object(id) = target {
                        if let Some(object) = game.object_mut(*id) {
                            if !object.has_ability(keyword) {
                                object.abilities.push(keyword.clone());
                            }
                        }
                    }
                }
                logs.push(format!("Keyword granted: {keyword}"));
            }

            ActionKind::CreateToken => {
                let count = self.resolve_amount(action, context, &mut logs);
                let spec = action.token.clone().unwrap_or_default();
                let mut created = Vec::new();
                for _ in 0..count {
                    let id = create_token(game, context, &spec);
                    context.zone_changes.push((id, Zone::Battlefield));
                    created.push(Target::Object(id));
                }
                logs.push(format!(
                    "Token created: {}/{}{}",
                    spec.power.unwrap_or(1),
                    spec.toughness.unwrap_or(1),
                    if spec.abilities.is_empty() {
                        String::new()
                    } else {
                        format!(" with {}", spec.abilities.join(", "))
                    }
                ));
                if let Some(tag) = &action.store_as {
                    context.dynamic_refs.set_reference(tag.clone(), created);
                }
            }

            ActionKind::ApplyPtModifier => {
                let (power, toughness) = action.pt_modifier.unwrap_or((1, 1));
                for target in &targets {
                    if let Target::Object(id) = target {
                        if let Some(object) = game.object_mut(*id) {
                            object.power += power;
                            object.toughness += toughness;
                        }
                    }
                }
                logs.push(format!(
                    "Applied P/T modifier: {power:+}/{toughness:+} until end of turn"
                ));
            }

            ActionKind::SearchLibrary => {
                logs.push(format!("Searching library (reveal: {}).", action.reveal));
                game.shuffle_library(context.controller);
            }

            ActionKind::DiscardCards => {
                let count = self.resolve_amount(action, context, &mut logs);
                let discarded = game.discard_cards(context.controller, count);
                logs.push(format!("{controller_name} discards {discarded} card(s)."));
            }

            ActionKind::ExileFromHand => {
                let opponent = game
                    .players
                    .iter()
                    .map(|p| p.id)
                    .find(|id| *id != context.controller);
                match opponent {
                    Some(opponent) => {
                        let card = game.get_zone(opponent, Zone::Hand).first().copied();
                        if let Some(card) = card {
                            let line = game.move_card(card, opponent, Zone::Exile);
                            context.zone_changes.push((card, Zone::Exile));
                            logs.push(line);
                        }
                        logs.push("Exiling card from opponent's hand.".to_string());
                    }
                    None => logs.push("Exiling card from opponent's hand.".to_string()),
                }
            }

            ActionKind::MultiPlayerDiscard => {
                let opponents: Vec<PlayerId> = game
                    .players
                    .iter()
                    .map(|p| p.id)
                    .filter(|id| *id != context.controller)
                    .collect();
                for opponent in opponents {
                    game.discard_cards(opponent, 1);
                }
                logs.push("Each opponent discards a card.".to_string());
            }

            ActionKind::UntapPermanents => {
                let limit = self.resolve_amount(action, context, &mut logs);
                let mut untapped = 0;
                for id in game.battlefield() {
                    if untapped >= limit {
                        break;
                    }
                    if let Some(object) = game.object_mut(id) {
                        if object.controller == context.controller && object.tapped {
                            object.tapped = false;
                            untapped += 1;
                        }
                    }
                }
                logs.push(format!("Untapping up to {limit} permanents."));
            }

            ActionKind::PutIntoLibraryDepth => {
                let depth = action.position.unwrap_or(1) as usize;
                for target in &targets {
                    if let Target::Object(id) = target {
                        let Some(owner) = game.object(*id).map(|o| o.owner) else {
                            continue;
                        };
                        game.move_card(*id, owner, Zone::Library);
                        // The top of the library is its last entry; re-seat
                        // the card `depth` positions down.
                        if let Some(library) = game.get_zone_mut(owner, Zone::Library) {
                            if let Some(card) = library.pop() {
                                let index = library.len().saturating_sub(depth - 1);
                                library.insert(index, card);
                            }
                        }
                        context.zone_changes.push((*id, Zone::Library));
                    }
                }
                logs.push(format!("Put into library {depth} from top."));
            }

            ActionKind::DestroyTarget => {
                for target in &targets {
                    if let Target::Object(id) = target {
                        let Some((name, controller)) =
                            game.object(*id).map(|o| (o.name.clone(), o.controller))
                        else {
                            continue;
                        };
                        let line = game.move_card(*id, controller, Zone::Graveyard);
                        context.zone_changes.push((*id, Zone::Graveyard));
                        logs.push(line);
                        logs.push(format!("Destroying target: {name}"));
                    }
                }
            }

            ActionKind::ExileTarget => {
                for target in &targets {
                    if let Target::Object(id) = target {
                        let Some(owner) = game.object(*id).map(|o| o.owner) else {
                            continue;
                        };
                        let line = game.move_card(*id, owner, Zone::Exile);
                        context.zone_changes.push((*id, Zone::Exile));
                        logs.push(line);
                    }
                }
            }

            ActionKind::TapTarget => {
                for target in &targets {
                    if let Target::Object(id) = target {
                        if let Some(object) = game.object_mut(*id) {
                            object.tapped = true;
                            logs.push(format!("{} becomes tapped.", object.name));
                        }
                    }
                }
            }

            ActionKind::UntapTarget => {
                for target in &targets {
                    if let Target::Object(id) = target {
                        if let Some(object) = game.object_mut(*id) {
                            object.tapped = false;
                            logs.push(format!("{} becomes untapped.", object.name));
                        }
                    }
                }
            }

            ActionKind::ReturnToHand => {
                for target in &targets {
                    if let Target::Object(id) = target {
                        let Some(owner) = game.object(*id).map(|o| o.owner) else {
                            continue;
                        };
                        let line = game.move_card(*id, owner, Zone::Hand);
                        context.zone_changes.push((*id, Zone::Hand));
                        logs.push(line);
                    }
                }
            }

            ActionKind::CounterSpell => {
                for target in &targets {
                    if let Target::Object(id) = target {
                        let Some(owner) = game.object(*id).map(|o| o.owner) else {
                            continue;
                        };
                        let line = game.move_card(*id, owner, Zone::Graveyard);
                        context.zone_changes.push((*id, Zone::Graveyard));
                        logs.push(line);
                        logs.push("Spell countered.".to_string());
                    }
                }
            }

            ActionKind::ReturnToBattlefield => {
                logs.push(
                    "Returning to the battlefield at the beginning of the next end step."
                        .to_string(),
                );
            }

            ActionKind::SetStateFlag => {
                if let Some(flag) = &action.flag {
                    context.flags.insert(flag.clone(), 1);
                    logs.push(format!("State flag set: {flag}"));
                }
            }

            ActionKind::ConditionalFallback => {
                logs.push("[INFO] Conditional fallback detected".to_string());
            }

            ActionKind::Unparsed => {
                logs.push("[UNKNOWN EFFECT]".to_string());
                logs.push(format!("  Action: {}", action.kind.name()));
                logs.push(format!(
                    "  Raw Text: {}",
                    action.raw_text.as_deref().unwrap_or("<missing raw_text>")
                ));
                logs.push(format!("  Full Effect: {action:?}"));
            }
        }

        logs
    }
}

/// Build a token permanent from a spec and put it onto the battlefield.
fn create_token(game: &mut GameState, context: &EffectContext, spec: &TokenSpec) -> ObjectId {
    let power = spec.power.unwrap_or(1) as i32;
    let toughness = spec.toughness.unwrap_or(1) as i32;
    let name = if spec.copy_of_source {
        context
            .source
            .and_then(|id| game.object(id))
            .map(|source| format!("{} Offspring", source.name))
            .unwrap_or_else(|| "Offspring Token".to_string())
    } else {
        "Token".to_string()
    };

    let mut token = GameObject::new(name, "Token Creature", context.controller)
        .with_power_toughness(power, toughness);
    token.base_abilities = spec.abilities.clone();
    token.abilities = spec.abilities.clone();
    token.is_token = true;
    token.summoning_sick = true;
    game.add_object(token, Zone::Battlefield)
}
