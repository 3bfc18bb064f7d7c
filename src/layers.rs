//! Continuous (static) effects and CR613 layer ordering.
//!
//! Static abilities register [`StaticEffectDescriptor`]s with the
//! [`LayerManager`], which recomputes derived permanent characteristics on
//! demand: printed base values are restored first, then every descriptor is
//! applied in layer order (1 through 6, then sublayers 7a-7d), and within a
//! layer in ascending timestamp order. Only timestamp ordering is modeled;
//! CR613.6 dependency analysis is not.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::lexicon;
use crate::object::GameObject;

/// The four sublayers of layer 7 (power/toughness).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PtSublayer {
    /// 7a: characteristic-defining abilities.
    CharacteristicDefining,
    /// 7b: effects that set power/toughness to specific values.
    Setting,
    /// 7c: effects that add to or subtract from power/toughness.
    Modifying,
    /// 7d: effects that switch power and toughness.
    Switching,
}

/// One of the nine legal layer designations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Layer 1: copy effects.
    Copy,
    /// Layer 2: control-changing effects.
    Control,
    /// Layer 3: text-changing effects.
    Text,
    /// Layer 4: type-changing effects.
    Type,
    /// Layer 5: color-changing effects.
    Color,
    /// Layer 6: ability-adding and ability-removing effects.
    Ability,
    /// Layer 7: power/toughness, split into sublayers.
    PowerToughness(PtSublayer),
}

impl Layer {
    /// The textual designation ("1".."6", "7a".."7d").
    pub fn designation(&self) -> &'static str {
        match self {
            Layer::Copy => "1",
            Layer::Control => "2",
            Layer::Text => "3",
            Layer::Type => "4",
            Layer::Color => "5",
            Layer::Ability => "6",
            Layer::PowerToughness(PtSublayer::CharacteristicDefining) => "7a",
            Layer::PowerToughness(PtSublayer::Setting) => "7b",
            Layer::PowerToughness(PtSublayer::Modifying) => "7c",
            Layer::PowerToughness(PtSublayer::Switching) => "7d",
        }
    }

    /// Application order key: layer number, then sublayer.
    fn order_key(&self) -> (u8, u8) {
        match self {
            Layer::Copy => (1, 0),
            Layer::Control => (2, 0),
            Layer::Text => (3, 0),
            Layer::Type => (4, 0),
            Layer::Color => (5, 0),
            Layer::Ability => (6, 0),
            Layer::PowerToughness(PtSublayer::CharacteristicDefining) => (7, 0),
            Layer::PowerToughness(PtSublayer::Setting) => (7, 1),
            Layer::PowerToughness(PtSublayer::Modifying) => (7, 2),
            Layer::PowerToughness(PtSublayer::Switching) => (7, 3),
        }
    }
}

/// A malformed layer designation. Fatal: static effects cannot be
/// registered without a legal layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLayer(pub String);

impl std::fmt::Display for InvalidLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid layer designation: {:?}", self.0)
    }
}

impl std::error::Error for InvalidLayer {}

impl FromStr for Layer {
    type Err = InvalidLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" => Ok(Layer::Copy),
            "2" => Ok(Layer::Control),
            "3" => Ok(Layer::Text),
            "4" => Ok(Layer::Type),
            "5" => Ok(Layer::Color),
            "6" => Ok(Layer::Ability),
            "7a" => Ok(Layer::PowerToughness(PtSublayer::CharacteristicDefining)),
            "7b" => Ok(Layer::PowerToughness(PtSublayer::Setting)),
            "7c" => Ok(Layer::PowerToughness(PtSublayer::Modifying)),
            "7d" => Ok(Layer::PowerToughness(PtSublayer::Switching)),
            other => Err(InvalidLayer(other.to_string())),
        }
    }
}

/// Which permanents a static effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    AnyPermanent,
    Creatures,
    /// Creatures controlled by the descriptor's controller.
    CreaturesYouControl,
}

impl TargetClass {
    fn matches(&self, object: &GameObject, controller: Option<PlayerId>) -> bool {
        match self {
            TargetClass::AnyPermanent => true,
            TargetClass::Creatures => object.is_creature(),
            TargetClass::CreaturesYouControl => {
                object.is_creature() && Some(object.controller) == controller
            }
        }
    }
}

/// Combat and play restrictions a static effect can impose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    CantAttack,
    MustAttack,
}

/// Rules overwrites a static effect can impose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesOverwrite {
    NoLifeGain,
}

/// How long a static effect lasts. Expiry is driven by the session's turn
/// loop through the lifecycle methods on [`LayerManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Duration {
    #[default]
    Permanent,
    UntilEndOfTurn,
}

/// A parsed continuous effect, ready for layer registration.
#[derive(Debug, Clone)]
pub struct StaticEffectDescriptor {
    pub target_class: TargetClass,
    pub granted_abilities: Vec<String>,
    pub power_boost: i32,
    pub toughness_boost: i32,
    pub restrictions: Vec<Restriction>,
    pub rules_overwrites: Vec<RulesOverwrite>,
    pub keywords_removed: Vec<String>,
    pub layer: Layer,
    pub duration: Duration,
    /// The permanent this effect comes from, once known.
    pub source: Option<ObjectId>,
    /// The controller used by "you control" target classes.
    pub controller: Option<PlayerId>,
    /// Creation order; 0 means "assign at registration".
    pub timestamp: u64,
    pub dependency_targets: Vec<ObjectId>,
}

impl StaticEffectDescriptor {
    pub fn new(layer: Layer, target_class: TargetClass) -> Self {
        Self {
            target_class,
            granted_abilities: Vec::new(),
            power_boost: 0,
            toughness_boost: 0,
            restrictions: Vec::new(),
            rules_overwrites: Vec::new(),
            keywords_removed: Vec::new(),
            layer,
            duration: Duration::default(),
            source: None,
            controller: None,
            timestamp: 0,
            dependency_targets: Vec::new(),
        }
    }

    pub fn with_pt_boost(mut self, power: i32, toughness: i32) -> Self {
        self.power_boost = power;
        self.toughness_boost = toughness;
        self
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.granted_abilities = abilities.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    pub fn with_source(mut self, source: ObjectId, controller: PlayerId) -> Self {
        self.source = Some(source);
        self.controller = Some(controller);
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    fn matches(&self, object: &GameObject) -> bool {
        self.target_class.matches(object, self.controller)
    }

    /// Mutate one matching permanent's computed characteristics.
    fn apply_to(&self, object: &mut GameObject) {
        for ability in &self.granted_abilities {
            if !object.abilities.contains(ability) {
                object.abilities.push(ability.clone());
            }
        }
        for removed in &self.keywords_removed {
            object.abilities.retain(|a| a != removed);
        }
        object.power += self.power_boost;
        object.toughness += self.toughness_boost;
        for restriction in &self.restrictions {
            match restriction {
                Restriction::CantAttack => object.cant_attack = true,
                Restriction::MustAttack => object.must_attack = true,
            }
        }
        for overwrite in &self.rules_overwrites {
            match overwrite {
                RulesOverwrite::NoLifeGain => object.life_gain_prevention = true,
            }
        }
    }
}

/// Accumulates static effects and recomputes permanent characteristics in
/// CR613 order.
#[derive(Debug)]
pub struct LayerManager {
    buckets: BTreeMap<(u8, u8), Vec<StaticEffectDescriptor>>,
    next_timestamp: u64,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            next_timestamp: 1,
        }
    }

    /// Register a static effect into its layer bucket. Timestamps left at 0
    /// are assigned in registration order.
    pub fn register_effect(&mut self, mut descriptor: StaticEffectDescriptor) {
        if descriptor.timestamp == 0 {
            descriptor.timestamp = self.next_timestamp;
        }
        self.next_timestamp = self.next_timestamp.max(descriptor.timestamp) + 1;
        self.buckets
            .entry(descriptor.layer.order_key())
            .or_default()
            .push(descriptor);
    }

    pub fn effect_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Recompute derived characteristics for every battlefield permanent.
    ///
    /// Base values are restored first, so calling this repeatedly is
    /// idempotent. Layers apply 1 through 6 then 7a-7d; within a bucket,
    /// ascending timestamp.
    pub fn apply_layers(&mut self, game: &mut GameState) {
        for id in game.battlefield() {
            if let Some(object) = game.object_mut(id) {
                object.reset_computed();
            }
        }

        for bucket in self.buckets.values_mut() {
            bucket.sort_by_key(|d| d.timestamp);
            for descriptor in bucket.iter() {
                for id in game.battlefield() {
                    let Some(object) = game.object_mut(id) else {
                        continue;
                    };
                    if descriptor.matches(object) {
                        descriptor.apply_to(object);
                    }
                }
            }
        }
    }

    /// Drop effects that last until end of turn.
    pub fn expire_end_of_turn(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|d| d.duration != Duration::UntilEndOfTurn);
        }
    }

    /// Drop effects whose source permanent left the relevant zone.
    pub fn remove_source_effects(&mut self, source: ObjectId) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|d| d.source != Some(source));
        }
    }
}

// ---------------------------------------------------------------------------
// Static-clause parsing
// ---------------------------------------------------------------------------

fn target_class_for(text: &str) -> TargetClass {
    if text.contains("creatures you control") || text.contains("creature you control") {
        TargetClass::CreaturesYouControl
    } else if text.contains("creature") {
        TargetClass::Creatures
    } else {
        TargetClass::AnyPermanent
    }
}

/// Parse one rules-text line as a continuous effect, if it is one.
///
/// Recognizes power/toughness anthems (layer 7c), combat restrictions
/// (layer 6) and keyword-granting lines (layer 6). Anything else returns
/// `None` and is left to the one-shot effect parser.
pub fn parse_static_clause(text: &str) -> Option<StaticEffectDescriptor> {
    let text = text.to_lowercase();

    // Anthems only; "gets +1/+1 until end of turn" one-shots belong to the
    // effect parser.
    if !text.contains("until end of turn") {
        if text.contains("creatures you control get +1/+1") {
            return Some(
                StaticEffectDescriptor::new(
                    Layer::PowerToughness(PtSublayer::Modifying),
                    TargetClass::CreaturesYouControl,
                )
                .with_pt_boost(1, 1),
            );
        }
        if text.contains("creatures you control get -1/-1") {
            return Some(
                StaticEffectDescriptor::new(
                    Layer::PowerToughness(PtSublayer::Modifying),
                    TargetClass::CreaturesYouControl,
                )
                .with_pt_boost(-1, -1),
            );
        }
        if text.contains("creatures get +1/+1") {
            return Some(
                StaticEffectDescriptor::new(
                    Layer::PowerToughness(PtSublayer::Modifying),
                    TargetClass::Creatures,
                )
                .with_pt_boost(1, 1),
            );
        }
        if text.contains("creatures get -1/-1") {
            return Some(
                StaticEffectDescriptor::new(
                    Layer::PowerToughness(PtSublayer::Modifying),
                    TargetClass::Creatures,
                )
                .with_pt_boost(-1, -1),
            );
        }
    }

    if text.contains("must attack each combat if able") {
        return Some(
            StaticEffectDescriptor::new(Layer::Ability, target_class_for(&text))
                .with_restriction(Restriction::MustAttack),
        );
    }
    if text.contains("can't attack") {
        return Some(
            StaticEffectDescriptor::new(Layer::Ability, target_class_for(&text))
                .with_restriction(Restriction::CantAttack),
        );
    }

    // Keyword grants: "creatures you control have flying".
    if text.contains(" have ") || text.contains(" has ") {
        let granted: Vec<&str> = lexicon::ABILITY_KEYWORDS
            .iter()
            .copied()
            .filter(|keyword| text.contains(keyword))
            .collect();
        if !granted.is_empty() {
            return Some(
                StaticEffectDescriptor::new(Layer::Ability, target_class_for(&text))
                    .with_abilities(&granted),
            );
        }
    }

    None
}
