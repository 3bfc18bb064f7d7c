//! Game objects tracked in the game-state arena.

use crate::ids::{CardId, ObjectId, PlayerId};

/// A card, permanent or token tracked by the game state.
///
/// Characteristics come in two flavors: the printed base values, and the
/// computed values the layer manager derives from them. Everything that
/// reads power, toughness or abilities reads the computed values.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub id: ObjectId,
    pub name: String,
    pub type_line: String,
    pub owner: PlayerId,
    pub controller: PlayerId,
    /// Compiled card definition this object was created from, if any.
    pub card: Option<CardId>,
    /// Rules text, used for "you may" optionality detection on the stack.
    pub oracle_text: String,

    pub base_power: i32,
    pub base_toughness: i32,
    pub base_abilities: Vec<String>,

    pub power: i32,
    pub toughness: i32,
    pub abilities: Vec<String>,

    /// Loyalty, present only on planeswalkers.
    pub loyalty: Option<i32>,
    /// Damage marked this turn.
    pub damage: u32,
    /// Set when any of the marked damage came from a deathtouch source.
    pub damaged_by_deathtouch: bool,

    pub tapped: bool,
    pub summoning_sick: bool,
    pub attacking: bool,
    pub blocking: bool,
    pub is_token: bool,

    // Restriction and rules-overwrite flags, written by the layer manager.
    pub cant_attack: bool,
    pub must_attack: bool,
    pub life_gain_prevention: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>, type_line: impl Into<String>, owner: PlayerId) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            type_line: type_line.into(),
            owner,
            controller: owner,
            card: None,
            oracle_text: String::new(),
            base_power: 0,
            base_toughness: 0,
            base_abilities: Vec::new(),
            power: 0,
            toughness: 0,
            abilities: Vec::new(),
            loyalty: None,
            damage: 0,
            damaged_by_deathtouch: false,
            tapped: false,
            summoning_sick: false,
            attacking: false,
            blocking: false,
            is_token: false,
            cant_attack: false,
            must_attack: false,
            life_gain_prevention: false,
        }
    }

    pub fn with_power_toughness(mut self, power: i32, toughness: i32) -> Self {
        self.base_power = power;
        self.base_toughness = toughness;
        self.power = power;
        self.toughness = toughness;
        self
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.base_abilities = abilities.iter().map(|a| a.to_string()).collect();
        self.abilities = self.base_abilities.clone();
        self
    }

    pub fn with_loyalty(mut self, loyalty: i32) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    pub fn with_oracle_text(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = text.into();
        self
    }

    pub fn is_creature(&self) -> bool {
        self.type_line.to_ascii_lowercase().contains("creature")
    }

    pub fn is_planeswalker(&self) -> bool {
        self.loyalty.is_some() || self.type_line.to_ascii_lowercase().contains("planeswalker")
    }

    /// Check a computed (post-layers) keyword ability.
    pub fn has_ability(&self, keyword: &str) -> bool {
        self.abilities.iter().any(|a| a == keyword)
    }

    /// Restore computed characteristics from printed base values.
    ///
    /// The layer manager calls this before re-deriving, so repeated layer
    /// application never drifts.
    pub fn reset_computed(&mut self) {
        self.power = self.base_power;
        self.toughness = self.base_toughness;
        self.abilities = self.base_abilities.clone();
        self.cant_attack = false;
        self.must_attack = false;
        self.life_gain_prevention = false;
    }

    /// Clear combat status and marked damage (end-of-turn cleanup).
    pub fn cleanup_damage(&mut self) {
        self.damage = 0;
        self.damaged_by_deathtouch = false;
        self.attacking = false;
        self.blocking = false;
    }
}
