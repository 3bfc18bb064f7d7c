//! Mutable game state: players, zones and the object arena.
//!
//! Everything the engine touches lives here, keyed by handle. Zone lists
//! hold `ObjectId`s; the objects themselves live in a single arena map, so
//! back-references (controller, owner, source) are lookups, never owning
//! pointers.

use std::collections::HashMap;

use crate::events::GameEvent;
use crate::ids::{ObjectId, PlayerId};
use crate::object::GameObject;
use crate::player::Player;
use crate::zone::Zone;

/// Coarse turn phase label, the only turn bookkeeping the core needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    Beginning,
    #[default]
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Beginning => "beginning",
            Phase::PrecombatMain => "precombat main",
            Phase::Combat => "combat",
            Phase::PostcombatMain => "postcombat main",
            Phase::Ending => "ending",
        }
    }
}

/// A target for spells or abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Object(ObjectId),
    Player(PlayerId),
}

/// Per-player zone lists of object handles.
#[derive(Debug, Clone, Default)]
pub struct PlayerZones {
    pub library: Vec<ObjectId>,
    pub hand: Vec<ObjectId>,
    pub battlefield: Vec<ObjectId>,
    pub graveyard: Vec<ObjectId>,
    pub exile: Vec<ObjectId>,
    pub command: Vec<ObjectId>,
}

impl PlayerZones {
    pub fn list(&self, zone: Zone) -> &Vec<ObjectId> {
        match zone {
            Zone::Library => &self.library,
            Zone::Hand => &self.hand,
            Zone::Battlefield => &self.battlefield,
            Zone::Graveyard => &self.graveyard,
            Zone::Exile => &self.exile,
            // The stack proper lives in `crate::stack::Stack`; objects
            // "on the stack" zone-wise are parked with the command zone.
            Zone::Stack | Zone::Command => &self.command,
        }
    }

    pub fn list_mut(&mut self, zone: Zone) -> &mut Vec<ObjectId> {
        match zone {
            Zone::Library => &mut self.library,
            Zone::Hand => &mut self.hand,
            Zone::Battlefield => &mut self.battlefield,
            Zone::Graveyard => &mut self.graveyard,
            Zone::Exile => &mut self.exile,
            Zone::Stack | Zone::Command => &mut self.command,
        }
    }
}

/// Container object holding all mutable game information.
#[derive(Debug, Default)]
pub struct GameState {
    pub players: Vec<Player>,
    zones: HashMap<PlayerId, PlayerZones>,
    objects: HashMap<ObjectId, GameObject>,
    pub phase: Phase,
    pub turn_number: u32,
    active_player: usize,
    /// Events produced by state mutations, drained to the observer by
    /// whoever drives the mutation (stack resolution, combat, tests).
    pub pending_events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(players: Vec<Player>) -> Self {
        let mut state = Self {
            turn_number: 1,
            ..Self::default()
        };
        for player in players {
            state.zones.insert(player.id, PlayerZones::default());
            state.players.push(player);
        }
        state
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    pub fn register_player(&mut self, player: Player) -> PlayerId {
        let id = player.id;
        self.zones.entry(id).or_default();
        self.players.push(player);
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.players.get(self.active_player).map(|p| p.id)
    }

    pub fn set_current_player(&mut self, id: PlayerId) {
        if let Some(index) = self.players.iter().position(|p| p.id == id) {
            self.active_player = index;
        }
    }

    pub fn current_phase(&self) -> &'static str {
        self.phase.name()
    }

    // ------------------------------------------------------------------
    // Objects and zones
    // ------------------------------------------------------------------

    /// Insert `object` into the arena and place it in its owner's `zone`.
    pub fn add_object(&mut self, object: GameObject, zone: Zone) -> ObjectId {
        let id = object.id;
        let owner = object.owner;
        self.objects.insert(id, object);
        self.zones.entry(owner).or_default().list_mut(zone).push(id);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub fn get_zone(&self, player: PlayerId, zone: Zone) -> &[ObjectId] {
        self.zones
            .get(&player)
            .map(|z| z.list(zone).as_slice())
            .unwrap_or(&[])
    }

    pub fn get_zone_mut(&mut self, player: PlayerId, zone: Zone) -> Option<&mut Vec<ObjectId>> {
        self.zones.get_mut(&player).map(|z| z.list_mut(zone))
    }

    /// Find which player's zone currently holds `object`.
    pub fn zone_of(&self, object: ObjectId) -> Option<(PlayerId, Zone)> {
        for player in &self.players {
            let zones = self.zones.get(&player.id)?;
            for zone in [
                Zone::Library,
                Zone::Hand,
                Zone::Battlefield,
                Zone::Graveyard,
                Zone::Exile,
                Zone::Command,
            ] {
                if zones.list(zone).contains(&object) {
                    return Some((player.id, zone));
                }
            }
        }
        None
    }

    /// All battlefield objects in player order, then placement order.
    pub fn battlefield(&self) -> Vec<ObjectId> {
        let mut out = Vec::new();
        for player in &self.players {
            if let Some(zones) = self.zones.get(&player.id) {
                out.extend_from_slice(&zones.battlefield);
            }
        }
        out
    }

    /// Move an object into `player`'s `to` zone, removing it from wherever
    /// it currently sits. Returns a human-readable log line and records a
    /// zone-change event.
    pub fn move_card(&mut self, object: ObjectId, player: PlayerId, to: Zone) -> String {
        let from = self.zone_of(object);
        if let Some((holder, zone)) = from {
            if let Some(zones) = self.zones.get_mut(&holder) {
                zones.list_mut(zone).retain(|id| *id != object);
            }
        }
        self.zones.entry(player).or_default().list_mut(to).push(object);

        let name = self
            .objects
            .get(&object)
            .map(|o| o.name.clone())
            .unwrap_or_else(|| format!("{object:?}"));
        self.pending_events.push(GameEvent::ZoneChange {
            object,
            from: from.map(|(_, z)| z),
            to,
        });
        format!("{name} moves to {to}.")
    }

    /// Drain buffered events into an observer.
    pub fn drain_events(&mut self, observer: &mut dyn crate::events::Observer) {
        for event in self.pending_events.drain(..) {
            observer.notify(&event);
        }
    }

    // ------------------------------------------------------------------
    // Target legality
    // ------------------------------------------------------------------

    /// A target's own validity predicate: objects are legal while they sit
    /// on the battlefield, players while they are still in the game.
    pub fn target_is_legal(&self, target: Target) -> bool {
        match target {
            Target::Object(id) => matches!(self.zone_of(id), Some((_, Zone::Battlefield))),
            Target::Player(id) => self.player(id).map(|p| !p.lost).unwrap_or(false),
        }
    }

    // ------------------------------------------------------------------
    // Library and hand primitives
    // ------------------------------------------------------------------

    /// Draw up to `count` cards (the top of the library is its last entry).
    pub fn draw_cards(&mut self, player: PlayerId, count: u32) -> u32 {
        let mut drawn = 0;
        for _ in 0..count {
            let top = match self.zones.get_mut(&player) {
                Some(zones) => zones.library.pop(),
                None => None,
            };
            match top {
                Some(card) => {
                    self.zones.entry(player).or_default().hand.push(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        drawn
    }

    /// Discard the first `count` cards of the player's hand.
    pub fn discard_cards(&mut self, player: PlayerId, count: u32) -> u32 {
        let mut discarded = 0;
        for _ in 0..count {
            let card = match self.zones.get_mut(&player) {
                Some(zones) if !zones.hand.is_empty() => Some(zones.hand.remove(0)),
                _ => None,
            };
            match card {
                Some(card) => {
                    self.zones.entry(player).or_default().graveyard.push(card);
                    discarded += 1;
                }
                None => break,
            }
        }
        discarded
    }

    pub fn shuffle_library(&mut self, player: PlayerId) {
        use rand::seq::SliceRandom;
        if let Some(zones) = self.zones.get_mut(&player) {
            zones.library.shuffle(&mut rand::rng());
        }
    }

    // ------------------------------------------------------------------
    // State-based actions (minimal hook)
    // ------------------------------------------------------------------

    /// Apply the minimal state-based actions the core depends on: lethal or
    /// deathtouch damage destroys creatures, zero toughness destroys, zero
    /// life loses the game. Damage marking elsewhere relies on this hook
    /// doing the destruction.
    pub fn check_state_based_actions(&mut self) -> Vec<String> {
        let mut log = Vec::new();

        let mut doomed = Vec::new();
        for id in self.battlefield() {
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            if !object.is_creature() {
                continue;
            }
            let lethal = object.toughness <= 0
                || object.damage as i32 >= object.toughness
                || (object.damaged_by_deathtouch && object.damage > 0);
            if lethal {
                doomed.push(id);
            }
        }
        for id in doomed {
            let (name, owner) = match self.objects.get(&id) {
                Some(object) => (object.name.clone(), object.owner),
                None => continue,
            };
            self.move_card(id, owner, Zone::Graveyard);
            self.pending_events
                .push(GameEvent::PermanentDestroyed { object: id });
            log.push(format!("{name} is destroyed."));
        }

        let mut losers = Vec::new();
        for player in &mut self.players {
            if player.life <= 0 && !player.lost {
                player.lost = true;
                losers.push((player.id, player.name.clone()));
            }
        }
        for (id, name) in losers {
            self.pending_events.push(GameEvent::PlayerLost { player: id });
            log.push(format!("{name} loses the game."));
        }

        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game() -> (GameState, PlayerId, PlayerId) {
        let alice = Player::new("Alice");
        let bob = Player::new("Bob");
        let (a, b) = (alice.id, bob.id);
        (GameState::new(vec![alice, bob]), a, b)
    }

    #[test]
    fn test_move_card_between_zones() {
        let (mut game, alice, _) = two_player_game();
        let bear = GameObject::new("Bear", "Creature — Bear", alice).with_power_toughness(2, 2);
        let id = game.add_object(bear, Zone::Battlefield);

        let log = game.move_card(id, alice, Zone::Graveyard);
        assert!(log.contains("graveyard"));
        assert_eq!(game.zone_of(id), Some((alice, Zone::Graveyard)));
        assert!(game.get_zone(alice, Zone::Battlefield).is_empty());
    }

    #[test]
    fn test_target_legality_tracks_zone() {
        let (mut game, alice, _) = two_player_game();
        let bear = GameObject::new("Bear", "Creature — Bear", alice).with_power_toughness(2, 2);
        let id = game.add_object(bear, Zone::Battlefield);

        assert!(game.target_is_legal(Target::Object(id)));
        game.move_card(id, alice, Zone::Graveyard);
        assert!(!game.target_is_legal(Target::Object(id)));
        assert!(game.target_is_legal(Target::Player(alice)));
    }

    #[test]
    fn test_sba_destroys_lethally_damaged_creature() {
        let (mut game, alice, _) = two_player_game();
        let bear = GameObject::new("Bear", "Creature — Bear", alice).with_power_toughness(2, 2);
        let id = game.add_object(bear, Zone::Battlefield);

        game.object_mut(id).unwrap().damage = 2;
        let log = game.check_state_based_actions();
        assert_eq!(log.len(), 1);
        assert_eq!(game.zone_of(id), Some((alice, Zone::Graveyard)));
    }

    #[test]
    fn test_sba_deathtouch_damage_is_lethal() {
        let (mut game, alice, _) = two_player_game();
        let ox = GameObject::new("Ox", "Creature — Ox", alice).with_power_toughness(4, 6);
        let id = game.add_object(ox, Zone::Battlefield);

        game.object_mut(id).unwrap().damage = 1;
        game.object_mut(id).unwrap().damaged_by_deathtouch = true;
        game.check_state_based_actions();
        assert_eq!(game.zone_of(id), Some((alice, Zone::Graveyard)));
    }

    #[test]
    fn test_sba_player_at_zero_life_loses() {
        let (mut game, _, bob) = two_player_game();
        game.player_mut(bob).unwrap().life = 0;
        let log = game.check_state_based_actions();
        assert!(log.iter().any(|l| l.contains("loses the game")));
        assert!(game.player(bob).unwrap().lost);
    }

    #[test]
    fn test_draw_from_empty_library_stops() {
        let (mut game, alice, _) = two_player_game();
        assert_eq!(game.draw_cards(alice, 3), 0);
    }
}
