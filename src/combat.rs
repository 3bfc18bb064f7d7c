//! Combat declaration and damage assignment.
//!
//! Combat advances through a linear state machine (idle, attackers
//! declared, blockers declared, damage assigned) with no backward
//! transitions; a new combat resets to idle. Declarations are
//! partial-failure batches: each entry is validated independently, illegal
//! entries are skipped with a log message and never abort the rest.
//!
//! Damage is only marked here. Destruction of lethally damaged creatures
//! belongs to the state-based-action hook.

use crate::events::GameEvent;
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};

/// Combat's linear progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombatStep {
    #[default]
    Idle,
    AttackersDeclared,
    BlockersDeclared,
    DamageAssigned,
}

/// What an attacker is attacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defender {
    Player(PlayerId),
    Planeswalker(ObjectId),
}

/// One declared attacker and its target.
#[derive(Debug, Clone)]
pub struct AttackerInfo {
    pub creature: ObjectId,
    pub defender: Defender,
}

/// One declared blocker and the attackers it blocks, in declaration order.
#[derive(Debug, Clone)]
pub struct BlockerInfo {
    pub blocker: ObjectId,
    pub attackers: Vec<ObjectId>,
}

/// Combat state tracking.
#[derive(Debug, Clone, Default)]
pub struct CombatState {
    pub step: CombatStep,
    pub attackers: Vec<AttackerInfo>,
    pub blockers: Vec<BlockerInfo>,
}

impl CombatState {
    pub fn is_attacking(&self, creature: ObjectId) -> bool {
        self.attackers.iter().any(|a| a.creature == creature)
    }

    /// Blockers assigned to `attacker`, derived by scanning the blocker
    /// records in declaration order (no stored inverse).
    pub fn blockers_of(&self, attacker: ObjectId) -> Vec<ObjectId> {
        self.blockers
            .iter()
            .filter(|info| info.attackers.contains(&attacker))
            .map(|info| info.blocker)
            .collect()
    }
}

/// Creates a new, empty combat state.
pub fn new_combat() -> CombatState {
    CombatState::default()
}

fn object_name(game: &GameState, id: ObjectId) -> String {
    game.object(id)
        .map(|o| o.name.clone())
        .unwrap_or_else(|| format!("{id:?}"))
}

fn defender_name(game: &GameState, defender: Defender) -> String {
    match defender {
        Defender::Player(id) => game
            .player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("{id:?}")),
        Defender::Planeswalker(id) => object_name(game, id),
    }
}

/// Validate one attacker declaration. Returns an error message to log when
/// the entry must be skipped.
fn validate_attacker(
    game: &GameState,
    player: PlayerId,
    creature: ObjectId,
    defender: Defender,
) -> Result<(), String> {
    let name = object_name(game, creature);
    let Some(object) = game.object(creature) else {
        return Err(format!("{name} does not exist."));
    };
    if !matches!(
        game.zone_of(creature),
        Some((_, crate::zone::Zone::Battlefield))
    ) {
        return Err(format!("{name} is not on the battlefield."));
    }
    if object.controller != player {
        return Err(format!("{name} is not controlled by the attacking player."));
    }
    if !object.is_creature() {
        return Err(format!("{name} is not a creature."));
    }
    if object.tapped {
        return Err(format!("{name} is tapped and can't attack."));
    }
    if object.summoning_sick && !object.has_ability("haste") {
        return Err(format!("{name} has summoning sickness."));
    }
    if object.cant_attack {
        return Err(format!("{name} can't attack."));
    }

    let legal_defender = match defender {
        Defender::Player(id) => id != player && game.player(id).is_some(),
        Defender::Planeswalker(id) => game
            .object(id)
            .map(|walker| game.player(walker.controller).is_some())
            .unwrap_or(false),
    };
    if !legal_defender {
        return Err(format!(
            "{} is not a legal defender.",
            defender_name(game, defender)
        ));
    }
    Ok(())
}

/// Declare attackers for `player`.
///
/// Each `(creature, defender)` pair is validated independently; one illegal
/// declaration never aborts the others. Valid attackers are tapped and
/// marked attacking. Returns a log line per declaration attempt.
pub fn declare_attackers(
    combat: &mut CombatState,
    game: &mut GameState,
    player: PlayerId,
    assignments: &[(ObjectId, Defender)],
) -> Vec<String> {
    if !matches!(
        combat.step,
        CombatStep::Idle | CombatStep::AttackersDeclared
    ) {
        return vec!["Attackers may only be declared before blockers.".to_string()];
    }

    let mut log = Vec::new();
    for (creature, defender) in assignments {
        match validate_attacker(game, player, *creature, *defender) {
            Err(message) => log.push(message),
            Ok(()) => {
                combat.attackers.push(AttackerInfo {
                    creature: *creature,
                    defender: *defender,
                });
                if let Some(object) = game.object_mut(*creature) {
                    object.tapped = true;
                    object.attacking = true;
                }
                game.pending_events
                    .push(GameEvent::AttackerDeclared { creature: *creature });
                log.push(format!(
                    "{} attacks {}.",
                    object_name(game, *creature),
                    defender_name(game, *defender)
                ));
            }
        }
    }
    combat.step = CombatStep::AttackersDeclared;
    log
}

fn validate_blocker(
    combat: &CombatState,
    game: &GameState,
    player: PlayerId,
    blocker: ObjectId,
    attacker: ObjectId,
) -> Result<(), String> {
    let name = object_name(game, blocker);
    let Some(object) = game.object(blocker) else {
        return Err(format!("{name} does not exist."));
    };
    if !matches!(
        game.zone_of(blocker),
        Some((_, crate::zone::Zone::Battlefield))
    ) {
        return Err(format!("{name} is not on the battlefield."));
    }
    if object.controller != player {
        return Err(format!("{name} is not controlled by the defending player."));
    }
    if !object.is_creature() {
        return Err(format!("{name} is not a creature."));
    }
    if object.tapped {
        return Err(format!("{name} is tapped and can't block."));
    }
    if combat.blockers.iter().any(|info| info.blocker == blocker) {
        return Err(format!("{name} has already been declared as a blocker."));
    }
    if !combat.is_attacking(attacker) {
        return Err(format!(
            "{} is not attacking.",
            object_name(game, attacker)
        ));
    }

    // Evasion.
    let Some(attacker_object) = game.object(attacker) else {
        return Err(format!("{} does not exist.", object_name(game, attacker)));
    };
    if attacker_object.has_ability("flying")
        && !object.has_ability("flying")
        && !object.has_ability("reach")
    {
        return Err(format!(
            "{name} can't block {} (flying).",
            attacker_object.name
        ));
    }
    if attacker_object.has_ability("shadow") && !object.has_ability("shadow") {
        return Err(format!(
            "{name} can't block {} (shadow).",
            attacker_object.name
        ));
    }
    Ok(())
}

/// Declare blockers for `player` as `(blocker, attacker)` pairs.
///
/// Symmetric with [`declare_attackers`]: per-entry validation, illegal
/// entries skipped with a message.
pub fn declare_blockers(
    combat: &mut CombatState,
    game: &mut GameState,
    player: PlayerId,
    assignments: &[(ObjectId, ObjectId)],
) -> Vec<String> {
    if !matches!(
        combat.step,
        CombatStep::AttackersDeclared | CombatStep::BlockersDeclared
    ) {
        return vec!["Blockers may only be declared after attackers.".to_string()];
    }
    if combat.attackers.is_empty() {
        return vec!["No attackers have been declared.".to_string()];
    }

    let mut log = Vec::new();
    for (blocker, attacker) in assignments {
        match validate_blocker(combat, game, player, *blocker, *attacker) {
            Err(message) => log.push(message),
            Ok(()) => {
                combat.blockers.push(BlockerInfo {
                    blocker: *blocker,
                    attackers: vec![*attacker],
                });
                if let Some(object) = game.object_mut(*blocker) {
                    object.blocking = true;
                }
                game.pending_events.push(GameEvent::BlockerDeclared {
                    blocker: *blocker,
                    attacker: *attacker,
                });
                log.push(format!(
                    "{} blocks {}.",
                    object_name(game, *blocker),
                    object_name(game, *attacker)
                ));
            }
        }
    }
    combat.step = CombatStep::BlockersDeclared;
    log
}

fn deal_to_defender(game: &mut GameState, defender: Defender, amount: u32) {
    match defender {
        Defender::Player(id) => {
            if let Some(player) = game.player_mut(id) {
                player.lose_life(amount);
            }
        }
        Defender::Planeswalker(id) => {
            if let Some(walker) = game.object_mut(id) {
                if let Some(loyalty) = walker.loyalty {
                    walker.loyalty = Some(loyalty - amount as i32);
                }
            }
        }
    }
}

/// Assign combat damage for every declared attacker.
///
/// Unblocked attackers hit their defender for full power. Blocked
/// attackers distribute power across their blockers in blocker-list order:
/// a deathtouch attacker assigns 1 per blocker, otherwise each blocker
/// absorbs up to its remaining toughness; leftover power spills to the
/// defender only with trample, and is discarded otherwise. Every blocker
/// simultaneously deals its own power (1 with deathtouch) back to the
/// attacker. Damage is marked, never lethal here.
pub fn assign_combat_damage(combat: &mut CombatState, game: &mut GameState) -> Vec<String> {
    if !matches!(
        combat.step,
        CombatStep::AttackersDeclared | CombatStep::BlockersDeclared
    ) {
        return vec!["Combat damage may only be assigned after declarations.".to_string()];
    }

    let mut log = Vec::new();
    for info in combat.attackers.clone() {
        let attacker = info.creature;
        let attacker_name = object_name(game, attacker);
        let Some(object) = game.object(attacker) else {
            continue;
        };
        let power = object.power.max(0) as u32;
        let deathtouch = object.has_ability("deathtouch");
        let trample = object.has_ability("trample");

        let blockers = combat.blockers_of(attacker);
        if blockers.is_empty() {
            deal_to_defender(game, info.defender, power);
            game.pending_events.push(GameEvent::CombatDamage {
                source: attacker,
                amount: power,
                blocked: false,
            });
            log.push(format!(
                "{attacker_name} deals {power} damage to {}.",
                defender_name(game, info.defender)
            ));
            continue;
        }

        let mut remaining = power as i64;
        for blocker in &blockers {
            let Some(object) = game.object_mut(*blocker) else {
                continue;
            };
            let open = (object.toughness - object.damage as i32).max(0) as i64;
            let damage = if deathtouch { 1 } else { remaining.min(open) };
            object.damage += damage as u32;
            if deathtouch && damage > 0 {
                object.damaged_by_deathtouch = true;
            }
            remaining -= damage;
            let blocker_name = object.name.clone();
            game.pending_events.push(GameEvent::CombatDamage {
                source: attacker,
                amount: damage as u32,
                blocked: true,
            });
            log.push(format!(
                "{attacker_name} deals {damage} damage to {blocker_name}."
            ));
            if remaining <= 0 {
                break;
            }
        }

        if remaining > 0 && trample {
            deal_to_defender(game, info.defender, remaining as u32);
            game.pending_events.push(GameEvent::CombatDamage {
                source: attacker,
                amount: remaining as u32,
                blocked: true,
            });
            log.push(format!(
                "{attacker_name} deals {remaining} trample damage to {}.",
                defender_name(game, info.defender)
            ));
        }

        // Blockers strike back simultaneously.
        for blocker in &blockers {
            let Some((blocker_name, blocker_power, blocker_deathtouch)) = game
                .object(*blocker)
                .map(|o| (o.name.clone(), o.power.max(0) as u32, o.has_ability("deathtouch")))
            else {
                continue;
            };
            let damage = if blocker_deathtouch { 1 } else { blocker_power };
            if let Some(object) = game.object_mut(attacker) {
                object.damage += damage;
                if blocker_deathtouch && damage > 0 {
                    object.damaged_by_deathtouch = true;
                }
            }
            game.pending_events.push(GameEvent::CombatDamage {
                source: *blocker,
                amount: damage,
                blocked: true,
            });
            log.push(format!(
                "{blocker_name} deals {damage} damage to {attacker_name}."
            ));
        }
    }

    combat.step = CombatStep::DamageAssigned;
    log
}

/// Clear combat status flags and reset for the next combat.
pub fn end_combat(combat: &mut CombatState, game: &mut GameState) {
    for info in &combat.attackers {
        if let Some(object) = game.object_mut(info.creature) {
            object.attacking = false;
        }
    }
    for info in &combat.blockers {
        if let Some(object) = game.object_mut(info.blocker) {
            object.blocking = false;
        }
    }
    *combat = CombatState::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::GameObject;
    use crate::player::Player;
    use crate::zone::Zone;

    fn two_player_game() -> (GameState, PlayerId, PlayerId) {
        let alice = Player::new("Alice");
        let bob = Player::new("Bob");
        let (a, b) = (alice.id, bob.id);
        (GameState::new(vec![alice, bob]), a, b)
    }

    fn creature(
        game: &mut GameState,
        owner: PlayerId,
        name: &str,
        power: i32,
        toughness: i32,
        abilities: &[&str],
    ) -> ObjectId {
        let object = GameObject::new(name, "Creature", owner)
            .with_power_toughness(power, toughness)
            .with_abilities(abilities);
        game.add_object(object, Zone::Battlefield)
    }

    #[test]
    fn test_deathtouch_damage_distribution() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Viper", 4, 4, &["deathtouch"]);
        let b1 = creature(&mut game, bob, "B1", 2, 3, &[]);
        let b2 = creature(&mut game, bob, "B2", 1, 2, &[]);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        declare_blockers(&mut combat, &mut game, bob, &[(b1, attacker), (b2, attacker)]);
        assign_combat_damage(&mut combat, &mut game);

        // Deathtouch assigns exactly 1 to each blocker in order; the
        // leftover 2 power is discarded (no trample).
        assert_eq!(game.object(b1).unwrap().damage, 1);
        assert_eq!(game.object(b2).unwrap().damage, 1);
        assert_eq!(game.player(bob).unwrap().life, 20);
        // Both blockers strike back: 2 + 1 power.
        assert_eq!(game.object(attacker).unwrap().damage, 3);
    }

    #[test]
    fn test_trample_spills_leftover_to_defender() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Rhino", 5, 5, &["trample"]);
        let blocker = creature(&mut game, bob, "Wall", 0, 3, &[]);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        declare_blockers(&mut combat, &mut game, bob, &[(blocker, attacker)]);
        assign_combat_damage(&mut combat, &mut game);

        assert_eq!(game.object(blocker).unwrap().damage, 3);
        assert_eq!(game.player(bob).unwrap().life, 18);
    }

    #[test]
    fn test_no_trample_discards_leftover() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Ox", 5, 5, &[]);
        let blocker = creature(&mut game, bob, "Wall", 0, 3, &[]);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        declare_blockers(&mut combat, &mut game, bob, &[(blocker, attacker)]);
        assign_combat_damage(&mut combat, &mut game);

        assert_eq!(game.object(blocker).unwrap().damage, 3);
        assert_eq!(game.player(bob).unwrap().life, 20);
    }

    #[test]
    fn test_unblocked_attacker_hits_player() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Bear", 2, 2, &[]);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        declare_blockers(&mut combat, &mut game, bob, &[]);
        assign_combat_damage(&mut combat, &mut game);

        assert_eq!(game.player(bob).unwrap().life, 18);
    }

    #[test]
    fn test_unblocked_attacker_hits_planeswalker() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Bear", 2, 2, &[]);
        let walker = GameObject::new("Walker", "Planeswalker", bob).with_loyalty(4);
        let walker_id = game.add_object(walker, Zone::Battlefield);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Planeswalker(walker_id))],
        );
        assign_combat_damage(&mut combat, &mut game);

        assert_eq!(game.object(walker_id).unwrap().loyalty, Some(2));
    }

    #[test]
    fn test_partial_attacker_batch_skips_only_illegal_entry() {
        let (mut game, alice, bob) = two_player_game();
        let first = creature(&mut game, alice, "First", 2, 2, &[]);
        let second = creature(&mut game, alice, "Second", 2, 2, &[]);
        let third = creature(&mut game, alice, "Third", 2, 2, &[]);
        game.object_mut(second).unwrap().tapped = true;

        let mut combat = new_combat();
        let log = declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[
                (first, Defender::Player(bob)),
                (second, Defender::Player(bob)),
                (third, Defender::Player(bob)),
            ],
        );

        assert_eq!(combat.attackers.len(), 2);
        assert!(combat.is_attacking(first));
        assert!(!combat.is_attacking(second));
        assert!(combat.is_attacking(third));
        let skips: Vec<_> = log.iter().filter(|l| l.contains("can't attack")).collect();
        assert_eq!(skips.len(), 1);
        assert!(skips[0].contains("Second"));
    }

    #[test]
    fn test_flying_evasion_rejects_ground_blocker() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Hawk", 1, 1, &["flying"]);
        let grounded = creature(&mut game, bob, "Bear", 2, 2, &[]);
        let spider = creature(&mut game, bob, "Spider", 1, 3, &["reach"]);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        let log = declare_blockers(
            &mut combat,
            &mut game,
            bob,
            &[(grounded, attacker), (spider, attacker)],
        );

        assert!(log.iter().any(|l| l.contains("(flying)")));
        assert_eq!(combat.blockers_of(attacker), vec![spider]);
    }

    #[test]
    fn test_summoning_sickness_without_haste_cannot_attack() {
        let (mut game, alice, bob) = two_player_game();
        let slow = creature(&mut game, alice, "Slow", 2, 2, &[]);
        let fast = creature(&mut game, alice, "Fast", 2, 2, &["haste"]);
        game.object_mut(slow).unwrap().summoning_sick = true;
        game.object_mut(fast).unwrap().summoning_sick = true;

        let mut combat = new_combat();
        let log = declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(slow, Defender::Player(bob)), (fast, Defender::Player(bob))],
        );

        assert!(log.iter().any(|l| l.contains("summoning sickness")));
        assert_eq!(combat.attackers.len(), 1);
        assert!(combat.is_attacking(fast));
    }

    #[test]
    fn test_attacker_is_tapped_when_declared() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Bear", 2, 2, &[]);

        let mut combat = new_combat();
        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        assert!(game.object(attacker).unwrap().tapped);
        assert!(game.object(attacker).unwrap().attacking);
    }

    #[test]
    fn test_state_machine_is_linear() {
        let (mut game, alice, bob) = two_player_game();
        let attacker = creature(&mut game, alice, "Bear", 2, 2, &[]);

        let mut combat = new_combat();
        // Blockers before attackers is rejected.
        let log = declare_blockers(&mut combat, &mut game, bob, &[]);
        assert!(log[0].contains("after attackers"));

        declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        assign_combat_damage(&mut combat, &mut game);
        assert_eq!(combat.step, CombatStep::DamageAssigned);

        // No backward transition: declaring attackers again is rejected.
        let log = declare_attackers(
            &mut combat,
            &mut game,
            alice,
            &[(attacker, Defender::Player(bob))],
        );
        assert!(log[0].contains("before blockers"));

        end_combat(&mut combat, &mut game);
        assert_eq!(combat.step, CombatStep::Idle);
        assert!(!game.object(attacker).unwrap().attacking);
    }
}
