//! Combat damage arithmetic and partial-failure declaration batches.

use cantrip::{
    Defender, GameObject, GameState, ObjectId, Player, PlayerId, Zone, assign_combat_damage,
    declare_attackers, declare_blockers, new_combat,
};

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
fn deathtouch_without_trample_assigns_one_each_and_discards_the_rest() {
    let (mut game, alice, bob) = two_player_game();
    // Attacker: power 4, deathtouch, no trample.
    let attacker = creature(&mut game, alice, "Viper", 4, 4, &["deathtouch"]);
    // Blockers in order: B1 (toughness 3), B2 (toughness 2).
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

    // Each blocker absorbs exactly 1; the remaining 2 power is discarded.
    assert_eq!(game.object(b1).unwrap().damage, 1);
    assert_eq!(game.object(b2).unwrap().damage, 1);
    assert_eq!(game.player(bob).unwrap().life, 20);
    // Attacker takes B1.power + B2.power back.
    assert_eq!(game.object(attacker).unwrap().damage, 3);
    // Deathtouch damage is remembered for the state-based-action hook.
    assert!(game.object(b1).unwrap().damaged_by_deathtouch);
}

#[test]
fn deathtouch_blockers_deal_one_back() {
    let (mut game, alice, bob) = two_player_game();
    let attacker = creature(&mut game, alice, "Ox", 4, 6, &[]);
    let blocker = creature(&mut game, bob, "Asp", 3, 3, &["deathtouch"]);

    let mut combat = new_combat();
    declare_attackers(
        &mut combat,
        &mut game,
        alice,
        &[(attacker, Defender::Player(bob))],
    );
    declare_blockers(&mut combat, &mut game, bob, &[(blocker, attacker)]);
    assign_combat_damage(&mut combat, &mut game);

    // A deathtouch blocker deals 1, not its power.
    assert_eq!(game.object(attacker).unwrap().damage, 1);
    assert!(game.object(attacker).unwrap().damaged_by_deathtouch);
}

#[test]
fn trample_excess_reaches_the_defending_player() {
    let (mut game, alice, bob) = two_player_game();
    let attacker = creature(&mut game, alice, "Wurm", 6, 6, &["trample"]);
    let blocker = creature(&mut game, bob, "Wall", 0, 4, &[]);

    let mut combat = new_combat();
    declare_attackers(
        &mut combat,
        &mut game,
        alice,
        &[(attacker, Defender::Player(bob))],
    );
    declare_blockers(&mut combat, &mut game, bob, &[(blocker, attacker)]);
    assign_combat_damage(&mut combat, &mut game);

    assert_eq!(game.object(blocker).unwrap().damage, 4);
    assert_eq!(game.player(bob).unwrap().life, 18);
}

#[test]
fn blocker_damage_distribution_respects_existing_damage() {
    let (mut game, alice, bob) = two_player_game();
    let attacker = creature(&mut game, alice, "Ox", 4, 4, &[]);
    let blocker = creature(&mut game, bob, "Bear", 2, 3, &[]);
    // The blocker already has 1 damage marked; only 2 more fit.
    game.object_mut(blocker).unwrap().damage = 1;

    let mut combat = new_combat();
    declare_attackers(
        &mut combat,
        &mut game,
        alice,
        &[(attacker, Defender::Player(bob))],
    );
    declare_blockers(&mut combat, &mut game, bob, &[(blocker, attacker)]);
    assign_combat_damage(&mut combat, &mut game);

    // min(remaining 4, toughness 3 - existing 1) = 2 assigned; the rest is
    // discarded without trample.
    assert_eq!(game.object(blocker).unwrap().damage, 3);
    assert_eq!(game.player(bob).unwrap().life, 20);
}

#[test]
fn partial_attacker_batch_applies_legal_entries_only() {
    let (mut game, alice, bob) = two_player_game();
    let first = creature(&mut game, alice, "First", 1, 1, &[]);
    let second = creature(&mut game, alice, "Second", 1, 1, &[]);
    let third = creature(&mut game, alice, "Third", 1, 1, &[]);
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

    // First and third apply; exactly one skip message for the second.
    assert!(combat.is_attacking(first));
    assert!(!combat.is_attacking(second));
    assert!(combat.is_attacking(third));
    assert_eq!(
        log.iter()
            .filter(|line| line.contains("tapped and can't attack"))
            .count(),
        1
    );

    declare_blockers(&mut combat, &mut game, bob, &[]);
    assign_combat_damage(&mut combat, &mut game);
    assert_eq!(game.player(bob).unwrap().life, 18);
}

#[test]
fn combat_marks_damage_and_sba_destroys() {
    let (mut game, alice, bob) = two_player_game();
    let attacker = creature(&mut game, alice, "Giant", 4, 4, &[]);
    let blocker = creature(&mut game, bob, "Squire", 1, 2, &[]);

    let mut combat = new_combat();
    declare_attackers(
        &mut combat,
        &mut game,
        alice,
        &[(attacker, Defender::Player(bob))],
    );
    declare_blockers(&mut combat, &mut game, bob, &[(blocker, attacker)]);
    assign_combat_damage(&mut combat, &mut game);

    // Combat only marks damage; the creature is still on the battlefield.
    assert_eq!(game.zone_of(blocker), Some((bob, Zone::Battlefield)));

    // The state-based-action hook performs the destruction.
    game.check_state_based_actions();
    assert_eq!(game.zone_of(blocker), Some((bob, Zone::Graveyard)));
    assert_eq!(game.zone_of(attacker), Some((alice, Zone::Battlefield)));
}

#[test]
fn illegal_defender_is_skipped() {
    let (mut game, alice, _bob) = two_player_game();
    let attacker = creature(&mut game, alice, "Bear", 2, 2, &[]);

    let mut combat = new_combat();
    // Attacking yourself is not legal.
    let log = declare_attackers(
        &mut combat,
        &mut game,
        alice,
        &[(attacker, Defender::Player(alice))],
    );

    assert!(log.iter().any(|line| line.contains("not a legal defender")));
    assert!(combat.attackers.is_empty());
    assert!(!game.object(attacker).unwrap().tapped);
}
