//! CR613 layer ordering over real game state.

use cantrip::{
    CardMetadata, Duration, GameObject, GameState, Layer, LayerManager, ObjectId, OracleCompiler,
    Player, PlayerId, PtSublayer, StaticEffectDescriptor, TargetClass, Zone, register_statics,
};

fn game_with_creatures() -> (GameState, PlayerId, ObjectId, ObjectId) {
    let alice = Player::new("Alice");
    let bob = Player::new("Bob");
    let (a, b) = (alice.id, bob.id);
    let mut game = GameState::new(vec![alice, bob]);
    let mine = GameObject::new("Mine", "Creature — Soldier", a).with_power_toughness(2, 2);
    let mine_id = game.add_object(mine, Zone::Battlefield);
    let theirs = GameObject::new("Theirs", "Creature — Soldier", b).with_power_toughness(2, 2);
    let theirs_id = game.add_object(theirs, Zone::Battlefield);
    (game, a, mine_id, theirs_id)
}

#[test]
fn same_sublayer_descriptors_apply_in_timestamp_order() {
    let (mut game, alice, mine, _) = game_with_creatures();
    let mut manager = LayerManager::new();

    // Two 7c descriptors targeting "creatures you control": +1/+1 at t=1,
    // -1/-1 at t=2. t=1 must be visited first; the net delta is zero.
    manager.register_effect(
        StaticEffectDescriptor::new(
            Layer::PowerToughness(PtSublayer::Modifying),
            TargetClass::CreaturesYouControl,
        )
        .with_pt_boost(1, 1)
        .with_source(mine, alice)
        .with_timestamp(1),
    );
    manager.register_effect(
        StaticEffectDescriptor::new(
            Layer::PowerToughness(PtSublayer::Modifying),
            TargetClass::CreaturesYouControl,
        )
        .with_pt_boost(-1, -1)
        .with_source(mine, alice)
        .with_timestamp(2),
    );

    manager.apply_layers(&mut game);
    let object = game.object(mine).unwrap();
    assert_eq!(object.power, 2);
    assert_eq!(object.toughness, 2);
}

#[test]
fn registration_order_does_not_override_timestamp_order() {
    let (mut game, alice, mine, _) = game_with_creatures();
    let mut manager = LayerManager::new();

    // Registered out of order; the ability grant at t=1 must still be
    // visited before the removal at t=2, so the keyword ends up removed.
    manager.register_effect(
        StaticEffectDescriptor {
            keywords_removed: vec!["flying".to_string()],
            ..StaticEffectDescriptor::new(Layer::Ability, TargetClass::CreaturesYouControl)
        }
        .with_source(mine, alice)
        .with_timestamp(2),
    );
    manager.register_effect(
        StaticEffectDescriptor::new(Layer::Ability, TargetClass::CreaturesYouControl)
            .with_abilities(&["flying"])
            .with_source(mine, alice)
            .with_timestamp(1),
    );

    manager.apply_layers(&mut game);
    assert!(!game.object(mine).unwrap().has_ability("flying"));
}

#[test]
fn controller_scoped_anthem_skips_opposing_creatures() {
    let (mut game, alice, mine, theirs) = game_with_creatures();
    let mut manager = LayerManager::new();
    manager.register_effect(
        StaticEffectDescriptor::new(
            Layer::PowerToughness(PtSublayer::Modifying),
            TargetClass::CreaturesYouControl,
        )
        .with_pt_boost(1, 1)
        .with_source(mine, alice),
    );

    manager.apply_layers(&mut game);
    assert_eq!(game.object(mine).unwrap().power, 3);
    assert_eq!(game.object(theirs).unwrap().power, 2);
}

#[test]
fn layers_recompute_from_base_on_every_application() {
    let (mut game, alice, mine, _) = game_with_creatures();
    let mut manager = LayerManager::new();
    manager.register_effect(
        StaticEffectDescriptor::new(
            Layer::PowerToughness(PtSublayer::Modifying),
            TargetClass::CreaturesYouControl,
        )
        .with_pt_boost(2, 2)
        .with_source(mine, alice),
    );

    manager.apply_layers(&mut game);
    manager.apply_layers(&mut game);
    manager.apply_layers(&mut game);
    assert_eq!(game.object(mine).unwrap().power, 4);

    manager.remove_source_effects(mine);
    manager.apply_layers(&mut game);
    assert_eq!(game.object(mine).unwrap().power, 2);
}

#[test]
fn until_end_of_turn_effects_expire() {
    let (mut game, alice, mine, _) = game_with_creatures();
    let mut manager = LayerManager::new();
    manager.register_effect(
        StaticEffectDescriptor::new(
            Layer::PowerToughness(PtSublayer::Modifying),
            TargetClass::CreaturesYouControl,
        )
        .with_pt_boost(3, 3)
        .with_duration(Duration::UntilEndOfTurn)
        .with_source(mine, alice),
    );

    manager.apply_layers(&mut game);
    assert_eq!(game.object(mine).unwrap().power, 5);

    manager.expire_end_of_turn();
    manager.apply_layers(&mut game);
    assert_eq!(game.object(mine).unwrap().power, 2);
}

#[test]
fn parsed_anthem_registers_through_the_pipeline() {
    let (mut game, alice, mine, theirs) = game_with_creatures();

    let compiler = OracleCompiler::new();
    let anthem = compiler.compile(CardMetadata::new(
        "Glorious Anthem",
        "Enchantment",
        "Creatures you control get +1/+1.",
    ));
    let enchantment = GameObject::new("Glorious Anthem", "Enchantment", alice);
    let enchantment_id = game.add_object(enchantment, Zone::Battlefield);

    let mut manager = LayerManager::new();
    register_statics(&anthem, enchantment_id, alice, &mut manager);
    manager.apply_layers(&mut game);

    assert_eq!(game.object(mine).unwrap().power, 3);
    assert_eq!(game.object(theirs).unwrap().power, 2);
}

#[test]
fn malformed_layer_designations_are_rejected() {
    for bad in ["0", "8", "7e", "seven", ""] {
        assert!(bad.parse::<Layer>().is_err());
    }
}
