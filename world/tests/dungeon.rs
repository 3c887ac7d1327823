use std::time::Duration;

use dungeon_defence_core::{
    CellCoord, Command, DespawnCause, Event, HeroAction, HeroAnimation, HeroId, PlacementError,
    SoundId, StructureId, StructureKind, WorldPoint,
};
use dungeon_defence_system_combat::CombatTuning;
use dungeon_defence_world::{self as world, query, Config, World};

const FRAME: Duration = Duration::from_millis(16);

fn new_world() -> World {
    World::new(&world::reference_layout(), Config::with_seed(11)).expect("reference layout")
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn place(world: &mut World, kind: StructureKind, position: WorldPoint) -> Vec<Event> {
    let _ = run(world, Command::BeginPlacement { kind });
    let _ = run(world, Command::TrackCandidate { position });
    run(world, Command::CommitPlacement { position })
}

fn trap_cell_centre() -> WorldPoint {
    WorldPoint::new(280.0, 170.0)
}

fn tower_cell_centre() -> WorldPoint {
    WorldPoint::new(190.0, 80.0)
}

#[test]
fn hero_walks_the_path_then_attacks_until_exhausted() {
    let mut world = new_world();
    let spawned = run(&mut world, Command::SpawnHero);
    assert!(spawned.contains(&Event::HeroSpawned {
        hero: HeroId::new(0),
        position: WorldPoint::new(1000.0, -10.0),
    }));

    let mut log = Vec::new();
    for _ in 0..4_000 {
        log.extend(run(&mut world, Command::Tick { dt: FRAME }));
        if log
            .iter()
            .any(|event| matches!(event, Event::HeroDespawned { .. }))
        {
            break;
        }
    }

    let position_of = |wanted: &Event| log.iter().position(|event| event == wanted);
    let attacking = position_of(&Event::HeroActionChanged {
        hero: HeroId::new(0),
        from: HeroAction::Walking,
        to: HeroAction::Attacking,
    })
    .expect("hero reached the end of the path");
    let leaving = position_of(&Event::HeroActionChanged {
        hero: HeroId::new(0),
        from: HeroAction::Attacking,
        to: HeroAction::Leaving,
    })
    .expect("hero ran out of stamina while attacking");
    assert!(attacking < leaving);

    let strikes = log
        .iter()
        .filter(|event| matches!(event, Event::HeroStruck { .. }))
        .count();
    assert_eq!(strikes, 3);

    let attack_animations = log
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::HeroAnimationChanged {
                    animation: HeroAnimation::Attack,
                    ..
                }
            )
        })
        .count();
    assert_eq!(attack_animations, 1, "attack animation is announced once");

    assert!(log.contains(&Event::HeroDespawned {
        hero: HeroId::new(0),
        cause: DespawnCause::Left,
    }));
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::HeroDied { .. })));
    assert!(query::hero_view(&world).iter().next().is_none());
    assert_eq!(query::gold(&world), 0);
}

#[test]
fn tower_on_trap_cell_is_discarded() {
    let mut world = new_world();

    let events = place(&mut world, StructureKind::Tower, trap_cell_centre());

    assert_eq!(
        events,
        vec![Event::CandidateDiscarded {
            kind: StructureKind::Tower,
            reason: PlacementError::WrongClassification,
        }]
    );
    assert!(query::structure_view(&world).iter().next().is_none());
    assert_eq!(query::candidate(&world), None);
}

#[test]
fn placement_outside_grid_is_discarded() {
    let mut world = new_world();

    let events = place(&mut world, StructureKind::Trap, WorldPoint::new(10.0, 10.0));

    assert_eq!(
        events,
        vec![Event::CandidateDiscarded {
            kind: StructureKind::Trap,
            reason: PlacementError::OutOfBounds,
        }]
    );
}

#[test]
fn occupied_cells_reject_second_structure() {
    let mut world = new_world();

    let first = place(&mut world, StructureKind::Trap, trap_cell_centre());
    assert_eq!(
        first,
        vec![Event::StructurePlaced {
            structure: StructureId::new(0),
            kind: StructureKind::Trap,
            cell: CellCoord::new(1, 1),
            position: trap_cell_centre(),
        }]
    );

    let second = place(&mut world, StructureKind::Trap, WorldPoint::new(300.0, 190.0));
    assert_eq!(
        second,
        vec![Event::CandidateDiscarded {
            kind: StructureKind::Trap,
            reason: PlacementError::Occupied,
        }]
    );
}

#[test]
fn candidate_follows_pointer_until_committed() {
    let mut world = new_world();
    let _ = run(
        &mut world,
        Command::BeginPlacement {
            kind: StructureKind::Tower,
        },
    );

    let moved = run(
        &mut world,
        Command::TrackCandidate {
            position: WorldPoint::new(42.0, 24.0),
        },
    );

    assert_eq!(
        moved,
        vec![Event::CandidateMoved {
            position: WorldPoint::new(42.0, 24.0),
        }]
    );
    assert_eq!(
        query::candidate(&world),
        Some((StructureKind::Tower, WorldPoint::new(42.0, 24.0)))
    );

    let _ = run(
        &mut world,
        Command::CommitPlacement {
            position: tower_cell_centre(),
        },
    );
    assert_eq!(query::candidate(&world), None);
    assert!(run(&mut world, Command::CommitPlacement {
        position: tower_cell_centre(),
    })
    .is_empty());
}

#[test]
fn trap_springs_once_and_pays_out_damage() {
    let mut world = new_world();
    let _ = place(&mut world, StructureKind::Trap, trap_cell_centre());
    let _ = run(&mut world, Command::SpawnHero);
    let trigger = Command::TriggerStructure {
        structure: StructureId::new(0),
        hero: HeroId::new(0),
    };

    let events = run(&mut world, trigger);

    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::TrapSprung,
    }));
    assert!(events.contains(&Event::HeroDamaged {
        hero: HeroId::new(0),
        dealt: 35.0,
        health: 65.0,
    }));
    assert!(events.contains(&Event::GoldChanged { gold: 35 }));
    assert!(run(&mut world, trigger).is_empty(), "traps do not re-arm");

    let hero = query::hero(&world, HeroId::new(0)).expect("hero alive");
    assert_eq!(hero.health, 65.0);
}

#[test]
fn lethal_traps_kill_and_despawn_hero() {
    let mut world = new_world();
    for column in 1..=3 {
        let position = WorldPoint::new(145.0 + 90.0 * (column as f32 + 0.5), 170.0);
        let _ = place(&mut world, StructureKind::Trap, position);
    }
    let _ = run(&mut world, Command::SpawnHero);

    let mut log = Vec::new();
    for structure in 0..3 {
        log.extend(run(
            &mut world,
            Command::TriggerStructure {
                structure: StructureId::new(structure),
                hero: HeroId::new(0),
            },
        ));
    }

    assert!(log.iter().any(|event| matches!(
        event,
        Event::HeroDamaged { dealt, health, .. } if *dealt == 30.0 && *health <= 0.0
    )));
    assert!(log
        .iter()
        .any(|event| matches!(event, Event::HeroDied { .. })));
    assert_eq!(query::gold(&world), 100);
    let hero = query::hero(&world, HeroId::new(0)).expect("hero is dying");
    assert_eq!(hero.action, HeroAction::Dying);
    assert!(!hero.targetable);

    let mut despawned = Vec::new();
    for _ in 0..108 {
        despawned.extend(run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(25),
            },
        ));
    }
    assert!(despawned.contains(&Event::HeroDespawned {
        hero: HeroId::new(0),
        cause: DespawnCause::Died,
    }));
    assert!(query::hero(&world, HeroId::new(0)).is_none());
}

#[test]
fn tower_slows_and_rearms_after_refresh() {
    let mut world = new_world();
    let _ = place(&mut world, StructureKind::Tower, tower_cell_centre());
    let _ = run(&mut world, Command::SpawnHero);
    let trigger = Command::TriggerStructure {
        structure: StructureId::new(0),
        hero: HeroId::new(0),
    };

    let events = run(&mut world, trigger);
    assert!(events.contains(&Event::HeroSlowed {
        hero: HeroId::new(0),
    }));
    assert!(query::hero(&world, HeroId::new(0)).expect("hero").slowed);
    assert!(run(&mut world, trigger).is_empty(), "cooldown gate closed");
    assert!(!query::structure_view(&world)
        .iter()
        .next()
        .expect("tower")
        .armed);

    let ticked = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(2_000),
        },
    );
    assert!(ticked.contains(&Event::StructureRearmed {
        structure: StructureId::new(0),
    }));

    let again = run(&mut world, trigger);
    assert!(again.contains(&Event::HeroSlowed {
        hero: HeroId::new(0),
    }));
    assert_eq!(query::gold(&world), 0);
}

#[test]
fn slowed_hero_recovers() {
    let mut world = new_world();
    let _ = place(&mut world, StructureKind::Tower, tower_cell_centre());
    let _ = run(&mut world, Command::SpawnHero);
    let _ = run(
        &mut world,
        Command::TriggerStructure {
            structure: StructureId::new(0),
            hero: HeroId::new(0),
        },
    );

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(3_500),
        },
    );

    assert!(events.contains(&Event::HeroRecovered {
        hero: HeroId::new(0),
    }));
    assert!(!query::hero(&world, HeroId::new(0)).expect("hero").slowed);
}

#[test]
fn time_advances_with_each_tick() {
    let mut world = new_world();
    let events = run(&mut world, Command::Tick { dt: FRAME });

    assert_eq!(events, vec![Event::TimeAdvanced { dt: FRAME }]);
    assert_eq!(query::elapsed(&world), FRAME);
    assert_eq!(query::tick_index(&world), 1);
}

/// Traps along the first corridor, which the hero has left behind once it attacks.
fn place_three_traps(world: &mut World) {
    for column in 1..=3 {
        let position = WorldPoint::new(145.0 + 90.0 * (column as f32 + 0.5), 170.0);
        let _ = place(world, StructureKind::Trap, position);
    }
}

fn tick_until_attacking(world: &mut World, log: &mut Vec<Event>) {
    let attacking = Event::HeroActionChanged {
        hero: HeroId::new(0),
        from: HeroAction::Walking,
        to: HeroAction::Attacking,
    };
    for _ in 0..2_000 {
        log.extend(run(world, Command::Tick { dt: FRAME }));
        if log.contains(&attacking) {
            return;
        }
    }
    panic!("hero never reached the end of the path");
}

fn spring_three_traps(world: &mut World, log: &mut Vec<Event>) {
    for structure in 0..3 {
        log.extend(run(
            world,
            Command::TriggerStructure {
                structure: StructureId::new(structure),
                hero: HeroId::new(0),
            },
        ));
    }
}

#[test]
fn pending_strike_lands_after_attacker_dies() {
    let mut world = new_world();
    let _ = run(&mut world, Command::SpawnHero);

    let mut log = Vec::new();
    tick_until_attacking(&mut world, &mut log);
    place_three_traps(&mut world);
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::HeroStruck { .. })));

    spring_three_traps(&mut world, &mut log);
    for _ in 0..250 {
        log.extend(run(&mut world, Command::Tick { dt: FRAME }));
    }

    let died = log
        .iter()
        .position(|event| matches!(event, Event::HeroDied { .. }))
        .expect("traps killed the attacker");
    let struck: Vec<usize> = log
        .iter()
        .enumerate()
        .filter(|(_, event)| matches!(event, Event::HeroStruck { .. }))
        .map(|(index, _)| index)
        .collect();
    assert_eq!(struck.len(), 1, "attack cycles stop once the hero is dying");
    assert!(struck[0] > died, "strike scheduled before death still lands");
}

#[test]
fn strikes_for_despawned_heroes_never_land() {
    let tuning = CombatTuning {
        strike_delay: Duration::from_millis(5_000),
        ..CombatTuning::default()
    };
    let mut world =
        World::new(&world::reference_layout(), Config::new(11, tuning)).expect("reference layout");
    let _ = run(&mut world, Command::SpawnHero);

    let mut log = Vec::new();
    tick_until_attacking(&mut world, &mut log);
    place_three_traps(&mut world);
    spring_three_traps(&mut world, &mut log);
    for _ in 0..400 {
        log.extend(run(&mut world, Command::Tick { dt: FRAME }));
    }

    let despawned = log
        .iter()
        .position(|event| {
            matches!(
                event,
                Event::HeroDespawned {
                    cause: DespawnCause::Died,
                    ..
                }
            )
        })
        .expect("death sequence completed");
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::HeroStruck { .. })));
    assert!(!log[despawned..]
        .iter()
        .any(|event| matches!(event, Event::GoldChanged { .. })));
    assert_eq!(query::gold(&world), 100);
}
