use std::time::Duration;

use dungeon_defence_core::{Command, Event, HeroId};
use dungeon_defence_system_spawning::{Config, Spawning};
use dungeon_defence_world::{self as world, query, World};

fn time_advanced(millis: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }
}

#[test]
fn first_hero_spawns_on_first_tick() {
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(2), 3));
    let mut commands = Vec::new();

    spawning.handle(&[time_advanced(16)], &mut commands);

    assert_eq!(commands, vec![Command::SpawnHero]);
    assert_eq!(spawning.remaining(), 2);
}

#[test]
fn no_spawns_without_time_passing() {
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(2), 3));
    let mut commands = Vec::new();

    spawning.handle(&[], &mut commands);

    assert!(commands.is_empty());
    assert_eq!(spawning.remaining(), 3);
}

#[test]
fn emits_multiple_spawn_commands_for_large_dt() {
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 10));
    let mut commands = Vec::new();

    spawning.handle(&[time_advanced(2_000)], &mut commands);

    assert_eq!(commands.len(), 5, "initial hero plus one per interval");
}

#[test]
fn wave_stops_at_wave_size() {
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(100), 3));
    let mut commands = Vec::new();

    for _ in 0..20 {
        spawning.handle(&[time_advanced(50)], &mut commands);
    }

    assert_eq!(commands.len(), 3);
    assert_eq!(spawning.remaining(), 0);
}

#[test]
fn spawned_heroes_enter_world_in_id_order() {
    let mut world =
        World::new(&world::reference_layout(), world::Config::default()).expect("layout");
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 2));
    let mut events = Vec::new();
    let mut commands = Vec::new();

    for _ in 0..40 {
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(25),
            },
            &mut events,
        );
        spawning.handle(&events, &mut commands);
        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }

    let heroes: Vec<HeroId> = query::hero_view(&world).iter().map(|hero| hero.id).collect();
    assert_eq!(heroes, vec![HeroId::new(0), HeroId::new(1)]);
}
