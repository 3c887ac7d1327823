//! Hero behaviour state machine.

use std::time::Duration;

use dungeon_defence_core::{
    DespawnCause, Event, Facing, Grid, HeroAction, HeroAnimation, HeroId, HeroSnapshot, MapPosition,
    SoundId, WorldPoint,
};
use dungeon_defence_system_combat::{self as combat, CombatResolver};
use tracing::debug;

use crate::{
    path::{Path, PathFollower},
    scheduler::{Scheduler, TaskHandle},
    Task,
};

/// Movement-rate constant while unhindered.
pub const MOVE_SPEED: f32 = 0.4;
/// Movement-rate constant while slowed.
pub const MOVE_SPEED_SLOW: f32 = 0.2;
/// Duration a slow lasts after its most recent application.
pub const SLOW_RECOVERY_TIME: Duration = Duration::from_millis(3_500);
/// Health a hero enters the dungeon with.
pub const MAX_HEALTH: f32 = 100.0;
/// Stamina a hero enters the dungeon with.
pub const MAX_STAMINA: f32 = 100.0;
/// Length of the teleport-out sequence including its fade.
pub const LEAVE_SEQUENCE: Duration = Duration::from_millis(2_430);
/// Length of the death sequence including its fade.
pub const DEATH_SEQUENCE: Duration = Duration::from_millis(2_675);

/// Collaborators a hero needs while running its state machine.
pub(crate) struct HeroContext<'a> {
    pub(crate) path: &'a Path,
    pub(crate) grid: &'a Grid,
    pub(crate) scheduler: &'a mut Scheduler<Task>,
    pub(crate) resolver: &'a mut CombatResolver,
    pub(crate) events: &'a mut Vec<Event>,
}

#[derive(Clone, Debug)]
pub(crate) struct Hero {
    pub(crate) id: HeroId,
    action: HeroAction,
    follower: PathFollower,
    position: WorldPoint,
    map_position: MapPosition,
    health: f32,
    stamina: f32,
    slowed: bool,
    slow_timer: Option<TaskHandle>,
    sequence: Option<TaskHandle>,
    targetable: bool,
    animation: HeroAnimation,
}

impl Hero {
    pub(crate) fn spawn(id: HeroId, path: &Path, grid: &Grid) -> Self {
        let position = path.start();
        Self {
            id,
            action: HeroAction::Walking,
            follower: PathFollower::new(),
            position,
            map_position: grid.map_position(position),
            health: MAX_HEALTH,
            stamina: MAX_STAMINA,
            slowed: false,
            slow_timer: None,
            sequence: None,
            targetable: true,
            animation: HeroAnimation::Walk(Facing::Down),
        }
    }

    pub(crate) const fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) const fn animation(&self) -> HeroAnimation {
        self.animation
    }

    pub(crate) const fn targetable(&self) -> bool {
        self.targetable
    }

    pub(crate) fn snapshot(&self) -> HeroSnapshot {
        HeroSnapshot {
            id: self.id,
            action: self.action,
            progress: self.follower.progress(),
            position: self.position,
            map_position: self.map_position,
            health: self.health,
            stamina: self.stamina,
            slowed: self.slowed,
            targetable: self.targetable,
        }
    }

    /// Runs the per-tick behaviour of the current state.
    ///
    /// Only walking has per-tick work: attacking is driven by scheduled
    /// attack cycles and the terminal states by their sequence timers.
    pub(crate) fn tick(&mut self, elapsed_ms: f32, ctx: &mut HeroContext<'_>) {
        if self.action == HeroAction::Walking {
            self.walk(elapsed_ms, ctx);
        }
    }

    fn walk(&mut self, elapsed_ms: f32, ctx: &mut HeroContext<'_>) {
        if self.stamina <= 0.0 {
            self.leave(ctx);
            return;
        }

        self.drain(ctx.resolver.tuning().walk_drain);

        let speed = if self.slowed {
            MOVE_SPEED_SLOW
        } else {
            MOVE_SPEED
        };
        let step = PathFollower::step(speed, elapsed_ms);
        let progress = self.follower.advance_by(step);
        self.position = ctx.path.point_at(progress).unwrap_or_else(|| ctx.path.end());
        self.map_position = ctx.grid.map_position(self.position);
        ctx.events.push(Event::HeroMoved {
            hero: self.id,
            position: self.position,
        });

        if self.follower.finished() {
            self.transition(HeroAction::Attacking, ctx);
            self.attack_cycle(ctx);
            return;
        }

        if let Some(facing) = self.follower.lookahead_facing(ctx.path, self.position, step) {
            self.animate(HeroAnimation::Walk(facing), ctx);
        }
    }

    /// Attempts one attack cycle and schedules the next.
    ///
    /// Stamina is paid as the cycle starts; the strike lands later and is
    /// not cancelled if the hero changes state in the meantime.
    pub(crate) fn attack_cycle(&mut self, ctx: &mut HeroContext<'_>) {
        if self.action != HeroAction::Attacking {
            return;
        }

        let Some(cycle) = ctx.resolver.begin_attack_cycle(self.stamina) else {
            self.leave(ctx);
            return;
        };

        self.stamina = cycle.stamina;
        self.animate(HeroAnimation::Attack, ctx);

        let _ = ctx.scheduler.schedule(
            cycle.strike_delay,
            false,
            Task::Strike {
                hero: self.id,
                damage: cycle.damage,
                hit_variant: cycle.hit_variant,
            },
        );
        let _ = ctx
            .scheduler
            .schedule(cycle.next_cycle_in, false, Task::AttackCycle { hero: self.id });
    }

    /// Applies damage and returns the amount actually dealt.
    ///
    /// Heroes that are already out of health ignore further damage and
    /// report zero.
    pub(crate) fn apply_damage(&mut self, damage: f32, ctx: &mut HeroContext<'_>) -> f32 {
        if self.health <= 0.0 {
            return 0.0;
        }

        let outcome = combat::apply_damage(self.health, damage);
        self.health = outcome.health;
        ctx.events.push(Event::HeroDamaged {
            hero: self.id,
            dealt: outcome.dealt,
            health: self.health,
        });

        if outcome.fatal {
            self.die(ctx);
        }
        outcome.dealt
    }

    /// Slows the hero, restarting the recovery timer rather than stacking.
    pub(crate) fn apply_slow(&mut self, ctx: &mut HeroContext<'_>) {
        self.slowed = true;
        if let Some(timer) = self.slow_timer.take() {
            let _ = ctx.scheduler.cancel(timer);
        }
        self.slow_timer = Some(ctx.scheduler.schedule(
            SLOW_RECOVERY_TIME,
            false,
            Task::SlowExpired { hero: self.id },
        ));
        self.drain(ctx.resolver.tuning().slow_drain);
        ctx.events.push(Event::HeroSlowed { hero: self.id });
    }

    pub(crate) fn recover(&mut self, events: &mut Vec<Event>) {
        self.slow_timer = None;
        if self.slowed {
            self.slowed = false;
            events.push(Event::HeroRecovered { hero: self.id });
        }
    }

    /// Reports whether a finished sequence belongs to the hero's current state.
    pub(crate) fn completes(&self, cause: DespawnCause) -> bool {
        matches!(
            (self.action, cause),
            (HeroAction::Leaving, DespawnCause::Left) | (HeroAction::Dying, DespawnCause::Died)
        )
    }

    fn drain(&mut self, amount: f32) {
        self.stamina = combat::drain(self.stamina, amount);
    }

    fn leave(&mut self, ctx: &mut HeroContext<'_>) {
        if self.action.is_terminal() {
            return;
        }

        self.transition(HeroAction::Leaving, ctx);
        self.animate(HeroAnimation::Teleport, ctx);
        ctx.events.push(Event::SoundRequested {
            sound: SoundId::HeroTeleport,
        });
        self.sequence = Some(ctx.scheduler.schedule(
            LEAVE_SEQUENCE,
            false,
            Task::SequenceComplete {
                hero: self.id,
                cause: DespawnCause::Left,
            },
        ));
    }

    fn die(&mut self, ctx: &mut HeroContext<'_>) {
        if self.action == HeroAction::Dying {
            return;
        }

        self.transition(HeroAction::Dying, ctx);
        self.targetable = false;
        if let Some(sequence) = self.sequence.take() {
            let _ = ctx.scheduler.cancel(sequence);
        }

        let reaction = ctx.resolver.death_reaction();
        ctx.events.push(Event::HeroDied {
            hero: self.id,
            reaction,
        });
        ctx.events.push(Event::SoundRequested {
            sound: reaction.sound(),
        });
        self.animate(HeroAnimation::Death, ctx);
        self.sequence = Some(ctx.scheduler.schedule(
            DEATH_SEQUENCE,
            false,
            Task::SequenceComplete {
                hero: self.id,
                cause: DespawnCause::Died,
            },
        ));
    }

    fn transition(&mut self, to: HeroAction, ctx: &mut HeroContext<'_>) {
        let from = self.action;
        if from == to {
            return;
        }
        debug!(hero = self.id.get(), ?from, ?to, "hero transition");
        self.action = to;
        ctx.events.push(Event::HeroActionChanged {
            hero: self.id,
            from,
            to,
        });
    }

    fn animate(&mut self, animation: HeroAnimation, ctx: &mut HeroContext<'_>) {
        if self.animation == animation {
            return;
        }
        self.animation = animation;
        ctx.events.push(Event::HeroAnimationChanged {
            hero: self.id,
            animation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_layout;
    use dungeon_defence_system_combat::CombatTuning;

    struct Fixture {
        path: Path,
        grid: Grid,
        scheduler: Scheduler<Task>,
        resolver: CombatResolver,
        events: Vec<Event>,
    }

    impl Fixture {
        fn new() -> Self {
            let layout = reference_layout();
            Self {
                path: Path::from_layout(&layout).expect("reference path is valid"),
                grid: Grid::from_layout(&layout).expect("reference grid is valid"),
                scheduler: Scheduler::new(),
                resolver: CombatResolver::new(CombatTuning::default(), 7),
                events: Vec::new(),
            }
        }

        fn ctx(&mut self) -> HeroContext<'_> {
            HeroContext {
                path: &self.path,
                grid: &self.grid,
                scheduler: &mut self.scheduler,
                resolver: &mut self.resolver,
                events: &mut self.events,
            }
        }

        fn hero(&self) -> Hero {
            Hero::spawn(HeroId::new(0), &self.path, &self.grid)
        }

        fn due_tasks(&mut self) -> Vec<Task> {
            std::iter::from_fn(|| self.scheduler.pop_due()).collect()
        }
    }

    #[test]
    fn lethal_damage_is_clamped_and_kills() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        hero.health = 10.0;

        let dealt = hero.apply_damage(15.0, &mut fixture.ctx());

        assert_eq!(dealt, 10.0);
        assert!(hero.health <= 0.0);
        assert_eq!(hero.action, HeroAction::Dying);
        assert!(!hero.targetable());
        assert!(fixture
            .events
            .iter()
            .any(|event| matches!(event, Event::HeroDied { .. })));
    }

    #[test]
    fn damage_after_death_is_ignored() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        let _ = hero.apply_damage(MAX_HEALTH, &mut fixture.ctx());
        fixture.events.clear();

        let dealt = hero.apply_damage(35.0, &mut fixture.ctx());

        assert_eq!(dealt, 0.0);
        assert!(fixture.events.is_empty());
    }

    #[test]
    fn exhausted_walker_leaves_without_dying() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        hero.stamina = 0.0;

        hero.tick(16.0, &mut fixture.ctx());

        assert_eq!(hero.action, HeroAction::Leaving);
        assert_eq!(hero.health, MAX_HEALTH);
        assert_eq!(hero.animation(), HeroAnimation::Teleport);
        assert!(fixture.events.contains(&Event::HeroActionChanged {
            hero: hero.id,
            from: HeroAction::Walking,
            to: HeroAction::Leaving,
        }));
        assert!(fixture.events.contains(&Event::SoundRequested {
            sound: SoundId::HeroTeleport,
        }));
    }

    #[test]
    fn walking_drains_stamina_and_moves_along_path() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        let start = hero.position();

        hero.tick(16.0, &mut fixture.ctx());

        assert!(hero.stamina < MAX_STAMINA);
        assert!(hero.follower.progress() > 0.0);
        assert_ne!(hero.position(), start);
    }

    #[test]
    fn reapplied_slow_restarts_recovery() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();

        hero.apply_slow(&mut fixture.ctx());
        fixture.scheduler.advance(Duration::from_millis(3_000));
        assert!(fixture.due_tasks().is_empty());

        hero.apply_slow(&mut fixture.ctx());
        fixture.scheduler.advance(Duration::from_millis(3_000));
        assert!(fixture.due_tasks().is_empty(), "first timer was cancelled");

        fixture.scheduler.advance(Duration::from_millis(500));
        assert_eq!(
            fixture.due_tasks(),
            vec![Task::SlowExpired { hero: hero.id }]
        );
        assert_eq!(hero.stamina, MAX_STAMINA - 6.0);

        hero.recover(&mut fixture.events);
        assert!(!hero.slowed);
    }

    #[test]
    fn attack_cycle_pays_stamina_and_schedules_strike() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        hero.action = HeroAction::Attacking;

        hero.attack_cycle(&mut fixture.ctx());
        assert_eq!(hero.stamina, MAX_STAMINA - 6.0);

        fixture.scheduler.advance(Duration::from_millis(300));
        let tasks = fixture.due_tasks();
        assert_eq!(tasks.len(), 1);
        assert!(matches!(
            tasks[0],
            Task::Strike { damage: 6..=9, .. }
        ));

        fixture.scheduler.advance(Duration::from_millis(700));
        assert_eq!(
            fixture.due_tasks(),
            vec![Task::AttackCycle { hero: hero.id }]
        );
    }

    #[test]
    fn attacker_without_stamina_leaves() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        hero.action = HeroAction::Attacking;
        hero.stamina = 5.0;

        hero.attack_cycle(&mut fixture.ctx());

        assert_eq!(hero.action, HeroAction::Leaving);
        assert_eq!(hero.stamina, 5.0);
    }

    #[test]
    fn death_replaces_pending_leave_sequence() {
        let mut fixture = Fixture::new();
        let mut hero = fixture.hero();
        hero.leave(&mut fixture.ctx());
        let _ = hero.apply_damage(MAX_HEALTH, &mut fixture.ctx());

        fixture.scheduler.advance(LEAVE_SEQUENCE);
        assert!(fixture.due_tasks().is_empty());
        assert!(!hero.completes(DespawnCause::Left));

        fixture.scheduler.advance(DEATH_SEQUENCE - LEAVE_SEQUENCE);
        assert_eq!(
            fixture.due_tasks(),
            vec![Task::SequenceComplete {
                hero: hero.id,
                cause: DespawnCause::Died,
            }]
        );
        assert!(hero.completes(DespawnCause::Died));
    }
}
