#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat resolution shared by heroes and structures.
//!
//! The resolver owns the only random source in the simulation. It is seeded
//! explicitly (or handed an arbitrary [`Rng`]) so replays and tests observe
//! identical damage rolls and death reactions.

use std::time::Duration;

use dungeon_defence_core::DeathReaction;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

/// Policy values controlling hero attacks and stamina costs.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatTuning {
    /// Stamina required for, and drained by, a single attack cycle.
    pub attack_cost: f32,
    /// Lowest damage an attack may roll.
    pub min_damage: u32,
    /// Highest damage an attack may roll.
    pub max_damage: u32,
    /// Delay between successive attack cycles.
    pub attack_delay: Duration,
    /// Delay between starting an attack and its damage landing.
    pub strike_delay: Duration,
    /// Stamina drained on every walking tick.
    pub walk_drain: f32,
    /// Stamina drained each time a structure slows the hero.
    pub slow_drain: f32,
    /// Probability of selecting the rare death reaction.
    pub rare_death_chance: f64,
    /// Number of strike sound variants to pick from.
    pub hit_sound_variants: u8,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            attack_cost: 6.0,
            min_damage: 6,
            max_damage: 9,
            attack_delay: Duration::from_millis(1_000),
            strike_delay: Duration::from_millis(300),
            walk_drain: 0.05,
            slow_drain: 3.0,
            rare_death_chance: 0.05,
            hit_sound_variants: 2,
        }
    }
}

/// Result of applying damage to a health pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOutcome {
    /// Health after the hit. Can drop below zero on a killing blow.
    pub health: f32,
    /// Damage actually dealt, never more than the health before the hit.
    pub dealt: f32,
    /// Whether this hit exhausted the health pool.
    pub fatal: bool,
}

/// Applies `damage` to `health`.
///
/// A pool that is already exhausted is left untouched and reports zero
/// damage, so repeated hits on a dying actor never fire a second death.
#[must_use]
pub fn apply_damage(health: f32, damage: f32) -> DamageOutcome {
    if health <= 0.0 {
        return DamageOutcome {
            health,
            dealt: 0.0,
            fatal: false,
        };
    }

    let damage = damage.max(0.0);
    let remaining = health - damage;
    DamageOutcome {
        health: remaining,
        dealt: damage.min(health),
        fatal: remaining <= 0.0,
    }
}

/// Drains `amount` from `stamina`, clamping at zero.
#[must_use]
pub fn drain(stamina: f32, amount: f32) -> f32 {
    (stamina - amount).max(0.0)
}

/// Plan for a single attack cycle produced by [`CombatResolver::begin_attack_cycle`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackCycle {
    /// Stamina left after paying for the attack up front.
    pub stamina: f32,
    /// Damage carried by the strike once it lands.
    pub damage: u32,
    /// Strike sound variant, numbered from 1.
    pub hit_variant: u8,
    /// Delay until the strike lands.
    pub strike_delay: Duration,
    /// Delay until the next attack cycle should be attempted.
    pub next_cycle_in: Duration,
}

/// Rolls damage and reactions from a seedable random source.
#[derive(Debug, Clone)]
pub struct CombatResolver<R = ChaCha8Rng> {
    tuning: CombatTuning,
    rng: R,
}

impl CombatResolver<ChaCha8Rng> {
    /// Creates a resolver backed by a ChaCha generator seeded with `seed`.
    #[must_use]
    pub fn new(tuning: CombatTuning, seed: u64) -> Self {
        Self::with_rng(tuning, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> CombatResolver<R> {
    /// Creates a resolver backed by the provided random source.
    #[must_use]
    pub fn with_rng(tuning: CombatTuning, rng: R) -> Self {
        Self { tuning, rng }
    }

    /// Policy values used by the resolver.
    #[must_use]
    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Starts an attack cycle if `stamina` covers the attack cost.
    ///
    /// The cost is paid immediately: the returned stamina already reflects it
    /// even though the strike only lands after `strike_delay`.
    pub fn begin_attack_cycle(&mut self, stamina: f32) -> Option<AttackCycle> {
        if stamina < self.tuning.attack_cost {
            return None;
        }

        let damage = self.roll_damage();
        let hit_variant = self.rng.gen_range(1..=self.tuning.hit_sound_variants.max(1));
        Some(AttackCycle {
            stamina: drain(stamina, self.tuning.attack_cost),
            damage,
            hit_variant,
            strike_delay: self.tuning.strike_delay,
            next_cycle_in: self.tuning.attack_delay,
        })
    }

    /// Rolls damage uniformly from the inclusive tuning range.
    pub fn roll_damage(&mut self) -> u32 {
        let low = self.tuning.min_damage.min(self.tuning.max_damage);
        let high = self.tuning.min_damage.max(self.tuning.max_damage);
        self.rng.gen_range(low..=high)
    }

    /// Selects the reaction played on death.
    ///
    /// A single roll picks the rare reaction when it lands in the top
    /// `rare_death_chance` of the unit interval; the remainder is split evenly
    /// between the common reactions.
    pub fn death_reaction(&mut self) -> DeathReaction {
        let roll: f64 = self.rng.gen();
        let common_share = (1.0 - self.tuning.rare_death_chance).clamp(0.0, 1.0);
        if roll >= common_share {
            return DeathReaction::Rare;
        }

        let variants = DeathReaction::COMMON_VARIANTS;
        let index = (roll / common_share * f64::from(variants)) as u8;
        DeathReaction::Common(index.min(variants - 1) + 1)
    }
}
