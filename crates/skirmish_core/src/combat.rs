//! Damage resolution.
//!
//! This module implements the hit arithmetic used by the engine:
//! - Shields absorb first, mitigated by shield armor
//! - Overflow carries into health, mitigated by flat armor
//! - Concussive/explosive damage is scaled by target size
//! - Health damage never drops below half a hit point
//!
//! All arithmetic happens on the raw bits of [`Hp`], so every rounding step
//! is integer division on 1/256ths of a hit point.

use serde::{Deserialize, Serialize};

use crate::components::{DamageType, UnitSize};
use crate::math::Hp;

/// Smallest health damage one hit can deal (0.5 hp).
pub const MIN_HEALTH_DAMAGE: Hp = Hp::from_bits(128);

/// Health, shields and the armor protecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vitality {
    /// Current health.
    pub health: Hp,
    /// Maximum health.
    pub max_health: Hp,
    /// Current shields.
    pub shields: Hp,
    /// Maximum shields.
    pub max_shields: Hp,
    /// Flat reduction applied to health damage.
    pub armor: Hp,
    /// Flat reduction applied to shield damage.
    pub shield_armor: Hp,
    /// Size class for damage-type scaling.
    pub size: UnitSize,
}

impl Vitality {
    /// Create full-health vitality with no armor.
    #[must_use]
    pub fn new(max_health: Hp, max_shields: Hp, size: UnitSize) -> Self {
        Self {
            health: max_health,
            max_health,
            shields: max_shields,
            max_shields,
            armor: Hp::ZERO,
            shield_armor: Hp::ZERO,
            size,
        }
    }

    /// Builder method to set armor.
    #[must_use]
    pub fn with_armor(mut self, armor: Hp, shield_armor: Hp) -> Self {
        self.armor = armor;
        self.shield_armor = shield_armor;
        self
    }

    /// Check if the unit is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > Hp::ZERO
    }

    /// Check if health is below maximum.
    #[must_use]
    pub fn is_wounded(&self) -> bool {
        self.health < self.max_health
    }

    /// Health plus shields.
    #[must_use]
    pub fn total(&self) -> Hp {
        self.health.saturating_add(self.shields)
    }

    /// Apply one hit. See [`resolve_hit`].
    pub fn take_hit(&mut self, damage: Hp, damage_type: DamageType) {
        resolve_hit(self, damage, damage_type);
    }

    /// Restore health up to the maximum.
    pub fn heal(&mut self, amount: Hp) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Restore shields up to the maximum.
    pub fn recharge(&mut self, amount: Hp) {
        self.shields = self.shields.saturating_add(amount).min(self.max_shields);
    }
}

/// Scale health-stage damage by the damage type / size table.
///
/// | type       | small | medium | large |
/// |------------|-------|--------|-------|
/// | normal     | 1     | 1      | 1     |
/// | concussive | 1     | 1/2    | 1/4   |
/// | explosive  | 1/2   | 3/4    | 1     |
#[must_use]
pub fn size_scaled(raw_damage: i32, damage_type: DamageType, size: UnitSize) -> i32 {
    match (damage_type, size) {
        (DamageType::Concussive, UnitSize::Large) => raw_damage / 4,
        (DamageType::Concussive, UnitSize::Medium) => raw_damage / 2,
        (DamageType::Explosive, UnitSize::Small) => raw_damage / 2,
        (DamageType::Explosive, UnitSize::Medium) => (raw_damage * 3) / 4,
        _ => raw_damage,
    }
}

/// Apply one hit of `damage` to `target`.
///
/// 1. While shields are up they take the hit, reduced by shield armor. If
///    any shield remains the hit ends there.
/// 2. Whatever the shields did not absorb is reduced by armor, scaled by
///    [`size_scaled`], floored at [`MIN_HEALTH_DAMAGE`] and taken from
///    health. A hit that exactly empties the shields leaves health alone.
/// 3. Health is clamped at zero.
pub fn resolve_hit(target: &mut Vitality, damage: Hp, damage_type: DamageType) {
    let mut raw = damage.to_bits();

    if target.shields > Hp::ZERO {
        let shields = target.shields.to_bits();
        let shield_armor = target.shield_armor.to_bits();
        let remaining = shields - raw + shield_armor;
        if remaining > 0 {
            // Shield armor mitigates but never restores
            target.shields = Hp::from_bits(remaining.min(shields));
            return;
        }
        raw -= shields + shield_armor;
        target.shields = Hp::ZERO;
    }

    if raw == 0 {
        return;
    }

    raw -= target.armor.to_bits();
    raw = size_scaled(raw, damage_type, target.size);

    let dealt = raw.max(MIN_HEALTH_DAMAGE.to_bits());
    target.health = Hp::from_bits((target.health.to_bits() - dealt).max(0));
}
