//! Property-based tests for damage resolution, scoring and the engine.

use proptest::prelude::*;
use skirmish_core::combat::{resolve_hit, Vitality, MIN_HEALTH_DAMAGE};
use skirmish_core::components::{DamageType, UnitSize};
use skirmish_core::math::Hp;
use skirmish_core::scoring::unit_value;
use skirmish_test_utils::determinism::strategies::{
    arb_armor, arb_damage, arb_damage_type, arb_engagement, arb_record, arb_unit_size,
};
use skirmish_test_utils::fixtures::{sim_from, snapshot_of};

fn arb_vitality() -> impl Strategy<Value = Vitality> {
    (1i32..=500, 0i32..=300, arb_armor(), 0i32..=3, arb_unit_size()).prop_map(
        |(health, shields, armor, shield_armor, size)| {
            Vitality::new(Hp::from_num(health), Hp::from_num(shields), size)
                .with_armor(armor, Hp::from_num(shield_armor))
        },
    )
}

proptest! {
    #[test]
    fn prop_hits_never_heal(
        vitality in arb_vitality(),
        damage in arb_damage(),
        damage_type in arb_damage_type(),
    ) {
        let mut hit = vitality;
        resolve_hit(&mut hit, damage, damage_type);

        prop_assert!(hit.total() <= vitality.total());
        prop_assert!(hit.health <= vitality.health);
        prop_assert!(hit.shields <= vitality.shields);
        prop_assert!(hit.health >= Hp::ZERO);
    }

    #[test]
    fn prop_hits_beyond_mitigation_always_hurt(
        vitality in arb_vitality(),
        damage in arb_damage(),
        damage_type in arb_damage_type(),
    ) {
        let mitigated = vitality.shields > Hp::ZERO && damage <= vitality.shield_armor;
        prop_assume!(!mitigated);

        let mut hit = vitality;
        resolve_hit(&mut hit, damage, damage_type);
        prop_assert!(hit.total() < vitality.total());
    }

    #[test]
    fn prop_shields_absorb_first(
        vitality in arb_vitality(),
        damage in arb_damage(),
        damage_type in arb_damage_type(),
    ) {
        let mut hit = vitality;
        resolve_hit(&mut hit, damage, damage_type);

        if hit.shields > Hp::ZERO {
            prop_assert_eq!(hit.health, vitality.health);
        }
    }

    #[test]
    fn prop_health_damage_has_a_floor(
        health in 10i32..=500,
        armor in 0i32..=50,
        damage in arb_damage(),
        size in arb_unit_size(),
    ) {
        let mut vitality = Vitality::new(Hp::from_num(health), Hp::ZERO, size)
            .with_armor(Hp::from_num(armor), Hp::ZERO);
        let before = vitality.health;
        resolve_hit(&mut vitality, damage, DamageType::Concussive);
        prop_assert!(before - vitality.health >= MIN_HEALTH_DAMAGE);
    }

    #[test]
    fn prop_damage_type_table(points in 2i32..=100) {
        let damage = Hp::from_num(points);
        let taken = |damage_type, size| {
            let mut target = Vitality::new(Hp::from_num(500), Hp::ZERO, size);
            resolve_hit(&mut target, damage, damage_type);
            Hp::from_num(500) - target.health
        };

        let concussive_small = taken(DamageType::Concussive, UnitSize::Small);
        let concussive_large = taken(DamageType::Concussive, UnitSize::Large);
        prop_assert_eq!(concussive_large * 4, concussive_small);

        let explosive_small = taken(DamageType::Explosive, UnitSize::Small);
        let explosive_large = taken(DamageType::Explosive, UnitSize::Large);
        prop_assert_eq!(explosive_small * 2, explosive_large);

        prop_assert_eq!(taken(DamageType::Normal, UnitSize::Medium), damage);
    }

    #[test]
    fn prop_score_is_bounded_and_monotone(
        record in arb_record(),
        lost_health in 0i32..=600,
        extra_loss in 0i32..=600,
        lost_shields in 0i32..=300,
    ) {
        let full = snapshot_of(&record);
        let cap = i64::from(full.score) + i64::from(full.score_bonus);
        prop_assert!(unit_value(&full) <= cap);

        let mut wounded = full.clone();
        wounded.vitality.health = (full.vitality.health - Hp::from_num(lost_health)).max(Hp::ZERO);
        wounded.vitality.shields = (full.vitality.shields - Hp::from_num(lost_shields)).max(Hp::ZERO);
        let mut worse = wounded.clone();
        worse.vitality.health = (wounded.vitality.health - Hp::from_num(extra_loss)).max(Hp::ZERO);

        let value = unit_value(&wounded);
        prop_assert!(value >= 0 && value <= cap);
        prop_assert!(value <= unit_value(&full));
        prop_assert!(unit_value(&worse) <= value);
    }

    #[test]
    fn prop_fighting_never_raises_army_value(records in arb_engagement(10)) {
        let mut sim = sim_from(&records);
        let initial = sim.scores();

        for _ in 0..4 {
            sim.simulate(24);
            let now = sim.scores();
            prop_assert!(now.friendly.total <= initial.friendly.total);
            prop_assert!(now.enemy.total <= initial.enemy.total);
        }
    }
}
