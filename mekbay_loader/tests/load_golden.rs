//! Full-sheet load of a standard biped and the properties that should
//! hold for any well-formed sheet.

use mekbay_data::equipment::{HeatSinkKind, TechBase};
use mekbay_data::loc::Loc;
use mekbay_data::unit::{Quirk, SystemSlot, TechLevel};
use mekbay_loader::{catalog_from_toml, parse_unit};

const CATALOG: &str = include_str!("fixtures/catalog.toml");
const SHEET: &str = include_str!("fixtures/foundry_fdr5k.mtf");

fn load() -> mekbay_data::unit::Unit {
    let catalog = catalog_from_toml(CATALOG).expect("catalog fixture parses");
    parse_unit(SHEET, &catalog).expect("golden sheet loads")
}

#[test]
fn header_fields_are_populated() {
    let unit = load();
    assert_eq!(unit.chassis, "Foundry");
    assert_eq!(unit.model, "FDR-5K");
    assert_eq!(unit.mul_id, Some(5678));
    assert_eq!(unit.tonnage, 50.0);
    assert_eq!(unit.year, 3028);
    assert_eq!(unit.engine.rating, 250);
    assert_eq!(unit.engine.kind, "Fusion Engine");
    assert_eq!(unit.structure, "IS Standard");
    assert_eq!(unit.tech_base, TechBase::InnerSphere);
    assert!(!unit.mixed_tech);
    assert_eq!(unit.tech_level, TechLevel::Standard(TechBase::InnerSphere));
    assert_eq!(unit.role.as_deref(), Some("Brawler"));
    assert_eq!(unit.bv, Some(1520));
    assert_eq!(unit.source, "Field Manual Test Cycle");
}

#[test]
fn every_location_gets_armor() {
    let unit = load();
    for &loc in unit.config.location_order() {
        assert!(unit.armor_value(loc).is_some(), "no armor for {loc:?}");
    }
    for &loc in unit.config.rear_location_order() {
        assert!(unit.rear_armor_value(loc).is_some(), "no rear armor for {loc:?}");
    }
    assert_eq!(unit.armor_value(Loc::Head), Some(9));
    assert_eq!(unit.rear_armor_value(Loc::CenterTorso), Some(8));
    assert_eq!(unit.armor.kind, "Standard");
    assert_eq!(unit.armor.tech_level, Some(TechLevel::Standard(TechBase::InnerSphere)));
}

#[test]
fn missing_hand_actuator_is_removed() {
    let unit = load();
    assert!(unit.has_system(Loc::LeftArm, SystemSlot::Hand));
    assert!(!unit.has_system(Loc::RightArm, SystemSlot::Hand));
    assert!(unit.has_system(Loc::RightArm, SystemSlot::LowerArm));
    // The freed slot holds the small laser instead.
    let slot = unit.get_critical(Loc::RightArm, 3).expect("slot 3 is filled");
    let mount = unit.mount(slot.mount_id().expect("slot holds equipment"));
    assert_eq!(mount.equipment, "Small Laser");
}

#[test]
fn split_weapon_straddles_arm_and_torso() {
    let unit = load();
    let (id, mount) = unit
        .mounts()
        .find(|(_, m)| m.equipment == "Gauss Rifle")
        .expect("gauss rifle mounted");
    assert!(mount.split);
    // The arm is the more restrictive of the two locations.
    assert_eq!(mount.loc, Some(Loc::LeftArm));
    assert_eq!(mount.second_loc, Some(Loc::LeftTorso));
    assert_eq!(unit.mounts().filter(|(_, m)| m.equipment == "Gauss Rifle").count(), 1);
    let marker_count = [Loc::LeftArm, Loc::LeftTorso]
        .iter()
        .map(|&loc| {
            (0..unit.crit_capacity(loc))
                .filter(|&i| unit.get_critical(loc, i).and_then(|s| s.mount_id()) == Some(id))
                .count()
        })
        .sum::<usize>();
    assert_eq!(marker_count, 7);
}

#[test]
fn same_location_split_weapon_completes() {
    let unit = load();
    let (_, mount) = unit
        .mounts()
        .find(|(_, m)| m.equipment == "Autocannon/20")
        .expect("autocannon mounted");
    assert!(!mount.split);
    assert_eq!(mount.loc, Some(Loc::RightTorso));
    assert_eq!(mount.second_loc, None);
}

#[test]
fn spreadable_armor_shares_one_mount() {
    let unit = load();
    let ids: Vec<_> = (0..unit.crit_capacity(Loc::LeftTorso))
        .filter_map(|i| unit.get_critical(Loc::LeftTorso, i))
        .filter_map(|s| s.mount_id())
        .filter(|&id| unit.mount(id).equipment == "Ferro-Fibrous")
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|&id| id == ids[0]), "all markers share one mount");
    assert_eq!(unit.mounts().filter(|(_, m)| m.equipment == "Ferro-Fibrous").count(), 1);
}

#[test]
fn rear_mounted_weapon_carries_the_flag() {
    let unit = load();
    let slot = unit.get_critical(Loc::CenterTorso, 10).expect("slot 10 filled");
    let mount = unit.mount(slot.mount_id().expect("equipment slot"));
    assert_eq!(mount.equipment, "Medium Laser");
    assert!(mount.rear);
}

#[test]
fn fixed_systems_and_actuators_resolve() {
    let unit = load();
    assert!(matches!(
        unit.get_critical(Loc::CenterTorso, 0),
        Some(mekbay_data::unit::CritSlot::System { kind: SystemSlot::Engine, .. })
    ));
    assert!(matches!(
        unit.get_critical(Loc::CenterTorso, 3),
        Some(mekbay_data::unit::CritSlot::System { kind: SystemSlot::Gyro, .. })
    ));
    assert!(matches!(
        unit.get_critical(Loc::Head, 2),
        Some(mekbay_data::unit::CritSlot::System { kind: SystemSlot::Cockpit, .. })
    ));
    assert!(unit.has_system(Loc::LeftLeg, SystemSlot::Foot));
}

#[test]
fn engine_integrated_heat_sinks_fill_the_gap() {
    let unit = load();
    assert_eq!(unit.heat_sinks.kind, HeatSinkKind::Single);
    assert_eq!(unit.heat_sinks.expected, 12);
    // Four sinks sit in slots; the engine carries the other eight.
    assert_eq!(unit.heat_sinks.engine_integrated, 8);
    assert_eq!(unit.heat_sinks.base_chassis, None);
    let slotless_sinks = unit
        .mounts()
        .filter(|(_, m)| m.equipment == "Heat Sink" && m.loc.is_none())
        .count();
    assert_eq!(slotless_sinks, 8);
}

#[test]
fn quirks_and_fluff_survive() {
    let unit = load();
    assert!(unit.quirks.contains(&Quirk::Unit { name: "ext_twist".into() }));
    assert!(unit.quirks.contains(&Quirk::Weapon {
        name: "stable_weapon".into(),
        loc: Loc::CenterTorso,
        slot: 10,
        weapon: "Medium Laser".into(),
    }));
    assert!(unit.fluff.overview.contains("line holder"));
    assert_eq!(
        unit.fluff.system_manufacturers.get("CHASSIS").map(String::as_str),
        Some("Foundry Works Type 5")
    );
    assert_eq!(unit.fluff.system_models.get("ENGINE").map(String::as_str), Some("Core 250"));
}

#[test]
fn no_crit_equipment_is_mounted_without_slots() {
    let unit = load();
    let (_, case) = unit
        .mounts()
        .find(|(_, m)| m.equipment == "CASE")
        .expect("no-crit CASE mounted");
    assert_eq!(case.loc, Some(Loc::LeftTorso));
    let case_markers = (0..unit.crit_capacity(Loc::LeftTorso))
        .filter_map(|i| unit.get_critical(Loc::LeftTorso, i))
        .filter_map(|s| s.mount_id())
        .filter(|&id| unit.mount(id).equipment == "CASE")
        .count();
    assert_eq!(case_markers, 0);
}

#[test]
fn nothing_fails_on_a_well_formed_sheet() {
    let unit = load();
    assert!(unit.failed_equipment.is_empty(), "failed: {:?}", unit.failed_equipment);
}

#[test]
fn reparsing_is_idempotent() {
    let catalog = catalog_from_toml(CATALOG).unwrap();
    let first = parse_unit(SHEET, &catalog).unwrap();
    let second = parse_unit(SHEET, &catalog).unwrap();
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}
