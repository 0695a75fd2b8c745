//! Focused resolver and deriver behaviors on small inline sheets.

use mekbay_data::equipment::{Catalog, HeatSinkKind, TechBase};
use mekbay_data::loc::Loc;
use mekbay_data::unit::{Facing, SystemSlot, TechLevel, Unit};
use mekbay_loader::{catalog_from_toml, parse_unit};

fn catalog() -> Catalog {
    catalog_from_toml(include_str!("fixtures/catalog.toml")).expect("catalog fixture parses")
}

fn biped_sheet(body: &str) -> String {
    format!(
        "Version:1.3\n\
         Testbed\n\
         TB-1\n\
         Config:Biped\n\
         techbase:Inner Sphere\n\
         era:3050\n\
         rules level:3\n\
         mass:55\n\
         engine:275 Fusion Engine\n\
         structure:IS Standard\n\
         heat sinks:10 Single\n\
         armor:Standard(Inner Sphere)\n\
         LA armor:10\n\
         RA armor:10\n\
         LT armor:12\n\
         RT armor:12\n\
         CT armor:14\n\
         HD armor:9\n\
         LL armor:12\n\
         RL armor:12\n\
         RTL armor:4\n\
         RTR armor:4\n\
         RTC armor:5\n\
         {body}"
    )
}

fn load_biped(body: &str) -> Unit {
    parse_unit(&biped_sheet(body), &catalog()).expect("sheet loads")
}

fn equipment_markers(unit: &Unit, loc: Loc, name: &str) -> Vec<usize> {
    (0..unit.crit_capacity(loc))
        .filter(|&i| {
            unit.get_critical(loc, i)
                .and_then(|s| s.mount_id())
                .is_some_and(|id| unit.mount(id).equipment == name)
        })
        .collect()
}

#[test]
fn advanced_rules_select_the_is_constant() {
    let unit = load_biped("");
    assert_eq!(unit.tech_level, TechLevel::Advanced(TechBase::InnerSphere));
}

#[test]
fn omnipod_suffix_sets_the_flag_and_strips_the_name() {
    let unit = load_biped("Left Torso:\nMedium Laser (OMNIPOD)\n");
    let (_, mount) = unit.mounts().find(|(_, m)| m.equipment == "Medium Laser").unwrap();
    assert!(mount.omnipod);
    assert_eq!(mount.equipment, "Medium Laser");
}

#[test]
fn clan_units_fall_back_to_prefixed_names() {
    let sheet = "Version:1.3\n\
                 Night Chanter\n\
                 Prime\n\
                 Config:Biped Omnimech\n\
                 techbase:Clan\n\
                 era:3052\n\
                 rules level:2\n\
                 mass:55\n\
                 engine:275 Fusion Engine\n\
                 structure:Clan Endo Steel\n\
                 heat sinks:10 Double\n\
                 base chassis heat sinks:12\n\
                 armor:Standard(Clan)\n\
                 LA armor:10\n\
                 RA armor:10\n\
                 LT armor:12\n\
                 RT armor:12\n\
                 CT armor:14\n\
                 HD armor:9\n\
                 LL armor:12\n\
                 RL armor:12\n\
                 RTL armor:4\n\
                 RTR armor:4\n\
                 RTC armor:5\n\
                 Left Torso:\n\
                 ER Medium Laser (OMNIPOD)\n\
                 Clan Double Heat Sink\n\
                 Clan Double Heat Sink\n";
    let unit = parse_unit(sheet, &catalog()).expect("clan sheet loads");
    assert!(unit.omni);
    let (_, laser) = unit
        .mounts()
        .find(|(_, m)| m.equipment == "Clan ER Medium Laser")
        .expect("bare name resolved through the Clan prefix");
    assert!(laser.omnipod);
    // One double sink sits in slots (two restated lines, one mount); the
    // other nine are engine-integrated clan doubles.
    assert_eq!(unit.heat_sinks.kind, HeatSinkKind::Double);
    assert_eq!(unit.heat_sinks.engine_integrated, 9);
    assert_eq!(unit.heat_sinks.base_chassis, Some(12));
    assert_eq!(
        unit.mounts()
            .filter(|(_, m)| m.equipment == "Clan Double Heat Sink" && m.loc.is_none())
            .count(),
        9
    );
}

#[test]
fn omni_base_chassis_count_falls_back_to_expected() {
    let sheet = biped_sheet("").replace("Config:Biped", "Config:Biped Omnimech");
    let unit = parse_unit(&sheet, &catalog()).unwrap();
    assert_eq!(unit.heat_sinks.base_chassis, Some(10));
}

#[test]
fn targeting_computer_mounts_once_unit_wide() {
    let unit = load_biped("Left Torso:\nTargeting Computer\nTargeting Computer\n");
    let computers: Vec<_> = unit.mounts().filter(|(_, m)| m.equipment == "Targeting Computer").collect();
    assert_eq!(computers.len(), 1);
    assert_eq!(computers[0].1.loc, None);
    assert_eq!(equipment_markers(&unit, Loc::LeftTorso, "Targeting Computer"), vec![0, 1]);
}

#[test]
fn sized_equipment_claims_its_footprint() {
    let unit = load_biped("Left Torso:\nCargo:SIZE:2.5\nCargo:SIZE:2.5\nCargo:SIZE:2.5\n");
    let cargo: Vec<_> = unit.mounts().filter(|(_, m)| m.equipment == "Cargo").collect();
    assert_eq!(cargo.len(), 1);
    assert_eq!(cargo[0].1.size, 2.5);
    assert_eq!(equipment_markers(&unit, Loc::LeftTorso, "Cargo"), vec![0, 1, 2]);
    assert!(unit.get_critical(Loc::LeftTorso, 3).is_none());
}

#[test]
fn grenade_launcher_facing_codes() {
    let unit = load_biped(
        "Right Torso:\n\
         Vehicular Grenade Launcher (FL)\n\
         Vehicular Grenade Launcher (R)\n\
         Vehicular Grenade Launcher\n",
    );
    let facings: Vec<Facing> = (0..3)
        .map(|i| {
            let slot = unit.get_critical(Loc::RightTorso, i).unwrap();
            unit.mount(slot.mount_id().unwrap()).facing
        })
        .collect();
    assert_eq!(facings, vec![Facing::FrontLeft, Facing::Rear, Facing::Front]);
}

#[test]
fn unknown_names_soft_fail_and_compact() {
    let unit = load_biped("Left Torso:\nMedium Laser\nPhantom Blaster\nSmall Laser\n");
    assert_eq!(unit.failed_equipment, vec!["Phantom Blaster".to_string()]);
    // Compaction pulls the small laser into the failed slot.
    assert_eq!(equipment_markers(&unit, Loc::LeftTorso, "Small Laser"), vec![1]);
    assert!(unit.get_critical(Loc::LeftTorso, 2).is_none());
}

#[test]
fn combined_ammo_of_one_category_shares_a_slot() {
    let unit = load_biped("Left Torso:\nIS Ammo LRM-15|IS Ammo LRM-20\n");
    let slot = unit.get_critical(Loc::LeftTorso, 0).expect("slot filled");
    assert_eq!(unit.mount(slot.mount_id().unwrap()).equipment, "IS Ammo LRM-15");
    assert!(unit.mounts().any(|(_, m)| m.equipment == "IS Ammo LRM-20"));
    assert!(unit.get_critical(Loc::LeftTorso, 1).is_none());
}

#[test]
fn combined_heat_sinks_share_a_slot() {
    let unit = load_biped("Left Torso:\nHeat Sink|Heat Sink\n");
    let slotted = unit
        .mounts()
        .filter(|(_, m)| m.equipment == "Heat Sink" && m.loc == Some(Loc::LeftTorso))
        .count();
    assert_eq!(slotted, 2);
}

#[test]
fn incompatible_combined_slot_is_fatal() {
    let result = parse_unit(&biped_sheet("Left Torso:\nIS Ammo AC/20|IS Ammo LRM-15\n"), &catalog());
    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("cannot combine"), "unexpected error: {err}");
}

#[test]
fn clan_tech_base_rejects_introductory_rules() {
    let sheet = biped_sheet("")
        .replace("techbase:Inner Sphere", "techbase:Clan")
        .replace("rules level:3", "rules level:1");
    let err = format!("{:#}", parse_unit(&sheet, &catalog()).unwrap_err());
    assert!(err.contains("rules level 1"), "unexpected error: {err}");
}

#[test]
fn bare_mixed_tech_base_is_fatal() {
    let sheet = biped_sheet("").replace("techbase:Inner Sphere", "techbase:Mixed");
    let err = format!("{:#}", parse_unit(&sheet, &catalog()).unwrap_err());
    assert!(err.contains("Mixed"), "unexpected error: {err}");
}

#[test]
fn mixed_chassis_uses_its_column() {
    let sheet = biped_sheet("").replace("techbase:Inner Sphere", "techbase:Mixed (Clan Chassis)");
    let unit = parse_unit(&sheet, &catalog()).unwrap();
    assert!(unit.mixed_tech);
    assert_eq!(unit.tech_level, TechLevel::Advanced(TechBase::Clan));
}

#[test]
fn sheets_without_a_version_directive_fail() {
    let sheet = biped_sheet("").replace("Version:1.3\nTestbed\nTB-1\n", "chassis:Testbed\n");
    let err = format!("{:#}", parse_unit(&sheet, &catalog()).unwrap_err());
    assert!(err.contains("version"), "unexpected error: {err}");
}

#[test]
fn quad_limbs_keep_their_leg_actuators() {
    let body = "Front Left Leg:\n\
                Hip\n\
                Upper Leg Actuator\n\
                Lower Leg Actuator\n\
                Foot Actuator\n\
                Medium Laser\n";
    let sheet = biped_sheet(body).replace("Config:Biped", "Config:Quad");
    let unit = parse_unit(&sheet, &catalog()).unwrap();
    assert!(unit.has_system(Loc::LeftArm, SystemSlot::Hip));
    // Slot 3 reads "Foot Actuator", not "Hand Actuator"; on a quad that
    // must not trigger arm actuator removal.
    assert!(unit.has_system(Loc::LeftArm, SystemSlot::Foot));
    assert_eq!(equipment_markers(&unit, Loc::LeftArm, "Medium Laser"), vec![4]);
}

#[test]
fn tripod_center_leg_carries_armor() {
    let sheet = "Version:1.3\n\
                 Testbed\n\
                 TB-3L\n\
                 Config:Tripod\n\
                 techbase:Inner Sphere\n\
                 era:3070\n\
                 rules level:3\n\
                 mass:90\n\
                 engine:360 Fusion Engine\n\
                 structure:IS Standard\n\
                 heat sinks:10 Single\n\
                 armor:Standard(Inner Sphere)\n\
                 LA armor:20\n\
                 RA armor:20\n\
                 LT armor:22\n\
                 RT armor:22\n\
                 CT armor:30\n\
                 HD armor:9\n\
                 LL armor:24\n\
                 RL armor:24\n\
                 CL armor:18\n\
                 RTL armor:8\n\
                 RTR armor:8\n\
                 RTC armor:10\n\
                 Center Leg:\n\
                 Hip\n\
                 Upper Leg Actuator\n\
                 Lower Leg Actuator\n\
                 Foot Actuator\n";
    let unit = parse_unit(sheet, &catalog()).expect("tripod sheet loads");
    assert_eq!(unit.armor_value(Loc::CenterLeg), Some(18));
    assert_eq!(unit.rear_armor_value(Loc::CenterTorso), Some(10));
    assert!(unit.has_system(Loc::CenterLeg, SystemSlot::Hip));
}

#[test]
fn patchwork_armor_types_each_location() {
    let sheet = biped_sheet("")
        .replace("armor:Standard(Inner Sphere)", "armor:Patchwork")
        .replace("LA armor:10", "LA armor:Ferro-Fibrous(Clan):10")
        .replace("RA armor:10", "RA armor:Standard(Inner Sphere):10")
        .replace("LT armor:12", "LT armor:Standard(Inner Sphere):12")
        .replace("RT armor:12", "RT armor:Standard(Inner Sphere):12")
        .replace("CT armor:14", "CT armor:Standard(Inner Sphere):14")
        .replace("HD armor:9", "HD armor:Standard(Inner Sphere):9")
        .replace("LL armor:12", "LL armor:Standard(Inner Sphere):12")
        .replace("RL armor:12", "RL armor:Standard(Inner Sphere):12");
    let unit = parse_unit(&sheet, &catalog()).expect("patchwork sheet loads");
    assert!(unit.armor.patchwork);
    assert_eq!(unit.armor_value(Loc::LeftArm), Some(10));
    let (kind, level) = unit.armor.patchwork_types.get(&Loc::LeftArm).expect("typed entry");
    assert_eq!(kind, "Ferro-Fibrous");
    assert_eq!(*level, TechLevel::Advanced(TechBase::Clan));
    let (_, head_level) = unit.armor.patchwork_types.get(&Loc::Head).unwrap();
    assert_eq!(*head_level, TechLevel::Advanced(TechBase::InnerSphere));
}
