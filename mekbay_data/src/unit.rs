//! The assembled combat unit and the narrow mutation contract the loader
//! uses to populate it.
//!
//! A [`Unit`] is created as an empty shell for a chassis configuration and
//! then filled in: scalar setters for the header fields, armor
//! initialization per location, and the critical-slot/mount contract for
//! equipment. Mounts live in an arena on the unit; a [`MountId`] is the
//! stable identity that critical slots refer back to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::equipment::{HeatSinkKind, TechBase};
use crate::loc::{ChassisConfig, Loc, ALL_LOCS};

/// Technology tier a unit is built to, derived from tech base and rules
/// level. Introductory rules exist only for Inner Sphere designs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechLevel {
    Introductory,
    Standard(TechBase),
    Advanced(TechBase),
    Experimental(TechBase),
    Unofficial(TechBase),
}

impl Default for TechLevel {
    fn default() -> Self {
        TechLevel::Standard(TechBase::InnerSphere)
    }
}

/// Fixed structural components that occupy critical slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemSlot {
    Engine,
    LifeSupport,
    Sensors,
    Cockpit,
    Gyro,
    LandingGear,
    Avionics,
    Shoulder,
    UpperArm,
    LowerArm,
    Hand,
    Hip,
    UpperLeg,
    LowerLeg,
    Foot,
}

/// One occupied critical slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CritSlot {
    System { kind: SystemSlot, armored: bool },
    Equipment { mount: MountId, armored: bool },
}

impl CritSlot {
    pub fn set_armored(&mut self, flag: bool) {
        match self {
            CritSlot::System { armored, .. } | CritSlot::Equipment { armored, .. } => *armored = flag,
        }
    }

    pub fn mount_id(&self) -> Option<MountId> {
        match self {
            CritSlot::Equipment { mount, .. } => Some(*mount),
            CritSlot::System { .. } => None,
        }
    }
}

/// Weapon facing for turret-less directional weapons.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Front,
    FrontRight,
    RearRight,
    Rear,
    RearLeft,
    FrontLeft,
}

/// Identity of one mounted piece of equipment; an index into the unit's
/// mount arena. Two slots referring to the same `MountId` share one
/// functional item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MountId(pub usize);

/// One mounted piece of equipment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mount {
    /// Canonical catalog name of the mounted equipment.
    pub equipment: String,
    /// Primary location; `None` for unit-wide gear without a slot home.
    pub loc: Option<Loc>,
    /// Second location of a split mount.
    pub second_loc: Option<Loc>,
    pub rear: bool,
    pub armored: bool,
    pub turreted: bool,
    pub omnipod: bool,
    pub split: bool,
    pub facing: Facing,
    /// Size attribute of variable-size equipment; 0 when not applicable.
    pub size: f64,
}

/// Engine specification from the sheet header.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub rating: u32,
    pub kind: String,
}

/// Heat-sink bookkeeping derived from the sheet header.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatSinks {
    pub kind: HeatSinkKind,
    /// Sinks the sheet declares in total.
    pub expected: u32,
    /// Sinks integrated into the engine rather than mounted in slots.
    pub engine_integrated: u32,
    /// Omni-pod base chassis heat-sink count, when declared.
    pub base_chassis: Option<u32>,
}

/// A design quirk attached to the unit or to one mounted weapon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quirk {
    Unit { name: String },
    Weapon { name: String, loc: Loc, slot: usize, weapon: String },
}

/// Free-text description blocks and manufacturer metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fluff {
    pub overview: String,
    pub capabilities: String,
    pub deployment: String,
    pub history: String,
    pub manufacturer: String,
    pub primary_factory: String,
    pub notes: String,
    pub system_manufacturers: BTreeMap<String, String>,
    pub system_models: BTreeMap<String, String>,
    /// Opaque encoded image blobs, stored verbatim.
    pub fluff_image: Option<String>,
    pub icon: Option<String>,
}

/// Armor configuration for the unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorConfig {
    pub kind: String,
    /// Unit-wide armor tech level; ignored for patchwork.
    pub tech_level: Option<TechLevel>,
    pub patchwork: bool,
    /// Per-location armor kind and tech level, patchwork only.
    pub patchwork_types: BTreeMap<Loc, (String, TechLevel)>,
}

/// A fully assembled combat unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub chassis: String,
    pub clan_chassis_name: Option<String>,
    pub model: String,
    pub mul_id: Option<u32>,
    pub config: ChassisConfig,
    pub omni: bool,
    pub tonnage: f64,
    pub year: u32,
    pub source: String,
    pub role: Option<String>,
    pub bv: Option<u32>,
    pub tech_base: TechBase,
    pub mixed_tech: bool,
    pub tech_level: TechLevel,
    pub engine: Engine,
    pub structure: String,
    pub gyro: String,
    pub cockpit: String,
    pub ejection: Option<String>,
    pub heat_sinks: HeatSinks,
    pub jump_mp: u32,
    pub armor: ArmorConfig,
    armor_front: [Option<u16>; 9],
    armor_rear: [Option<u16>; 3],
    crits: Vec<Vec<Option<CritSlot>>>,
    mounts: Vec<Mount>,
    pub failed_equipment: Vec<String>,
    pub quirks: Vec<Quirk>,
    pub fluff: Fluff,
}

impl Unit {
    /// Create an empty shell for the given chassis.
    ///
    /// The catalog-default actuators are pre-populated so the loader can
    /// remove or armor them as the sheet dictates: shoulder/arm/hand in
    /// biped-style arms, hip/leg/foot in legs, and leg actuators in all
    /// four limbs of quad-style chassis.
    pub fn new(config: ChassisConfig, tonnage: f64) -> Unit {
        let crits = ALL_LOCS.iter().map(|loc| vec![None; loc.crit_capacity()]).collect();
        let mut unit = Unit {
            chassis: String::new(),
            clan_chassis_name: None,
            model: String::new(),
            mul_id: None,
            config,
            omni: false,
            tonnage,
            year: 0,
            source: String::new(),
            role: None,
            bv: None,
            tech_base: TechBase::InnerSphere,
            mixed_tech: false,
            tech_level: TechLevel::default(),
            engine: Engine::default(),
            structure: String::new(),
            gyro: String::new(),
            cockpit: String::new(),
            ejection: None,
            heat_sinks: HeatSinks::default(),
            jump_mp: 0,
            armor: ArmorConfig::default(),
            armor_front: [None; 9],
            armor_rear: [None; 3],
            crits,
            mounts: Vec::new(),
            failed_equipment: Vec::new(),
            quirks: Vec::new(),
            fluff: Fluff::default(),
        };
        unit.install_default_actuators();
        unit
    }

    fn install_default_actuators(&mut self) {
        let arm_kinds: [SystemSlot; 4] = if self.config.arms_are_legs() {
            [SystemSlot::Hip, SystemSlot::UpperLeg, SystemSlot::LowerLeg, SystemSlot::Foot]
        } else {
            [SystemSlot::Shoulder, SystemSlot::UpperArm, SystemSlot::LowerArm, SystemSlot::Hand]
        };
        let leg_kinds = [SystemSlot::Hip, SystemSlot::UpperLeg, SystemSlot::LowerLeg, SystemSlot::Foot];
        for arm in [Loc::LeftArm, Loc::RightArm] {
            for (i, kind) in arm_kinds.iter().enumerate() {
                self.crits[arm.index()][i] = Some(CritSlot::System { kind: *kind, armored: false });
            }
        }
        let mut legs = vec![Loc::LeftLeg, Loc::RightLeg];
        if self.config.has_center_leg() {
            legs.push(Loc::CenterLeg);
        }
        for leg in legs {
            for (i, kind) in leg_kinds.iter().enumerate() {
                self.crits[leg.index()][i] = Some(CritSlot::System { kind: *kind, armored: false });
            }
        }
    }

    /// Super-heavy chassis pack two items into each critical slot.
    pub fn superheavy(&self) -> bool {
        self.tonnage > 100.0
    }

    pub fn crit_capacity(&self, loc: Loc) -> usize {
        self.crits[loc.index()].len()
    }

    pub fn get_critical(&self, loc: Loc, index: usize) -> Option<&CritSlot> {
        self.crits[loc.index()].get(index).and_then(|s| s.as_ref())
    }

    pub fn get_critical_mut(&mut self, loc: Loc, index: usize) -> Option<&mut CritSlot> {
        self.crits[loc.index()].get_mut(index).and_then(|s| s.as_mut())
    }

    /// Overwrite one critical slot.
    pub fn set_critical(&mut self, loc: Loc, index: usize, slot: Option<CritSlot>) {
        if let Some(cell) = self.crits[loc.index()].get_mut(index) {
            *cell = slot;
        }
    }

    /// Place a slot marker at the given index, or at the first free slot
    /// when no index is given. Returns the index used, or `None` when the
    /// requested cell is taken or the location is full.
    pub fn add_critical(&mut self, loc: Loc, slot: CritSlot, index: Option<usize>) -> Option<usize> {
        let row = &mut self.crits[loc.index()];
        let target = match index {
            Some(i) => {
                if row.get(i)?.is_some() {
                    return None;
                }
                i
            },
            None => row.iter().position(Option::is_none)?,
        };
        row[target] = Some(slot);
        Some(target)
    }

    /// Clear every slot in `loc` holding the given system component.
    pub fn remove_system_crits(&mut self, loc: Loc, kind: SystemSlot) {
        for cell in &mut self.crits[loc.index()] {
            if matches!(cell, Some(CritSlot::System { kind: k, .. }) if *k == kind) {
                *cell = None;
            }
        }
    }

    pub fn has_system(&self, loc: Loc, kind: SystemSlot) -> bool {
        self.crits[loc.index()]
            .iter()
            .any(|cell| matches!(cell, Some(CritSlot::System { kind: k, .. }) if *k == kind))
    }

    /// Register a new mount; critical slots referring to it are added
    /// separately through [`Unit::add_critical`].
    pub fn add_equipment(&mut self, equipment: &str, loc: Option<Loc>, rear: bool) -> MountId {
        let id = MountId(self.mounts.len());
        self.mounts.push(Mount {
            equipment: equipment.to_string(),
            loc,
            second_loc: None,
            rear,
            armored: false,
            turreted: false,
            omnipod: false,
            split: false,
            facing: Facing::default(),
            size: 0.0,
        });
        id
    }

    pub fn mount(&self, id: MountId) -> &Mount {
        &self.mounts[id.0]
    }

    pub fn mount_mut(&mut self, id: MountId) -> &mut Mount {
        &mut self.mounts[id.0]
    }

    pub fn mounts(&self) -> impl Iterator<Item = (MountId, &Mount)> {
        self.mounts.iter().enumerate().map(|(i, m)| (MountId(i), m))
    }

    /// Record an armor value for a location's front or rear face.
    pub fn initialize_armor(&mut self, value: u16, loc: Loc, rear: bool) {
        if rear {
            if let Some(i) = crate::loc::REAR_LOCATION_ORDER.iter().position(|&l| l == loc) {
                self.armor_rear[i] = Some(value);
            }
        } else {
            self.armor_front[loc.index()] = Some(value);
        }
    }

    pub fn armor_value(&self, loc: Loc) -> Option<u16> {
        self.armor_front[loc.index()]
    }

    pub fn rear_armor_value(&self, loc: Loc) -> Option<u16> {
        crate::loc::REAR_LOCATION_ORDER
            .iter()
            .position(|&l| l == loc)
            .and_then(|i| self.armor_rear[i])
    }

    /// Record an equipment name the loader could not resolve.
    pub fn add_failed_equipment(&mut self, name: &str) {
        self.failed_equipment.push(name.to_string());
    }
}
