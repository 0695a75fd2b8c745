//! Second-stage parse: resolve raw critical-slot text into equipment.
//!
//! Each location's grid row is walked slot by slot. A slot string is
//! normalized (modifier suffixes peeled off in a fixed order), matched
//! against the fixed structural components, and otherwise resolved through
//! the catalog into one of several mounting strategies: shared/spreadable
//! gear, targeting computers, cross-location split weapons, combined
//! two-name slots, and plain or variable-size equipment. Names the catalog
//! does not know soft-fail: they are recorded on the unit, the cell is
//! blanked, the row is compacted, and the same slot index is retried.

use std::collections::HashMap;

use anyhow::{Result, bail};
use lazy_static::lazy_static;
use log::{debug, warn};

use mekbay_data::equipment::{Catalog, EquipmentDef, TechBase};
use mekbay_data::loc::{ALL_LOCS, Loc};
use mekbay_data::unit::{CritSlot, Facing, Mount, MountId, SystemSlot, Unit};

use crate::sheet::{EMPTY, GRID_COLS, RawSheet};

lazy_static! {
    /// Names that resolve directly to fixed system-component markers.
    static ref FIXED_SYSTEMS: HashMap<&'static str, SystemSlot> = HashMap::from([
        ("FUSION ENGINE", SystemSlot::Engine),
        ("ENGINE", SystemSlot::Engine),
        ("LIFE SUPPORT", SystemSlot::LifeSupport),
        ("SENSORS", SystemSlot::Sensors),
        ("COCKPIT", SystemSlot::Cockpit),
        ("GYRO", SystemSlot::Gyro),
        ("LANDING GEAR", SystemSlot::LandingGear),
        ("AVIONICS", SystemSlot::Avionics),
    ]);

    /// Actuator names whose slots already exist; the sheet line only
    /// carries the armored flag.
    static ref ACTUATORS: HashMap<&'static str, SystemSlot> = HashMap::from([
        ("SHOULDER", SystemSlot::Shoulder),
        ("UPPER ARM ACTUATOR", SystemSlot::UpperArm),
        ("LOWER ARM ACTUATOR", SystemSlot::LowerArm),
        ("HAND ACTUATOR", SystemSlot::Hand),
        ("HIP", SystemSlot::Hip),
        ("UPPER LEG ACTUATOR", SystemSlot::UpperLeg),
        ("LOWER LEG ACTUATOR", SystemSlot::LowerLeg),
        ("FOOT ACTUATOR", SystemSlot::Foot),
    ]);
}

/// Flags and size peeled off one raw slot string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotToken {
    pub name: String,
    pub armored: bool,
    pub size: Option<f64>,
    pub omnipod: bool,
    pub turreted: bool,
    pub rear: bool,
    pub facing: Option<Facing>,
}

/// Strip the modifier suffixes off a slot string, in their fixed order.
///
/// The size annotation must be peeled before the pod/turret/rear/facing
/// suffixes; only one facing code can match.
pub fn tokenize_slot(raw: &str) -> SlotToken {
    let mut text = raw.trim().to_string();
    let armored = strip_suffix_ci(&mut text, "(ARMORED)");
    let size = strip_size_suffix(&mut text);
    let omnipod = strip_suffix_ci(&mut text, "(OMNIPOD)");
    let turreted = strip_suffix_ci(&mut text, "(T)");
    let rear = strip_suffix_ci(&mut text, "(R)");
    let _ = strip_suffix_ci(&mut text, "(SPLIT)");
    let mut facing = None;
    for (code, direction) in [
        ("(FL)", Facing::FrontLeft),
        ("(FR)", Facing::FrontRight),
        ("(RL)", Facing::RearLeft),
        ("(RR)", Facing::RearRight),
    ] {
        if strip_suffix_ci(&mut text, code) {
            facing = Some(direction);
            break;
        }
    }
    SlotToken {
        name: text,
        armored,
        size,
        omnipod,
        turreted,
        rear,
        facing,
    }
}

fn strip_suffix_ci(text: &mut String, suffix: &str) -> bool {
    let Some(start) = text.len().checked_sub(suffix.len()) else {
        return false;
    };
    if text.get(start..).is_some_and(|tail| tail.eq_ignore_ascii_case(suffix)) {
        text.truncate(start);
        while text.ends_with(' ') {
            text.pop();
        }
        true
    } else {
        false
    }
}

fn strip_size_suffix(text: &mut String) -> Option<f64> {
    let upper = text.to_ascii_uppercase();
    let at = upper.rfind(":SIZE:")?;
    let size: f64 = text[at + ":SIZE:".len()..].trim().parse().ok()?;
    text.truncate(at);
    while text.ends_with(' ') {
        text.pop();
    }
    Some(size)
}

/// A split-capable mount still waiting for the rest of its slots.
#[derive(Debug)]
struct PendingSplit {
    mount: MountId,
    equipment: String,
    required: usize,
    found: usize,
}

/// Two locations may share a split mount when they are the same or one is
/// the next location inward from the other (which also pairs the head
/// with the center torso).
fn split_compatible(a: Loc, b: Loc) -> bool {
    a == b || a.inner() == b || b.inner() == a
}

/// Resolver state for one parse: the shared-equipment map and the pending
/// split list both live exactly as long as the sheet being resolved.
pub struct CritResolver<'a> {
    catalog: &'a Catalog,
    shared: HashMap<String, MountId>,
    pending: Vec<PendingSplit>,
}

impl<'a> CritResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> CritResolver<'a> {
        CritResolver {
            catalog,
            shared: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Resolve every location present on the chassis, highest system
    /// index first, so arm actuator removal precedes any merge into an
    /// arm from a torso row.
    pub fn resolve_all(&mut self, unit: &mut Unit, sheet: &mut RawSheet) -> Result<()> {
        for &loc in ALL_LOCS.iter().rev() {
            if loc == Loc::CenterLeg && !unit.config.has_center_leg() {
                continue;
            }
            self.resolve_location(unit, sheet, loc)?;
        }
        for entry in &self.pending {
            warn!(
                "split equipment '{}' resolved only {}/{} slots",
                entry.equipment, entry.found, entry.required
            );
        }
        Ok(())
    }

    /// Resolve one location's grid row.
    pub fn resolve_location(&mut self, unit: &mut Unit, sheet: &mut RawSheet, loc: Loc) -> Result<()> {
        self.check_arm_actuators(unit, sheet, loc);
        let capacity = unit.crit_capacity(loc).min(GRID_COLS);
        let mut index = 0;
        // Retry bound: compaction shrinks the row on every soft failure,
        // but the loop must stay bounded even if it ever stopped doing so.
        let mut retries_left = capacity;
        while index < capacity {
            let raw = sheet.grid_row(loc)[index].clone();
            if raw.is_empty() || raw.eq_ignore_ascii_case(EMPTY) {
                index += 1;
                continue;
            }
            let token = tokenize_slot(&raw);
            let upper = token.name.to_ascii_uppercase();

            if let Some(&kind) = FIXED_SYSTEMS.get(upper.as_str()) {
                unit.set_critical(loc, index, Some(CritSlot::System { kind, armored: token.armored }));
                index += 1;
                continue;
            }
            if ACTUATORS.contains_key(upper.as_str()) {
                if let Some(slot) = unit.get_critical_mut(loc, index) {
                    slot.set_armored(token.armored);
                } else {
                    warn!("'{}' names no existing slot {} in {:?}", token.name, index, loc);
                }
                index += 1;
                continue;
            }
            // Already placed by a split merge or a multi-slot footprint.
            if unit.get_critical(loc, index).is_some() {
                index += 1;
                continue;
            }

            let (first_name, second_name) = match token.name.split_once('|') {
                Some((a, b)) => (a.trim(), Some(b.trim())),
                None => (token.name.as_str(), None),
            };
            let first = self.lookup(unit, first_name);
            let second = second_name.map(|n| self.lookup(unit, n));

            let resolved = match (first, second) {
                (Some(first), None) => {
                    self.mount_dispatch(unit, loc, index, &first, None, &token)?;
                    true
                },
                (Some(first), Some(Some(second))) => {
                    self.mount_dispatch(unit, loc, index, &first, Some(&second), &token)?;
                    true
                },
                _ => false,
            };
            if resolved {
                index += 1;
                continue;
            }

            // Soft failure: record, blank the cell, compact, retry here.
            warn!("unrecognized equipment '{}' in {:?} slot {}", token.name, loc, index);
            unit.add_failed_equipment(&token.name);
            let row = sheet.grid_row_mut(loc);
            row[index] = EMPTY.to_string();
            compact_row(row);
            if retries_left == 0 {
                index += 1;
            } else {
                retries_left -= 1;
            }
        }
        Ok(())
    }

    /// Arms carry their lower-arm and hand actuators implicitly; a sheet
    /// that does not restate them at slots 2 and 3 has removed them.
    fn check_arm_actuators(&self, unit: &mut Unit, sheet: &RawSheet, loc: Loc) {
        if !loc.is_arm() || unit.config.arms_are_legs() {
            return;
        }
        let row = sheet.grid_row(loc);
        if !tokenize_slot(&row[3]).name.eq_ignore_ascii_case("Hand Actuator") {
            unit.remove_system_crits(loc, SystemSlot::Hand);
        }
        if !tokenize_slot(&row[2]).name.eq_ignore_ascii_case("Lower Arm Actuator") {
            unit.remove_system_crits(loc, SystemSlot::LowerArm);
        }
    }

    fn lookup(&self, unit: &Unit, name: &str) -> Option<EquipmentDef> {
        lookup_with_fallback(self.catalog, unit.tech_base, name)
    }

    /// Mutually exclusive mounting strategies, in priority order.
    fn mount_dispatch(
        &mut self,
        unit: &mut Unit,
        loc: Loc,
        index: usize,
        first: &EquipmentDef,
        second: Option<&EquipmentDef>,
        token: &SlotToken,
    ) -> Result<()> {
        if first.spreadable {
            self.mount_shared(unit, loc, index, first, token, false);
        } else if first.targeting_computer {
            self.mount_shared(unit, loc, index, first, token, true);
        } else if first.splitable {
            self.mount_split(unit, loc, index, first, token);
        } else if let Some(second) = second {
            self.mount_combined(unit, loc, index, first, second, token)?;
        } else {
            mount_plain(unit, loc, index, first, token);
        }
        Ok(())
    }

    /// Spreadable gear and targeting computers: one mount per equipment
    /// type, every slot a marker back to it. Targeting computers have no
    /// slot home of their own; their mount is unit-wide.
    fn mount_shared(&mut self, unit: &mut Unit, loc: Loc, index: usize, def: &EquipmentDef, token: &SlotToken, unit_wide: bool) {
        let id = match self.shared.get(&def.name) {
            Some(&id) => id,
            None => {
                let home = if unit_wide { None } else { Some(loc) };
                let id = unit.add_equipment(&def.name, home, token.rear);
                apply_mount_flags(unit.mount_mut(id), def, token);
                self.shared.insert(def.name.clone(), id);
                id
            },
        };
        unit.add_critical(loc, CritSlot::Equipment { mount: id, armored: token.armored }, Some(index));
    }

    /// Split-capable equipment accumulates found slots across up to two
    /// compatible locations; the more restrictive location becomes the
    /// mount's primary once it straddles both.
    fn mount_split(&mut self, unit: &mut Unit, loc: Loc, index: usize, def: &EquipmentDef, token: &SlotToken) {
        let step = if unit.superheavy() { 2 } else { 1 };
        let existing = self.pending.iter().position(|p| {
            p.equipment == def.name
                && unit.mount(p.mount).loc.is_some_and(|mount_loc| split_compatible(mount_loc, loc))
        });
        match existing {
            Some(i) => {
                let entry = &mut self.pending[i];
                entry.found += step;
                let id = entry.mount;
                let complete = entry.found >= entry.required;
                if complete {
                    debug!("split '{}' complete with {} slots", entry.equipment, entry.found);
                    self.pending.remove(i);
                }
                let mount = unit.mount_mut(id);
                let current = mount.loc.expect("split mount always has a location");
                if current != loc {
                    let (primary, secondary) = if loc.restrictiveness() > current.restrictiveness() {
                        (loc, current)
                    } else {
                        (current, loc)
                    };
                    mount.loc = Some(primary);
                    mount.second_loc = Some(secondary);
                    mount.split = true;
                }
                unit.add_critical(loc, CritSlot::Equipment { mount: id, armored: token.armored }, Some(index));
            },
            None => {
                let id = unit.add_equipment(&def.name, Some(loc), token.rear);
                apply_mount_flags(unit.mount_mut(id), def, token);
                let required = def.criticals(token.size.unwrap_or(0.0), unit.superheavy());
                unit.add_critical(loc, CritSlot::Equipment { mount: id, armored: token.armored }, Some(index));
                if step < required {
                    self.pending.push(PendingSplit {
                        mount: id,
                        equipment: def.name.clone(),
                        required,
                        found: step,
                    });
                }
            },
        }
    }

    /// A `|`-combined slot co-mounts two pieces of gear in one physical
    /// slot: two ammo bins of the same category, or two heat sinks.
    fn mount_combined(
        &mut self,
        unit: &mut Unit,
        loc: Loc,
        index: usize,
        first: &EquipmentDef,
        second: &EquipmentDef,
        token: &SlotToken,
    ) -> Result<()> {
        let compatible = match (&first.ammo, &second.ammo) {
            (Some(a), Some(b)) => a == b,
            _ => first.heat_sink.is_some() && second.heat_sink.is_some(),
        };
        if !compatible {
            bail!(
                "cannot combine '{}' and '{}' in one slot: need matching ammo or two heat sinks",
                first.name,
                second.name
            );
        }
        let id = unit.add_equipment(&first.name, Some(loc), token.rear);
        apply_mount_flags(unit.mount_mut(id), first, token);
        unit.add_critical(loc, CritSlot::Equipment { mount: id, armored: token.armored }, Some(index));
        // The second item shares the slot; it gets a mount but no marker.
        let partner = unit.add_equipment(&second.name, Some(loc), token.rear);
        apply_mount_flags(unit.mount_mut(partner), second, token);
        Ok(())
    }
}

/// Catalog lookup with the tech-base-prefixed fallback: a name the
/// catalog does not know is retried as `IS <name>` or `Clan <name>`
/// depending on the unit's own base.
pub(crate) fn lookup_with_fallback(catalog: &Catalog, base: TechBase, name: &str) -> Option<EquipmentDef> {
    catalog
        .lookup(name)
        .cloned()
        .or_else(|| catalog.lookup(&format!("{} {}", base.name_prefix(), name)).cloned())
}

/// Ordinary single-slot or variable-size equipment.
fn mount_plain(unit: &mut Unit, loc: Loc, index: usize, def: &EquipmentDef, token: &SlotToken) {
    let size = if def.variable_size {
        token.size.unwrap_or_else(|| def.size_from_name(&token.name))
    } else {
        token.size.unwrap_or(0.0)
    };
    let id = unit.add_equipment(&def.name, Some(loc), token.rear);
    let mount = unit.mount_mut(id);
    apply_mount_flags(mount, def, token);
    mount.size = size;
    let marker = CritSlot::Equipment { mount: id, armored: token.armored };
    unit.add_critical(loc, marker, Some(index));
    // Fixed multi-slot and sized equipment claims its whole footprint
    // here; the sheet restates the name on each line and the
    // already-placed guard skips the rest.
    let needed = def.criticals(size, unit.superheavy());
    for offset in 1..needed {
        if unit.add_critical(loc, marker, Some(index + offset)).is_none() {
            warn!("'{}' footprint overruns {:?} at slot {}", def.name, loc, index + offset);
            break;
        }
    }
}

fn apply_mount_flags(mount: &mut Mount, def: &EquipmentDef, token: &SlotToken) {
    mount.armored = token.armored;
    mount.turreted = token.turreted;
    mount.omnipod = token.omnipod;
    if def.grenade_launcher {
        mount.facing = token.facing.unwrap_or(if token.rear { Facing::Rear } else { Facing::Front });
    }
}

/// Shift non-empty entries up; the tail becomes empty-slot markers.
pub(crate) fn compact_row(row: &mut [String]) {
    let kept: Vec<String> = row
        .iter()
        .filter(|cell| !cell.is_empty() && !cell.eq_ignore_ascii_case(EMPTY))
        .cloned()
        .collect();
    for (i, cell) in row.iter_mut().enumerate() {
        *cell = kept.get(i).cloned().unwrap_or_else(|| EMPTY.to_string());
    }
}
