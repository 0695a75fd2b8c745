//! Assembly of a [`Unit`] from a classified sheet.
//!
//! The builder validates the header, derives the tech configuration,
//! constructs the unit shell, and then runs the critical-slot resolver
//! and the armor/heat-sink passes in order. Any fatal failure aborts the
//! whole load; no partial unit escapes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use mekbay_data::equipment::Catalog;
use mekbay_data::loc::{ChassisConfig, LamKind, Loc, MotiveKind, REAR_LOCATION_ORDER};
use mekbay_data::unit::{ArmorConfig, Engine, Quirk, Unit};

use crate::crits::{CritResolver, lookup_with_fallback};
use crate::cursor::LineCursor;
use crate::sheet::{QuirkLine, RawSheet};
use crate::tech::{
    parse_armor_spec, parse_patchwork_value, parse_rules_level, parse_tech_base, resolve_heat_sinks, tech_level,
};

/// Parse one unit sheet into a fully populated unit.
///
/// # Errors
/// Malformed headers, invalid tech configuration, and incompatible
/// combined-slot equipment are fatal; the error chain names the failing
/// field. Unresolvable equipment names are not fatal and end up in the
/// unit's failed-equipment list instead.
pub fn parse_unit(input: &str, catalog: &Catalog) -> Result<Unit> {
    let mut cursor = LineCursor::new(input);
    let mut sheet = RawSheet::read(&mut cursor);
    build_unit(&mut sheet, catalog)
        .with_context(|| format!("while loading unit '{} {}'", sheet.chassis.trim(), sheet.model.trim()))
}

/// Read and parse a unit sheet file.
///
/// # Errors
/// Bubbles up file I/O failures and everything [`parse_unit`] rejects.
pub fn load_unit(path: &Path, catalog: &Catalog) -> Result<Unit> {
    let text = fs::read_to_string(path).with_context(|| format!("reading unit sheet from '{}'", path.display()))?;
    parse_unit(&text, catalog)
}

fn build_unit(sheet: &mut RawSheet, catalog: &Catalog) -> Result<Unit> {
    if !sheet.saw_version {
        bail!("sheet has no version directive");
    }
    if sheet.chassis.trim().is_empty() {
        bail!("sheet names no chassis");
    }
    if sheet.model.trim().is_empty() {
        bail!("sheet names no model");
    }
    let tonnage: f64 = sheet
        .mass
        .trim()
        .parse()
        .ok()
        .filter(|t| *t > 0.0)
        .with_context(|| format!("tonnage '{}' is not a positive number", sheet.mass.trim()))?;
    let (config, omni) = parse_config(sheet);
    let (base, mixed) = parse_tech_base(&sheet.tech_base)?;
    let rules = parse_rules_level(&sheet.rules_level)?;
    let level = tech_level(base, mixed, rules)?;
    let engine = parse_engine(&sheet.engine)?;

    let mut unit = Unit::new(config, tonnage);
    unit.chassis = sheet.chassis.trim().to_string();
    unit.model = sheet.model.trim().to_string();
    unit.clan_chassis_name = non_empty(&sheet.clan_chassis_name);
    unit.omni = omni;
    unit.tech_base = base;
    unit.mixed_tech = mixed;
    unit.tech_level = level;
    unit.engine = engine;
    unit.structure = sheet.structure.trim().to_string();
    unit.gyro = sheet.gyro.trim().to_string();
    unit.cockpit = sheet.cockpit.trim().to_string();
    unit.ejection = non_empty(&sheet.ejection);
    unit.source = sheet.source.trim().to_string();
    unit.role = non_empty(&sheet.role);
    unit.year = parse_or_default(&sheet.era, "era");
    unit.jump_mp = parse_or_default(&sheet.jump_mp, "jump mp");
    unit.bv = sheet.bv.trim().parse().ok();
    unit.mul_id = sheet.mul_id.trim().parse().ok();

    let mut resolver = CritResolver::new(catalog);
    resolver.resolve_all(&mut unit, sheet)?;

    apply_armor(&mut unit, sheet, rules)?;
    resolve_heat_sinks(&mut unit, catalog, &sheet.heat_sinks, &sheet.base_chassis_heat_sinks)?;
    apply_no_crit(&mut unit, catalog, &sheet.no_crit);
    load_quirks(&mut unit, &sheet.quirk_lines);
    apply_fluff(&mut unit, sheet);

    info!(
        "loaded '{} {}': {} mounts, {} unresolved names",
        unit.chassis,
        unit.model,
        unit.mounts().count(),
        unit.failed_equipment.len()
    );
    Ok(unit)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

fn parse_or_default(value: &str, what: &str) -> u32 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.parse().unwrap_or_else(|_| {
        warn!("{what} value '{trimmed}' is not a number; using 0");
        0
    })
}

/// Chassis configuration from the `config:` field, with the QuadVee
/// motive gear and LAM fit pulled from their own directives.
fn parse_config(sheet: &RawSheet) -> (ChassisConfig, bool) {
    let lower = sheet.config.trim().to_ascii_lowercase();
    let omni = lower.contains("omnimech") || lower.contains("omnimek");
    let config = if lower.contains("quadvee") {
        let motive = match sheet.motive.trim().to_ascii_lowercase().as_str() {
            "wheel" | "wheeled" => MotiveKind::Wheel,
            "" | "track" | "tracked" => MotiveKind::Track,
            other => {
                warn!("unknown QuadVee motive '{other}'; assuming tracks");
                MotiveKind::Track
            },
        };
        ChassisConfig::QuadVee { motive }
    } else if lower.contains("quad") {
        ChassisConfig::Quad
    } else if lower.contains("tripod") {
        ChassisConfig::Tripod
    } else if lower.contains("lam") {
        let kind = if sheet.lam.trim().eq_ignore_ascii_case("bimodal") {
            LamKind::Bimodal
        } else {
            LamKind::Standard
        };
        ChassisConfig::Lam { kind }
    } else {
        if !lower.is_empty() && !lower.contains("biped") {
            warn!("unknown chassis configuration '{}'; assuming biped", sheet.config.trim());
        }
        ChassisConfig::Biped
    };
    (config, omni)
}

fn parse_engine(value: &str) -> Result<Engine> {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    let rating = digits
        .parse::<u32>()
        .ok()
        .filter(|r| *r > 0)
        .with_context(|| format!("engine '{trimmed}' must start with its rating"))?;
    Ok(Engine {
        rating,
        kind: trimmed[digits.len()..].trim().to_string(),
    })
}

/// Armor typing plus per-location values.
///
/// Patchwork units carry a `Type(Tech Base):value` entry per location
/// and derive an armor tech level for each; everything else derives one
/// unit-wide armor tech level from the `armor:` field itself.
fn apply_armor(unit: &mut Unit, sheet: &RawSheet, rules: u8) -> Result<()> {
    let spec = parse_armor_spec(&sheet.armor);
    let mut armor = ArmorConfig {
        kind: spec.kind.clone(),
        tech_level: None,
        patchwork: spec.patchwork,
        patchwork_types: Default::default(),
    };
    if !spec.patchwork {
        let base = spec.base.unwrap_or(unit.tech_base);
        armor.tech_level = Some(tech_level(base, false, rules)?);
    }

    let order = unit.config.location_order();
    for (i, &loc) in order.iter().enumerate() {
        let raw_value = sheet.armor_values[i].trim();
        let points = if spec.patchwork {
            let (loc_spec, points) = parse_patchwork_value(raw_value)
                .with_context(|| format!("armor entry for {}", loc.display_name(&unit.config)))?;
            let base = loc_spec.base.unwrap_or(unit.tech_base);
            let loc_level = tech_level(base, false, rules)?;
            armor.patchwork_types.insert(loc, (loc_spec.kind, loc_level));
            points
        } else {
            raw_value
                .parse()
                .with_context(|| format!("armor value for {} is '{raw_value}'", loc.display_name(&unit.config)))?
        };
        unit.initialize_armor(points, loc, false);
    }
    for (i, &loc) in REAR_LOCATION_ORDER.iter().enumerate() {
        let raw_value = sheet.armor_values[order.len() + i].trim();
        let points = raw_value
            .parse()
            .with_context(|| format!("rear armor value for {} is '{raw_value}'", loc.display_name(&unit.config)))?;
        unit.initialize_armor(points, loc, true);
    }
    unit.armor = armor;
    Ok(())
}

/// Equipment that occupies no critical slots, `name:location` entries.
fn apply_no_crit(unit: &mut Unit, catalog: &Catalog, entries: &[String]) {
    for entry in entries {
        let (name, loc_text) = entry.rsplit_once(':').unwrap_or((entry.as_str(), "None"));
        let name = name.trim();
        let loc = if loc_text.trim().eq_ignore_ascii_case("none") {
            None
        } else {
            let parsed = Loc::from_abbrev(loc_text);
            if parsed.is_none() {
                warn!("no-crit entry '{entry}' names unknown location '{}'", loc_text.trim());
            }
            parsed
        };
        match lookup_with_fallback(catalog, unit.tech_base, name) {
            Some(def) => {
                unit.add_equipment(&def.name, loc, false);
            },
            None => {
                warn!("unrecognized no-crit equipment '{name}'");
                unit.add_failed_equipment(name);
            },
        }
    }
}

/// Structured parse of the accumulated quirk lines.
///
/// Weapon quirks are `name:location:slot:weapon`; lines that do not fit
/// the shape are dropped with a warning rather than failing the load.
fn load_quirks(unit: &mut Unit, lines: &[QuirkLine]) {
    for line in lines {
        match line {
            QuirkLine::Unit(name) => unit.quirks.push(Quirk::Unit {
                name: name.trim().to_string(),
            }),
            QuirkLine::Weapon(rest) => {
                let parts: Vec<&str> = rest.splitn(4, ':').map(str::trim).collect();
                let parsed = match parts.as_slice() {
                    [name, loc_text, slot_text, weapon] => Loc::from_abbrev(loc_text)
                        .zip(slot_text.parse::<usize>().ok())
                        .map(|(loc, slot)| Quirk::Weapon {
                            name: (*name).to_string(),
                            loc,
                            slot,
                            weapon: (*weapon).to_string(),
                        }),
                    _ => None,
                };
                match parsed {
                    Some(quirk) => unit.quirks.push(quirk),
                    None => warn!("malformed weapon quirk line '{rest}' skipped"),
                }
            },
        }
    }
}

fn apply_fluff(unit: &mut Unit, sheet: &RawSheet) {
    let fluff = &mut unit.fluff;
    fluff.overview = sheet.overview.trim().to_string();
    fluff.capabilities = sheet.capabilities.trim().to_string();
    fluff.deployment = sheet.deployment.trim().to_string();
    fluff.history = sheet.history.trim().to_string();
    fluff.manufacturer = sheet.manufacturer.trim().to_string();
    fluff.primary_factory = sheet.primary_factory.trim().to_string();
    fluff.notes = sheet.notes.trim().to_string();
    for (system, value) in &sheet.system_manufacturers {
        fluff.system_manufacturers.insert(system.clone(), value.clone());
    }
    for (system, value) in &sheet.system_models {
        fluff.system_models.insert(system.clone(), value.clone());
    }
    fluff.fluff_image = non_empty(&sheet.fluff_image);
    fluff.icon = non_empty(&sheet.icon);
}
