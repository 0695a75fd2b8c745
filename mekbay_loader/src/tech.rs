//! Derivation of tech level, armor typing, and heat-sink configuration
//! from the scalar header fields.

use anyhow::{Context, Result};
use log::{debug, warn};
use thiserror::Error;

use mekbay_data::equipment::{Catalog, HeatSinkKind, TechBase};
use mekbay_data::unit::{HeatSinks, TechLevel, Unit};

/// Errors from the tech-base / rules-level lookup tables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TechError {
    #[error("unsupported tech base '{0}'")]
    UnknownBase(String),
    #[error("tech base 'Mixed' must name a chassis, e.g. 'Mixed (IS Chassis)'")]
    BareMixed,
    #[error("unsupported rules level '{0}'")]
    UnknownLevel(String),
    #[error("rules level {level} is not valid for tech base '{base}'")]
    InvalidPair { base: String, level: u8 },
}

/// Parse a `techbase:` value into a base and a mixed-tech flag.
///
/// # Errors
/// A bare `Mixed` without a chassis qualifier, or any unrecognized base
/// string, is rejected.
pub fn parse_tech_base(value: &str) -> Result<(TechBase, bool), TechError> {
    let lower = value.trim().to_ascii_lowercase();
    match lower.as_str() {
        "inner sphere" => Ok((TechBase::InnerSphere, false)),
        "clan" => Ok((TechBase::Clan, false)),
        _ if lower.starts_with("mixed") => {
            if lower.contains("is chassis") || lower.contains("inner sphere chassis") {
                Ok((TechBase::InnerSphere, true))
            } else if lower.contains("clan chassis") {
                Ok((TechBase::Clan, true))
            } else {
                Err(TechError::BareMixed)
            }
        },
        _ => Err(TechError::UnknownBase(value.trim().to_string())),
    }
}

/// Parse a `rules level:` value; levels run 1 through 5.
pub fn parse_rules_level(value: &str) -> Result<u8, TechError> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|level| (1..=5).contains(level))
        .ok_or_else(|| TechError::UnknownLevel(value.trim().to_string()))
}

/// The (tech base × rules level) table.
///
/// Introductory rules exist only for pure Inner Sphere designs; every
/// other level carries an IS and a Clan column, with mixed designs using
/// the column of their chassis.
pub fn tech_level(base: TechBase, mixed: bool, rules: u8) -> Result<TechLevel, TechError> {
    let invalid = |base_name: String| TechError::InvalidPair { base: base_name, level: rules };
    match rules {
        1 => {
            if mixed {
                Err(invalid(format!("Mixed ({base} Chassis)")))
            } else if base == TechBase::Clan {
                Err(invalid(base.to_string()))
            } else {
                Ok(TechLevel::Introductory)
            }
        },
        2 => Ok(TechLevel::Standard(base)),
        3 => Ok(TechLevel::Advanced(base)),
        4 => Ok(TechLevel::Experimental(base)),
        5 => Ok(TechLevel::Unofficial(base)),
        other => Err(TechError::UnknownLevel(other.to_string())),
    }
}

/// Parsed form of an `armor:` value or a patchwork type annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmorSpec {
    pub kind: String,
    pub base: Option<TechBase>,
    pub patchwork: bool,
}

/// Parse `Name` or `Name(Tech Base)` armor typing.
pub fn parse_armor_spec(value: &str) -> ArmorSpec {
    let trimmed = value.trim();
    let (kind, base) = match trimmed.rfind('(') {
        Some(open) if trimmed.ends_with(')') => {
            let inner = trimmed[open + 1..trimmed.len() - 1].trim().to_ascii_lowercase();
            match inner.as_str() {
                "inner sphere" | "is" => (trimmed[..open].trim().to_string(), Some(TechBase::InnerSphere)),
                "clan" => (trimmed[..open].trim().to_string(), Some(TechBase::Clan)),
                // Not a tech-base qualifier; keep the name whole.
                _ => (trimmed.to_string(), None),
            }
        },
        _ => (trimmed.to_string(), None),
    };
    ArmorSpec {
        patchwork: kind.eq_ignore_ascii_case("patchwork"),
        kind,
        base,
    }
}

/// Parse a patchwork armor-value entry, `Type(Tech Base):value`.
///
/// # Errors
/// The trailing value must be an integer.
pub fn parse_patchwork_value(value: &str) -> Result<(ArmorSpec, u16)> {
    let (type_part, value_part) = value
        .rsplit_once(':')
        .with_context(|| format!("patchwork armor entry '{value}' has no value field"))?;
    let points = value_part
        .trim()
        .parse::<u16>()
        .with_context(|| format!("patchwork armor value '{}' is not a number", value_part.trim()))?;
    Ok((parse_armor_spec(type_part), points))
}

/// Parsed `heat sinks:` header line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeatSinkLine {
    pub count: u32,
    pub kind: HeatSinkKind,
    pub explicit_base: Option<TechBase>,
}

/// Parse a heat-sink line such as `10 Double (Clan)` or `12 Single`.
///
/// The kind is detected by substring; an explicit IS/Clan token fixes the
/// tech base of double sinks.
///
/// # Errors
/// The line must start with the sink count.
pub fn parse_heat_sink_line(value: &str) -> Result<HeatSinkLine> {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    let count = digits
        .parse::<u32>()
        .with_context(|| format!("heat sink line '{trimmed}' does not start with a count"))?;
    let rest = trimmed[digits.len()..].to_ascii_lowercase();
    let kind = if rest.contains("laser") {
        HeatSinkKind::Laser
    } else if rest.contains("compact") {
        HeatSinkKind::Compact
    } else if rest.contains("double") {
        HeatSinkKind::Double
    } else {
        HeatSinkKind::Single
    };
    let tokens: Vec<&str> = rest
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|t| !t.is_empty())
        .collect();
    let explicit_base = if tokens.iter().any(|&t| t == "clan") {
        Some(TechBase::Clan)
    } else if tokens.iter().any(|&t| t == "is" || t == "inner") {
        Some(TechBase::InnerSphere)
    } else {
        None
    };
    Ok(HeatSinkLine { count, kind, explicit_base })
}

/// Derive the unit's heat-sink configuration and add the engine-integrated
/// sinks the sheet does not list as slot equipment.
///
/// # Errors
/// The heat-sink header must carry a count.
pub fn resolve_heat_sinks(unit: &mut Unit, catalog: &Catalog, heat_sink_line: &str, base_chassis_line: &str) -> Result<()> {
    let parsed = parse_heat_sink_line(heat_sink_line).context("while reading the heat sink header")?;

    let mounted = unit
        .mounts()
        .filter(|(_, m)| {
            catalog
                .lookup(&m.equipment)
                .is_some_and(|def| def.heat_sink == Some(parsed.kind))
        })
        .count() as u32;

    // Double sinks come in an IS and a Clan flavor; an ambiguous header
    // falls back to whatever is already mounted, then to the unit itself.
    let sink_base = if parsed.kind == HeatSinkKind::Double {
        parsed
            .explicit_base
            .or_else(|| {
                unit.mounts().find_map(|(_, m)| {
                    catalog
                        .lookup(&m.equipment)
                        .filter(|def| def.is_double_heat_sink())
                        .map(|def| def.tech_base)
                })
            })
            .unwrap_or(unit.tech_base)
    } else {
        unit.tech_base
    };

    let integrated = parsed.count.saturating_sub(mounted);
    let sink_name = match parsed.kind {
        HeatSinkKind::Single => "Heat Sink",
        HeatSinkKind::Double => "Double Heat Sink",
        HeatSinkKind::Laser => "Laser Heat Sink",
        HeatSinkKind::Compact => "Compact Heat Sink",
    };
    let resolved_name = catalog
        .lookup(sink_name)
        .or_else(|| catalog.lookup(&format!("{} {}", sink_base.name_prefix(), sink_name)))
        .map(|def| def.name.clone());
    match resolved_name {
        Some(name) => {
            for _ in 0..integrated {
                unit.add_equipment(&name, None, false);
            }
        },
        None if integrated > 0 => warn!("catalog has no '{sink_name}'; engine sinks recorded by count only"),
        None => {},
    }

    let base_chassis = if unit.omni {
        let explicit = base_chassis_line.trim().parse::<u32>().ok();
        Some(match explicit {
            Some(v) if v >= 10 => v,
            _ => parsed.count,
        })
    } else {
        None
    };

    unit.heat_sinks = HeatSinks {
        kind: parsed.kind,
        expected: parsed.count,
        engine_integrated: integrated,
        base_chassis,
    };
    debug!(
        "heat sinks: {} expected, {} engine-integrated ({:?})",
        parsed.count, integrated, parsed.kind
    );
    Ok(())
}
