//! Equipment descriptors and the name-keyed catalog.
//!
//! The loader never hardcodes equipment behavior; everything it needs to
//! know about a piece of gear comes from the capability flags on its
//! [`EquipmentDef`], found through [`Catalog::lookup`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Technology lineage of a unit or a piece of equipment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechBase {
    #[default]
    InnerSphere,
    Clan,
}

impl TechBase {
    /// Prefix prepended to an equipment name when a bare lookup fails.
    pub fn name_prefix(self) -> &'static str {
        match self {
            TechBase::InnerSphere => "IS",
            TechBase::Clan => "Clan",
        }
    }
}

impl fmt::Display for TechBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TechBase::InnerSphere => write!(f, "Inner Sphere"),
            TechBase::Clan => write!(f, "Clan"),
        }
    }
}

/// Heat-sink families the loader distinguishes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatSinkKind {
    #[default]
    Single,
    Double,
    Laser,
    Compact,
}

/// One catalog entry: a piece of equipment and its capability flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EquipmentDef {
    /// Canonical name; also the identity key for shared-mount bookkeeping.
    pub name: String,
    pub tech_base: TechBase,
    /// Critical slots occupied by one mount (fixed-size equipment).
    pub crits: u32,
    /// Occupies slots across locations but is one functional item.
    pub spreadable: bool,
    /// Mounted once per unit; slot entries are bookkeeping markers only.
    pub targeting_computer: bool,
    /// A single instance may straddle exactly two locations.
    pub splitable: bool,
    /// Slot footprint scales with a size attribute instead of `crits`.
    pub variable_size: bool,
    /// Critical slots per point of size for variable-size equipment.
    pub crits_per_size: f64,
    /// Grenade-launcher-class weapon; honors facing suffixes.
    pub grenade_launcher: bool,
    /// Set when this equipment is a heat sink of some kind.
    pub heat_sink: Option<HeatSinkKind>,
    /// Ammo category, for validating combined two-name slots.
    pub ammo: Option<String>,
    /// Alternate names accepted by the catalog lookup.
    pub aliases: Vec<String>,
}

impl EquipmentDef {
    /// A plain single-slot entry; flags are adjusted from here.
    pub fn new(name: impl Into<String>, tech_base: TechBase) -> Self {
        EquipmentDef {
            name: name.into(),
            tech_base,
            crits: 1,
            spreadable: false,
            targeting_computer: false,
            splitable: false,
            variable_size: false,
            crits_per_size: 1.0,
            grenade_launcher: false,
            heat_sink: None,
            ammo: None,
            aliases: Vec::new(),
        }
    }

    /// Critical slots one mount occupies at the given size.
    ///
    /// Super-heavy chassis pack two items per slot, so the footprint is
    /// halved and rounded up.
    pub fn criticals(&self, size: f64, superheavy: bool) -> usize {
        let base = if self.variable_size {
            let slots = (size * self.crits_per_size).ceil();
            if slots < 1.0 { 1 } else { slots as usize }
        } else {
            (self.crits as usize).max(1)
        };
        if superheavy { base.div_ceil(2) } else { base }
    }

    /// Legacy size inference for variable-size equipment whose slot line
    /// carries no explicit size annotation.
    ///
    /// Older sheets encode the size in the name, e.g. `Cargo (2 tons)`;
    /// the first number inside parentheses is taken as the size.
    pub fn size_from_name(&self, raw_name: &str) -> f64 {
        if let Some(open) = raw_name.find('(') {
            let tail = &raw_name[open + 1..];
            let digits: String = tail
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if let Ok(size) = digits.parse::<f64>() {
                if size > 0.0 {
                    return size;
                }
            }
        }
        1.0
    }

    pub fn is_double_heat_sink(&self) -> bool {
        self.heat_sink == Some(HeatSinkKind::Double)
    }
}

/// Error raised while assembling a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateName { name: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateName { name } => {
                write!(f, "duplicate equipment name '{name}'")
            },
        }
    }
}

impl std::error::Error for CatalogError {}

/// Name-keyed equipment lookup.
///
/// Keys are trimmed and case-folded, so lookups are insensitive to the
/// casing and padding found in unit sheets.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    defs: Vec<EquipmentDef>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    fn key(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }

    /// Register a descriptor under its canonical name and all aliases.
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateName`] when any key is taken.
    pub fn insert(&mut self, def: EquipmentDef) -> Result<(), CatalogError> {
        let slot = self.defs.len();
        let mut keys = vec![Catalog::key(&def.name)];
        keys.extend(def.aliases.iter().map(|a| Catalog::key(a)));
        for key in &keys {
            if self.index.contains_key(key) {
                return Err(CatalogError::DuplicateName { name: key.clone() });
            }
        }
        for key in keys {
            self.index.insert(key, slot);
        }
        self.defs.push(def);
        Ok(())
    }

    /// Find a descriptor by name or alias.
    pub fn lookup(&self, name: &str) -> Option<&EquipmentDef> {
        self.index.get(&Catalog::key(name)).map(|&i| &self.defs[i])
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentDef> {
        self.defs.iter()
    }
}
