//! Equipment catalog loading from TOML.
//!
//! Catalog files carry an `[[equipment]]` table per entry. Entries are
//! first deserialized into [`RawEquipmentDef`] and then converted into
//! the data model's [`EquipmentDef`], so the file format can default
//! every flag the entry does not care about.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use serde::Deserialize;

use mekbay_data::equipment::{Catalog, EquipmentDef, HeatSinkKind, TechBase};

/// One `[[equipment]]` entry as written in the file.
#[derive(Debug, Deserialize)]
pub struct RawEquipmentDef {
    pub name: String,
    #[serde(default)]
    pub tech_base: RawTechBase,
    #[serde(default = "default_crits")]
    pub crits: u32,
    #[serde(default)]
    pub spreadable: bool,
    #[serde(default)]
    pub targeting_computer: bool,
    #[serde(default)]
    pub splitable: bool,
    #[serde(default)]
    pub variable_size: bool,
    #[serde(default = "default_crits_per_size")]
    pub crits_per_size: f64,
    #[serde(default)]
    pub grenade_launcher: bool,
    #[serde(default)]
    pub heat_sink: Option<RawHeatSinkKind>,
    #[serde(default)]
    pub ammo: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_crits() -> u32 {
    1
}

fn default_crits_per_size() -> f64 {
    1.0
}

#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawTechBase {
    #[default]
    #[serde(alias = "inner_sphere")]
    Is,
    Clan,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawHeatSinkKind {
    Single,
    Double,
    Laser,
    Compact,
}

impl RawEquipmentDef {
    fn into_def(self) -> EquipmentDef {
        EquipmentDef {
            name: self.name,
            tech_base: match self.tech_base {
                RawTechBase::Is => TechBase::InnerSphere,
                RawTechBase::Clan => TechBase::Clan,
            },
            crits: self.crits,
            spreadable: self.spreadable,
            targeting_computer: self.targeting_computer,
            splitable: self.splitable,
            variable_size: self.variable_size,
            crits_per_size: self.crits_per_size,
            grenade_launcher: self.grenade_launcher,
            heat_sink: self.heat_sink.map(|kind| match kind {
                RawHeatSinkKind::Single => HeatSinkKind::Single,
                RawHeatSinkKind::Double => HeatSinkKind::Double,
                RawHeatSinkKind::Laser => HeatSinkKind::Laser,
                RawHeatSinkKind::Compact => HeatSinkKind::Compact,
            }),
            ammo: self.ammo,
            aliases: self.aliases,
        }
    }
}

/// Wrapper required by TOML to deserialize a bare entry list.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    equipment: Vec<RawEquipmentDef>,
}

/// Build a catalog from TOML text.
///
/// # Errors
/// Fails on TOML syntax errors and on duplicate equipment names.
pub fn catalog_from_toml(text: &str) -> Result<Catalog> {
    let file: CatalogFile = toml::from_str(text).context("parsing equipment catalog TOML")?;
    let mut catalog = Catalog::new();
    for raw in file.equipment {
        let def = raw.into_def();
        if let Err(err) = catalog.insert(def) {
            bail!("while building equipment catalog: {err}");
        }
    }
    Ok(catalog)
}

/// Load a catalog from a TOML file on disk.
///
/// # Errors
/// Bubbles up file I/O and catalog-building failures.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading equipment catalog from '{}'", path.display()))?;
    let catalog = catalog_from_toml(&text)?;
    info!("{} equipment entries loaded from '{}'", catalog.len(), path.display());
    Ok(catalog)
}
