//! First-stage parse: classify directive lines into a raw sheet.
//!
//! A [`RawSheet`] holds every header field as an untouched string, the
//! 12-slot armor table, and the per-location critical grid. Nothing is
//! interpreted here beyond recognizing which directive a line is; turning
//! the strings into a unit is the builder's job.

use log::warn;
use variantly::Variantly;

use mekbay_data::loc::{LOCATION_ORDER, Loc, REAR_LOCATION_ORDER};

use crate::cursor::{COMMENT, GENERATOR, LineCursor, read_title_block, starts_with_ignore_case};

/// Marker for a vacant critical slot.
pub const EMPTY: &str = "-Empty-";

/// Maximum locations a grid can address.
pub const GRID_ROWS: usize = 9;

/// Maximum slots per location.
pub const GRID_COLS: usize = 12;

/// Scalar header fields settable by a single `key:value` directive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Config,
    TechBase,
    Era,
    Source,
    RulesLevel,
    Role,
    Mass,
    Engine,
    Structure,
    Myomer,
    Lam,
    Motive,
    Cockpit,
    Gyro,
    Ejection,
    HeatSinks,
    BaseChassisHeatSinks,
    WalkMp,
    JumpMp,
    Armor,
    Bv,
    MulId,
    Overview,
    Capabilities,
    Deployment,
    History,
    Manufacturer,
    PrimaryFactory,
    Notes,
    FluffImage,
    Icon,
}

/// One armor-table cell: a location's front or rear face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArmorFace {
    pub loc: Loc,
    pub rear: bool,
}

/// Classified form of one sheet line.
#[derive(Clone, Debug, PartialEq, Variantly)]
pub enum Directive {
    Version,
    Chassis(String),
    ClanName(String),
    Model(String),
    LocationHeader(Loc),
    Field(Field, String),
    SystemManufacturer(String, String),
    SystemModel(String, String),
    NoCrit(String),
    Quirk(String),
    WeaponQuirk(String),
    Weapons(usize),
    Armor(ArmorFace, String),
    Slot(String),
}

/// Classify one trimmed, non-empty, non-comment line.
///
/// Keys are everything before the first colon, case-folded; a line with
/// no colon can only be critical-slot text. The key space is disjoint, so
/// a single match expresses the original first-match prefix ladder.
pub fn parse_directive(line: &str) -> Directive {
    let Some(colon) = line.find(':') else {
        return Directive::Slot(line.to_string());
    };
    let key = line[..colon].trim().to_ascii_lowercase();
    let rest = line[colon + 1..].trim();
    let armor = |loc, rear| Directive::Armor(ArmorFace { loc, rear }, rest.to_string());
    let field = |f| Directive::Field(f, rest.to_string());
    match key.as_str() {
        "version" => Directive::Version,
        "chassis" => Directive::Chassis(rest.to_string()),
        "clanname" => Directive::ClanName(rest.to_string()),
        "model" => Directive::Model(rest.to_string()),

        "left arm" => Directive::LocationHeader(Loc::LeftArm),
        "right arm" => Directive::LocationHeader(Loc::RightArm),
        "left torso" => Directive::LocationHeader(Loc::LeftTorso),
        "right torso" => Directive::LocationHeader(Loc::RightTorso),
        "center torso" => Directive::LocationHeader(Loc::CenterTorso),
        "head" => Directive::LocationHeader(Loc::Head),
        "left leg" => Directive::LocationHeader(Loc::LeftLeg),
        "right leg" => Directive::LocationHeader(Loc::RightLeg),
        "front left leg" => Directive::LocationHeader(Loc::LeftArm),
        "front right leg" => Directive::LocationHeader(Loc::RightArm),
        "rear left leg" => Directive::LocationHeader(Loc::LeftLeg),
        "rear right leg" => Directive::LocationHeader(Loc::RightLeg),
        "center leg" => Directive::LocationHeader(Loc::CenterLeg),

        "config" => field(Field::Config),
        "techbase" => field(Field::TechBase),
        "era" => field(Field::Era),
        "source" => field(Field::Source),
        "rules level" => field(Field::RulesLevel),
        "role" => field(Field::Role),
        "mass" => field(Field::Mass),
        "engine" => field(Field::Engine),
        "structure" => field(Field::Structure),
        "myomer" => field(Field::Myomer),
        "lam" => field(Field::Lam),
        "motive" => field(Field::Motive),
        "cockpit" => field(Field::Cockpit),
        "gyro" => field(Field::Gyro),
        "ejection" => field(Field::Ejection),
        "heat sinks" => field(Field::HeatSinks),
        "base chassis heat sinks" => field(Field::BaseChassisHeatSinks),
        "walk mp" => field(Field::WalkMp),
        "jump mp" => field(Field::JumpMp),
        "armor" => field(Field::Armor),
        "bv" => field(Field::Bv),
        "mul id" => field(Field::MulId),
        "overview" => field(Field::Overview),
        "capabilities" => field(Field::Capabilities),
        "deployment" => field(Field::Deployment),
        "history" => field(Field::History),
        "manufacturer" => field(Field::Manufacturer),
        "primaryfactory" => field(Field::PrimaryFactory),
        "notes" => field(Field::Notes),
        "fluffimage" => field(Field::FluffImage),
        "icon" => field(Field::Icon),

        "systemmanufacturer" | "systemmode" => {
            let (system, value) = match rest.split_once(':') {
                Some((s, v)) => (s.trim().to_string(), v.trim().to_string()),
                None => (rest.to_string(), String::new()),
            };
            if key == "systemmanufacturer" {
                Directive::SystemManufacturer(system, value)
            } else {
                Directive::SystemModel(system, value)
            }
        },
        "nocrit" => Directive::NoCrit(rest.to_string()),
        "quirk" => Directive::Quirk(rest.to_string()),
        "weaponquirk" => Directive::WeaponQuirk(rest.to_string()),
        "weapons" => Directive::Weapons(rest.parse().unwrap_or(0)),

        "la armor" => armor(Loc::LeftArm, false),
        "ra armor" => armor(Loc::RightArm, false),
        "lt armor" => armor(Loc::LeftTorso, false),
        "rt armor" => armor(Loc::RightTorso, false),
        "ct armor" => armor(Loc::CenterTorso, false),
        "hd armor" => armor(Loc::Head, false),
        "ll armor" => armor(Loc::LeftLeg, false),
        "rl armor" => armor(Loc::RightLeg, false),
        "rtl armor" => armor(Loc::LeftTorso, true),
        "rtr armor" => armor(Loc::RightTorso, true),
        "rtc armor" => armor(Loc::CenterTorso, true),
        "cl armor" => armor(Loc::CenterLeg, false),

        _ => Directive::Slot(line.to_string()),
    }
}

/// Raw quirk lines, kept for structured parsing by the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuirkLine {
    Unit(String),
    Weapon(String),
}

/// Everything a sheet says, still in string form.
#[derive(Debug, Default)]
pub struct RawSheet {
    pub saw_version: bool,
    pub chassis: String,
    pub clan_chassis_name: String,
    pub model: String,
    pub config: String,
    pub tech_base: String,
    pub era: String,
    pub source: String,
    pub rules_level: String,
    pub role: String,
    pub mass: String,
    pub engine: String,
    pub structure: String,
    pub lam: String,
    pub motive: String,
    pub cockpit: String,
    pub gyro: String,
    pub ejection: String,
    pub heat_sinks: String,
    pub base_chassis_heat_sinks: String,
    pub jump_mp: String,
    pub armor: String,
    pub bv: String,
    pub mul_id: String,
    pub overview: String,
    pub capabilities: String,
    pub deployment: String,
    pub history: String,
    pub manufacturer: String,
    pub primary_factory: String,
    pub notes: String,
    pub fluff_image: String,
    pub icon: String,
    pub system_manufacturers: Vec<(String, String)>,
    pub system_models: Vec<(String, String)>,
    pub no_crit: Vec<String>,
    pub quirk_lines: Vec<QuirkLine>,
    /// Armor table; see [`RawSheet::armor_index`] for the layout.
    pub armor_values: [String; GRID_COLS],
    crit_grid: Vec<Vec<String>>,
}

impl RawSheet {
    fn new() -> RawSheet {
        RawSheet {
            crit_grid: vec![vec![String::new(); GRID_COLS]; GRID_ROWS],
            ..RawSheet::default()
        }
    }

    /// Consume the cursor to exhaustion (or a blank line) into a sheet.
    pub fn read(cursor: &mut LineCursor<'_>) -> RawSheet {
        let mut sheet = RawSheet::new();
        let mut current_loc: Option<Loc> = None;
        let mut slot = 0usize;

        while let Some(line) = cursor.next_line() {
            if line.is_empty() {
                break;
            }
            if line.starts_with(COMMENT) || starts_with_ignore_case(line, GENERATOR) {
                continue;
            }
            match parse_directive(line) {
                Directive::Version => {
                    sheet.saw_version = true;
                    let title = read_title_block(cursor);
                    sheet.chassis = title.chassis;
                    sheet.model = title.model;
                },
                Directive::Chassis(v) => sheet.chassis = v,
                Directive::ClanName(v) => sheet.clan_chassis_name = v,
                Directive::Model(v) => sheet.model = v,
                Directive::LocationHeader(loc) => {
                    current_loc = Some(loc);
                    slot = 0;
                },
                Directive::Field(f, v) => sheet.set_field(f, v),
                Directive::SystemManufacturer(system, value) => sheet.system_manufacturers.push((system, value)),
                Directive::SystemModel(system, value) => sheet.system_models.push((system, value)),
                Directive::NoCrit(v) => sheet.no_crit.push(v),
                Directive::Quirk(v) => sheet.quirk_lines.push(QuirkLine::Unit(v)),
                Directive::WeaponQuirk(v) => sheet.quirk_lines.push(QuirkLine::Weapon(v)),
                Directive::Weapons(count) => {
                    // The weapon list restates the critical grid; skip it.
                    for _ in 0..count {
                        let _ = cursor.next_line();
                    }
                },
                Directive::Armor(face, value) => {
                    if let Some(index) = sheet.armor_index(face) {
                        sheet.armor_values[index] = value;
                    } else {
                        warn!("armor line for absent location {:?} ignored", face.loc);
                    }
                },
                Directive::Slot(text) => {
                    let Some(loc) = current_loc else { continue };
                    if slot < GRID_COLS {
                        sheet.crit_grid[loc.index()][slot] = text;
                        slot += 1;
                    }
                },
            }
        }
        sheet
    }

    fn set_field(&mut self, field: Field, value: String) {
        match field {
            Field::Config => self.config = value,
            Field::TechBase => self.tech_base = value,
            Field::Era => self.era = value,
            Field::Source => self.source = value,
            Field::RulesLevel => self.rules_level = value,
            Field::Role => self.role = value,
            Field::Mass => self.mass = value,
            Field::Engine => self.engine = value,
            Field::Structure => self.structure = value,
            Field::Lam => self.lam = value,
            Field::Motive => self.motive = value,
            Field::Cockpit => self.cockpit = value,
            Field::Gyro => self.gyro = value,
            Field::Ejection => self.ejection = value,
            Field::HeatSinks => self.heat_sinks = value,
            Field::BaseChassisHeatSinks => self.base_chassis_heat_sinks = value,
            Field::JumpMp => self.jump_mp = value,
            Field::Armor => self.armor = value,
            Field::Bv => self.bv = value,
            Field::MulId => self.mul_id = value,
            Field::Overview => self.overview = value,
            Field::Capabilities => self.capabilities = value,
            Field::Deployment => self.deployment = value,
            Field::History => self.history = value,
            Field::Manufacturer => self.manufacturer = value,
            Field::PrimaryFactory => self.primary_factory = value,
            Field::Notes => self.notes = value,
            Field::FluffImage => self.fluff_image = value,
            Field::Icon => self.icon = value,
            // Recognized so they do not fall through to the critical grid.
            Field::Myomer | Field::WalkMp => {},
        }
    }

    /// Armor-table index for a face: position in the location order for
    /// front faces, order length plus torso position for rear faces.
    ///
    /// The order length depends on the chassis (a tripod's center leg is
    /// part of it), read from the `config:` field seen so far.
    pub fn armor_index(&self, face: ArmorFace) -> Option<usize> {
        let order_len = if self.is_tripod() { 9 } else { 8 };
        if face.rear {
            REAR_LOCATION_ORDER.iter().position(|&l| l == face.loc).map(|i| order_len + i)
        } else {
            LOCATION_ORDER
                .iter()
                .position(|&l| l == face.loc)
                .filter(|&i| i < order_len)
        }
    }

    fn is_tripod(&self) -> bool {
        self.config.to_ascii_lowercase().contains("tripod")
    }

    /// One row of the critical grid.
    pub fn grid_row(&self, loc: Loc) -> &[String] {
        &self.crit_grid[loc.index()]
    }

    /// Mutable row access for the resolver's compaction pass.
    pub fn grid_row_mut(&mut self, loc: Loc) -> &mut [String] {
        &mut self.crit_grid[loc.index()]
    }
}
