//! Body locations and chassis-variant configuration.
//!
//! Locations are a closed set shared by every chassis variant; the variant
//! only changes which of them exist and what they are called (quads rename
//! the arm rows to front legs, tripods add a center leg).

use serde::{Deserialize, Serialize};

/// Canonical body locations, in system index order.
///
/// The discriminant order matters: critical-slot resolution walks locations
/// from the highest index down so that arm actuator removal happens before
/// any torso equipment can merge into an arm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Loc {
    Head,
    CenterTorso,
    RightTorso,
    LeftTorso,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
    CenterLeg,
}

/// All locations, lowest system index first.
pub const ALL_LOCS: [Loc; 9] = [
    Loc::Head,
    Loc::CenterTorso,
    Loc::RightTorso,
    Loc::LeftTorso,
    Loc::RightArm,
    Loc::LeftArm,
    Loc::RightLeg,
    Loc::LeftLeg,
    Loc::CenterLeg,
];

/// Canonical armor-table ordering for the front-facing values.
///
/// The index of a location in this slice is its armor-table index; the
/// center leg entry is only reachable on tripods.
pub const LOCATION_ORDER: [Loc; 9] = [
    Loc::LeftArm,
    Loc::RightArm,
    Loc::LeftTorso,
    Loc::RightTorso,
    Loc::CenterTorso,
    Loc::Head,
    Loc::LeftLeg,
    Loc::RightLeg,
    Loc::CenterLeg,
];

/// Torso locations that carry rear armor, in armor-table order.
pub const REAR_LOCATION_ORDER: [Loc; 3] = [Loc::LeftTorso, Loc::RightTorso, Loc::CenterTorso];

impl Loc {
    /// System index of this location (row index in the critical grid).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Loc::index`].
    pub fn from_index(index: usize) -> Option<Loc> {
        ALL_LOCS.get(index).copied()
    }

    /// Parse a two/three letter armor abbreviation ("LT", "CT", "HD", ...).
    pub fn from_abbrev(abbrev: &str) -> Option<Loc> {
        match abbrev.trim().to_ascii_uppercase().as_str() {
            "HD" => Some(Loc::Head),
            "CT" => Some(Loc::CenterTorso),
            "RT" => Some(Loc::RightTorso),
            "LT" => Some(Loc::LeftTorso),
            "RA" => Some(Loc::RightArm),
            "LA" => Some(Loc::LeftArm),
            "RL" => Some(Loc::RightLeg),
            "LL" => Some(Loc::LeftLeg),
            "CL" => Some(Loc::CenterLeg),
            _ => None,
        }
    }

    pub fn is_arm(self) -> bool {
        matches!(self, Loc::LeftArm | Loc::RightArm)
    }

    pub fn is_leg(self) -> bool {
        matches!(self, Loc::LeftLeg | Loc::RightLeg | Loc::CenterLeg)
    }

    pub fn is_torso(self) -> bool {
        matches!(self, Loc::LeftTorso | Loc::RightTorso | Loc::CenterTorso)
    }

    /// The next location inward, toward the center torso.
    ///
    /// Used to decide whether two locations may share a split-mounted weapon:
    /// a limb pairs with the torso it hangs from, a side torso pairs with the
    /// center torso, and the head pairs with the center torso.
    pub fn inner(self) -> Loc {
        match self {
            Loc::LeftArm | Loc::LeftLeg => Loc::LeftTorso,
            Loc::RightArm | Loc::RightLeg => Loc::RightTorso,
            Loc::LeftTorso | Loc::RightTorso | Loc::Head | Loc::CenterLeg => Loc::CenterTorso,
            Loc::CenterTorso => Loc::CenterTorso,
        }
    }

    /// Total order used to pick the primary location of a split mount.
    ///
    /// Higher values are more restrictive; when a split weapon straddles two
    /// locations the more restrictive one becomes the mount's primary.
    pub fn restrictiveness(self) -> u8 {
        match self {
            Loc::Head => 4,
            Loc::LeftArm | Loc::RightArm => 3,
            Loc::LeftLeg | Loc::RightLeg | Loc::CenterLeg => 2,
            Loc::LeftTorso | Loc::RightTorso => 1,
            Loc::CenterTorso => 0,
        }
    }

    /// Number of critical slots this location holds.
    pub fn crit_capacity(self) -> usize {
        match self {
            Loc::Head | Loc::LeftLeg | Loc::RightLeg | Loc::CenterLeg => 6,
            _ => 12,
        }
    }

    /// Display name of this location under the given chassis configuration.
    pub fn display_name(self, config: &ChassisConfig) -> &'static str {
        if config.arms_are_legs() {
            match self {
                Loc::LeftArm => return "Front Left Leg",
                Loc::RightArm => return "Front Right Leg",
                Loc::LeftLeg => return "Rear Left Leg",
                Loc::RightLeg => return "Rear Right Leg",
                _ => {},
            }
        }
        match self {
            Loc::Head => "Head",
            Loc::CenterTorso => "Center Torso",
            Loc::RightTorso => "Right Torso",
            Loc::LeftTorso => "Left Torso",
            Loc::RightArm => "Right Arm",
            Loc::LeftArm => "Left Arm",
            Loc::RightLeg => "Right Leg",
            Loc::LeftLeg => "Left Leg",
            Loc::CenterLeg => "Center Leg",
        }
    }
}

/// Motive gear of a QuadVee's vehicle mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotiveKind {
    #[default]
    Track,
    Wheel,
}

/// Conversion equipment fit of a Land-Air 'Mech.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LamKind {
    #[default]
    Standard,
    Bimodal,
}

/// Closed set of chassis variants.
///
/// Variant-specific extensions live on the variant itself rather than in a
/// type hierarchy: QuadVees carry their motive gear, LAMs their conversion
/// fit. Everything else (locations, armor, criticals) is common.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChassisConfig {
    #[default]
    Biped,
    Quad,
    Tripod,
    QuadVee {
        motive: MotiveKind,
    },
    Lam {
        kind: LamKind,
    },
}

impl ChassisConfig {
    /// True when the "arm" rows of the grid are actually front legs.
    pub fn arms_are_legs(self) -> bool {
        matches!(self, ChassisConfig::Quad | ChassisConfig::QuadVee { .. })
    }

    /// True when the center leg location exists.
    pub fn has_center_leg(self) -> bool {
        matches!(self, ChassisConfig::Tripod)
    }

    /// Locations that exist on this chassis, in armor-table order.
    pub fn location_order(self) -> &'static [Loc] {
        if self.has_center_leg() {
            &LOCATION_ORDER
        } else {
            &LOCATION_ORDER[..8]
        }
    }

    /// Locations that carry rear armor.
    pub fn rear_location_order(self) -> &'static [Loc] {
        &REAR_LOCATION_ORDER
    }
}
