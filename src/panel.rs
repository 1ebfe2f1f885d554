//! Panel Data Model Module
//!
//! A [`Panel`] describes one physical installation: either a static panel
//! with a fixed orientation, or a tracking panel with stepped actuators.
//! The two configurations are mutually exclusive by construction, so a
//! record can never carry both an angle pair and a step pair.
//!
//! Panels are created by the caller (deserialized from a panel-list file or
//! built in code), validated once, and then passed to the simulator by
//! reference; the simulator never mutates them.

use serde::{Deserialize, Serialize};

// ===================== PANEL KIND =====================

/// Panel configuration variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelKind {
    /// Fixed installation: tilt from horizontal and compass azimuth.
    Static {
        /// Tilt from horizontal in degrees (0 = flat, 90 = vertical)
        tilt_deg: f64,
        /// Facing direction in degrees (180 = south)
        azimuth_deg: f64,
    },
    /// Stepped tracker: number of discrete actuator positions per axis.
    /// A step count of 0 leaves that axis fixed at 0°.
    Tracking {
        vertical_steps: u32,
        horizontal_steps: u32,
    },
}

// ===================== LOCATION & GROUPS =====================

/// Installation site in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Comparison-group membership flags. A panel may belong to one group,
/// both, or neither (in which case no run picks it up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groups {
    #[serde(default)]
    pub group1: bool,
    #[serde(default)]
    pub group2: bool,
}

/// One of the two comparison groups a run is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    One,
    Two,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::One => write!(f, "1"),
            Group::Two => write!(f, "2"),
        }
    }
}

// ===================== PANEL =====================

/// One physical panel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Display label, carried through to reports.
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: PanelKind,
    /// Nameplate output in watts under full incident power.
    pub rated_power_w: f64,
    /// Auxiliary/motor draw in watts while the panel is active.
    #[serde(default)]
    pub consumption_w: f64,
    /// Multiplier for identical units at the same site.
    #[serde(default = "default_count")]
    pub count: u32,
    pub location: Location,
    #[serde(default)]
    pub groups: Groups,
}

fn default_count() -> u32 {
    1
}

impl Panel {
    pub fn is_static(&self) -> bool {
        matches!(self.kind, PanelKind::Static { .. })
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.kind, PanelKind::Tracking { .. })
    }

    /// Whether this panel participates in the given comparison group.
    pub fn in_group(&self, group: Group) -> bool {
        match group {
            Group::One => self.groups.group1,
            Group::Two => self.groups.group2,
        }
    }

    /// Check field ranges, collecting the names of offending fields.
    ///
    /// Returns an empty vector for a valid panel. The caller decides what to
    /// do with the list; the simulator itself assumes it only ever receives
    /// validated panels.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut bad = Vec::new();

        if !(self.rated_power_w > 0.0) {
            bad.push("rated_power_w");
        }
        if self.consumption_w < 0.0 || !self.consumption_w.is_finite() {
            bad.push("consumption_w");
        }
        if self.count == 0 {
            bad.push("count");
        }
        if let PanelKind::Static { tilt_deg, azimuth_deg } = self.kind {
            if !(0.0..=90.0).contains(&tilt_deg) {
                bad.push("tilt_deg");
            }
            if !(0.0..=360.0).contains(&azimuth_deg) {
                bad.push("azimuth_deg");
            }
        }
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            bad.push("latitude");
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            bad.push("longitude");
        }

        bad
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    fn static_panel() -> Panel {
        Panel {
            name: "roof south".into(),
            kind: PanelKind::Static { tilt_deg: 35.0, azimuth_deg: 180.0 },
            rated_power_w: 300.0,
            consumption_w: 0.0,
            count: 4,
            location: Location { latitude: 52.03, longitude: 113.50 },
            groups: Groups { group1: true, group2: false },
        }
    }

    #[test]
    fn test_valid_panel_has_no_bad_fields() {
        assert!(static_panel().validate().is_empty());
    }

    #[test]
    fn test_validation_collects_field_names() {
        let mut p = static_panel();
        p.rated_power_w = 0.0;
        p.count = 0;
        p.kind = PanelKind::Static { tilt_deg: 120.0, azimuth_deg: 400.0 };
        p.location.latitude = 95.0;

        let bad = p.validate();
        assert_eq!(
            bad,
            vec!["rated_power_w", "count", "tilt_deg", "azimuth_deg", "latitude"]
        );
    }

    #[test]
    fn test_tracking_panel_skips_angle_checks() {
        let mut p = static_panel();
        p.kind = PanelKind::Tracking { vertical_steps: 0, horizontal_steps: 0 };
        // Zero steps are legal: the axis simply stays fixed.
        assert!(p.validate().is_empty());
    }

    #[test]
    fn test_group_membership() {
        let p = static_panel();
        assert!(p.in_group(Group::One));
        assert!(!p.in_group(Group::Two));
    }

    #[test]
    fn test_panel_json_round_trip_static() {
        let json = r#"{
            "name": "barn",
            "kind": "static",
            "tilt_deg": 40.0,
            "azimuth_deg": 170.0,
            "rated_power_w": 450.0,
            "location": { "latitude": 51.9, "longitude": 113.1 },
            "groups": { "group1": true, "group2": true }
        }"#;

        let p: Panel = serde_json::from_str(json).unwrap();
        assert!(p.is_static());
        assert_eq!(p.count, 1); // defaulted
        assert_eq!(p.consumption_w, 0.0); // defaulted
        assert!(p.in_group(Group::One) && p.in_group(Group::Two));
    }

    #[test]
    fn test_panel_json_tracking_variant() {
        let json = r#"{
            "kind": "tracking",
            "vertical_steps": 18,
            "horizontal_steps": 36,
            "rated_power_w": 300.0,
            "consumption_w": 5.0,
            "count": 2,
            "location": { "latitude": 52.0, "longitude": 113.5 }
        }"#;

        let p: Panel = serde_json::from_str(json).unwrap();
        assert!(p.is_tracking());
        match p.kind {
            PanelKind::Tracking { vertical_steps, horizontal_steps } => {
                assert_eq!((vertical_steps, horizontal_steps), (18, 36));
            }
            _ => panic!("expected tracking variant"),
        }
        // Not in any group until flags are set.
        assert!(!p.in_group(Group::One) && !p.in_group(Group::Two));
    }
}
