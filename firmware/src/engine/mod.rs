//! Presence/vitals engine — per-frame radar types and the state model.
//!
//! The radar driver hands the engine one [`RadarFrame`] per sensing
//! cycle. [`fusion::FusionEngine`] folds frames into hysteretic state;
//! [`focus`] selects the single target treated as "the person".

pub mod focus;
pub mod fusion;

use heapless::Vec;

/// Internal cap on targets carried per frame. The wire format caps at 8
/// with a truncation flag; the engine keeps a little headroom so the
/// count in `EVT_STATE` stays honest in a crowded room.
pub const MAX_TARGETS: usize = 16;

// ---------------------------------------------------------------------------
// Per-frame observations
// ---------------------------------------------------------------------------

/// One clustered radar detection, immutable within its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Cluster id assigned by the radar module. Not guaranteed stable
    /// across frames.
    pub cluster_id: i16,
    /// Cartesian position, meters. `x` is lateral, `y` is forward.
    pub x_m: f32,
    pub y_m: f32,
    /// Radial velocity estimate in doppler bins; scaled by the tuning
    /// `range_step_cm_s` to cm/s.
    pub doppler_index: i16,
}

impl Target {
    /// Radial distance from the sensor, meters.
    pub fn range_m(&self) -> f32 {
        (self.x_m * self.x_m + self.y_m * self.y_m).sqrt()
    }

    /// Bearing in degrees, zero straight ahead, positive to the right.
    pub fn bearing_deg(&self) -> f32 {
        self.x_m.atan2(self.y_m).to_degrees()
    }

    /// Radial speed in cm/s for the given doppler scale.
    pub fn speed_cm_s(&self, range_step_cm_s: f32) -> f32 {
        self.doppler_index as f32 * range_step_cm_s
    }
}

/// Everything the radar driver reports for one sensing cycle.
///
/// Missing readings are `None`; the engine falls back to last-good
/// values and never treats missing as zero.
#[derive(Debug, Clone, Default)]
pub struct RadarFrame {
    /// Module-level "a human is present" flag.
    pub human: bool,
    /// Clustered detections, nearest-first not guaranteed.
    pub targets: Vec<Target, MAX_TARGETS>,
    /// Distance to the tracked person, cm.
    pub distance_cm: Option<f32>,
    /// Breath rate, bpm.
    pub breath_bpm: Option<f32>,
    /// Heart rate, bpm.
    pub heart_bpm: Option<f32>,
}

/// The focus selection: the target the engine treats as the person,
/// plus its index in the frame's target list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    pub index: usize,
    pub target: Target,
}

// ---------------------------------------------------------------------------
// Classifier output
// ---------------------------------------------------------------------------

/// Person-state classification. Discriminants are the wire enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PersonState {
    NoTarget = 0,
    MultiTarget = 1,
    PresentFar = 2,
    Moving = 3,
    StillNear = 4,
    RestingVitals = 5,
}

impl PersonState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoTarget => "NO_TARGET",
            Self::MultiTarget => "MULTI_TARGET",
            Self::PresentFar => "PRESENT_FAR",
            Self::Moving => "MOVING",
            Self::StillNear => "STILL_NEAR",
            Self::RestingVitals => "RESTING_VITALS",
        }
    }
}

/// Coarse pose derived from `(state, distance)` each frame; never
/// retained as engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoseGuess {
    Unknown = 0,
    Sitting = 1,
    Standing = 2,
}
