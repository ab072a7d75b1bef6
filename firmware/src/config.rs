//! System configuration parameters
//!
//! Runtime settings the host can change over the serial protocol, plus
//! the compile-time tuning constants of the presence/vitals engine.

/// Floor for host-requested stream periods. Requests below this are
/// clamped and acknowledged with `ACK_CLAMPED`.
pub const MIN_PERIOD_MS: u16 = 50;

/// Host-writable runtime configuration.
///
/// Mutated only by the command dispatcher; read by the fusion engine and
/// the telemetry scheduler. Single-threaded cooperative scheduling makes
/// locking unnecessary.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// True while the robot head is in motion. Kills the vitals gate and
    /// counts as movement for the state classifier.
    pub head_moving: bool,
    /// Cluster id the focus picker must prefer; -1 = automatic (nearest).
    pub forced_focus_cluster: i16,
    /// EVT_BIO emission period.
    pub bio_period_ms: u16,
    /// EVT_TARGETS emission period.
    pub targets_period_ms: u16,
    /// EVT_LIGHT emission period (ambient light side channel).
    pub light_period_ms: u16,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            head_moving: false,
            forced_focus_cluster: -1,
            bio_period_ms: 1000,
            targets_period_ms: 250,
            light_period_ms: 1000,
        }
    }
}

/// Engine tuning constants.
///
/// Compile-time configurable: builds for a different enclosure or radar
/// module override `Default` in `main`.
#[derive(Debug, Clone)]
pub struct Tuning {
    // --- Distance bands (cm) ---
    /// Lower edge of the "near" band where vitals are measurable.
    pub near_min_dist_cm: f32,
    /// Upper edge of the "near" band.
    pub near_max_dist_cm: f32,
    /// Below this distance a person is assumed seated.
    pub sit_stand_threshold_cm: f32,

    // --- Movement ---
    /// Radial speed (cm/s) at or above which the focus target counts as moving.
    pub moving_cm_s: f32,
    /// Doppler-index-to-cm/s scale. Driver-specific, calibrated per module.
    pub range_step_cm_s: f32,

    // --- Vitals plausibility (bpm) ---
    pub br_min: f32,
    pub br_max: f32,
    pub hr_min: f32,
    pub hr_max: f32,

    // --- Hysteresis ---
    /// Grace window after the last presence signal before absence can begin.
    pub absent_hold_ms: u32,
    /// Consecutive empty frames required to confirm absence.
    pub absent_confirm: u8,
    /// Consecutive valid-vitals frames required to enter RESTING_VITALS.
    pub vitals_confirm: u8,
    /// Consecutive stable-human frames required for the fallback target lock.
    pub human_stable_fallback_confirm: u8,
    /// Window after losing the single target during which the lock survives.
    pub target_loss_grace_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            // Distance bands
            near_min_dist_cm: 35.0,
            near_max_dist_cm: 150.0,
            sit_stand_threshold_cm: 55.0,

            // Movement
            moving_cm_s: 8.0,
            range_step_cm_s: 1.0,

            // Vitals plausibility
            br_min: 4.0,
            br_max: 30.0,
            hr_min: 35.0,
            hr_max: 200.0,

            // Hysteresis
            absent_hold_ms: 1200,
            absent_confirm: 8,
            vitals_confirm: 5,
            human_stable_fallback_confirm: 3,
            target_loss_grace_ms: 1200,
        }
    }
}
