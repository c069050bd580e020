/// Three-tank reservoir model.
///
/// The soil column is modeled as three cascading storages: rainfall
/// enters the top tank, each tank leaks to the one below, and storage
/// above a threshold discharges laterally. The soil-water index is the
/// total storage across all three tanks.
///
/// Constants are the operational calibration and are part of the model's
/// external contract.

/// Discharge thresholds [mm]: two on the top tank, one each below.
pub const L1: f64 = 15.0;
pub const L2: f64 = 60.0;
pub const L3: f64 = 15.0;
pub const L4: f64 = 15.0;

/// Discharge coefficients [1/h] for the four threshold outlets.
pub const A1: f64 = 0.1;
pub const A2: f64 = 0.15;
pub const A3: f64 = 0.05;
pub const A4: f64 = 0.01;

/// Downward transfer coefficients [1/h] between tanks.
pub const B1: f64 = 0.12;
pub const B2: f64 = 0.05;
pub const B3: f64 = 0.01;

/// Storage of the three tanks [mm].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankState {
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl TankState {
    pub fn new(s1: f64, s2: f64, s3: f64) -> Self {
        Self { s1, s2, s3 }
    }

    /// The soil-water index: total storage across the cascade.
    pub fn soil_index(&self) -> f64 {
        self.s1 + self.s2 + self.s3
    }
}

/// Advances the cascade by one step of `dt` hours under `rainfall` mm.
///
/// Discharge is computed from the pre-step storages, then each tank is
/// decayed, drained and fed from above in one update. Storages clamp at
/// zero — the cascade cannot go negative.
pub fn tank_step(state: TankState, dt: f64, rainfall: f64) -> TankState {
    let TankState { s1, s2, s3 } = state;

    let mut q1 = 0.0;
    if s1 > L1 {
        q1 += A1 * (s1 - L1);
    }
    if s1 > L2 {
        q1 += A2 * (s1 - L2);
    }
    let q2 = if s2 > L3 { A3 * (s2 - L3) } else { 0.0 };
    let q3 = if s3 > L4 { A4 * (s3 - L4) } else { 0.0 };

    TankState {
        s1: ((1.0 - B1 * dt) * s1 - q1 * dt + rainfall).max(0.0),
        s2: ((1.0 - B2 * dt) * s2 - q2 * dt + B1 * s1 * dt).max(0.0),
        s3: ((1.0 - B3 * dt) * s3 - q3 * dt + B2 * s2 * dt).max(0.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
