/// Core data types for the soil-water-index monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond constructors and error formatting — only types.

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Hazard levels
// ---------------------------------------------------------------------------

/// No hazard level reached.
pub const RISK_NONE: u8 = 0;

/// Advisory level (soil-water index at or above the advisory boundary).
pub const RISK_ADVISORY: u8 = 1;

/// Warning level.
pub const RISK_WARNING: u8 = 2;

/// Sediment-disaster level, the highest hazard class.
pub const RISK_DISASTER: u8 = 3;

/// Boundary-value sentinel meaning "this hazard level is not defined for
/// this mesh". Realistic soil-water-index values never reach it, so a
/// sentinel boundary can never trigger.
pub const NEVER_TRIGGER: i32 = 9999;

/// Grid cell values at or above this magnitude are missing-data markers in
/// the decoded feeds and are treated as "no rainfall" / "no data".
pub const VALUE_INVALID: f64 = 9999.0;

// ---------------------------------------------------------------------------
// Grid header
// ---------------------------------------------------------------------------

/// Grid metadata parsed from a feed's identification and grid-definition
/// sections.
///
/// Latitude/longitude fields are kept as the fixed-point micro-degree
/// integers found in the file (implicit scale 1e-6 degrees) and are only
/// converted to floating degrees at the point of use. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridInfo {
    /// Reference (analysis/initial) time of the feed, timezone-less
    /// wall-clock as written in the file.
    pub initial_time: NaiveDateTime,
    /// Total number of grid cells; equals `x_count * y_count`.
    pub grid_count: usize,
    /// Grid width (cells per latitude row, west to east).
    pub x_count: usize,
    /// Grid height (rows, north to south).
    pub y_count: usize,
    /// Latitude of the first (north-west) cell, micro-degrees.
    pub start_lat: i64,
    /// Longitude of the first cell, micro-degrees.
    pub start_lon: i64,
    /// Latitude of the last (south-east) cell, micro-degrees.
    pub end_lat: i64,
    /// Longitude of the last cell, micro-degrees.
    pub end_lon: i64,
    /// Latitude grid spacing, micro-degrees.
    pub delta_lat: i64,
    /// Longitude grid spacing, micro-degrees.
    pub delta_lon: i64,
}

// ---------------------------------------------------------------------------
// Decoded feed contents
// ---------------------------------------------------------------------------

/// The three fields of a decoded soil-water-index feed, each a dense array
/// of `grid_count` values in grid order (north-west origin, row-major).
///
/// Values are in the feed's native tenth-of-millimetre scale; the
/// simulation divides by 10 when seeding tank state.
#[derive(Debug, Clone)]
pub struct DecodedGridSet {
    pub info: GridInfo,
    /// Soil-water index (sum of all three tanks) at the initial time.
    pub soil: Vec<f64>,
    /// First-tank storage at the initial time.
    pub first_tank: Vec<f64>,
    /// Second-tank storage at the initial time.
    pub second_tank: Vec<f64>,
}

/// One forecast snapshot: a dense grid field valid `lead_hours` after the
/// feed's initial time.
#[derive(Debug, Clone)]
pub struct ForecastStep {
    pub lead_hours: i32,
    pub field: Vec<f64>,
}

/// The two cadences decoded from one rainfall-guidance feed.
///
/// Both series are ordered by non-decreasing `lead_hours`. `hourly_max`
/// carries the maximum 1-hour rainfall within each 3-hour window;
/// `three_hourly` carries the 3-hour accumulation totals. Each entry's
/// `lead_hours` is the window end.
#[derive(Debug, Clone)]
pub struct ForecastGridSet {
    pub info: GridInfo,
    pub hourly_max: Vec<ForecastStep>,
    pub three_hourly: Vec<ForecastStep>,
}

// ---------------------------------------------------------------------------
// Timeline points
// ---------------------------------------------------------------------------

/// One point of a computed value series (soil-water index or rainfall).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub lead_hours: i32,
    pub value: f64,
}

/// One point of a hazard-level series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskPoint {
    pub lead_hours: i32,
    /// Hazard class, `RISK_NONE..=RISK_DISASTER`.
    pub level: u8,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort decoding of a feed.
///
/// Any of these means the affected feed produces no usable fields; callers
/// must not fall back to partial results (a failed decode is fatal to the
/// whole run).
#[derive(Debug, PartialEq)]
pub enum DecodeError {
    /// A section length of zero or a section running past the buffer —
    /// the walk cannot advance without desynchronizing.
    SectionOverrun { section: u8, offset: usize },
    /// A run-length value symbol above the declared level count: the
    /// symbol stream is corrupt or the cursor is misaligned.
    SymbolOutOfRange {
        offset: usize,
        symbol: u64,
        level_count: u64,
    },
    /// The declared bits-per-symbol is not a supported whole-byte width.
    UnsupportedSymbolWidth(u64),
    /// The identification section's date fields do not form a timestamp.
    InvalidTimestamp { year: u64, month: u64, day: u64 },
    /// The grid-definition section's cell count disagrees with its shape.
    InconsistentGrid {
        grid_count: usize,
        x_count: usize,
        y_count: usize,
    },
    /// The feed ended without one of its required fields.
    MissingField(&'static str),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::SectionOverrun { section, offset } => {
                write!(f, "section {} at offset {} overruns the buffer", section, offset)
            }
            DecodeError::SymbolOutOfRange { offset, symbol, level_count } => {
                write!(
                    f,
                    "run-length symbol {} at offset {} exceeds level count {}",
                    symbol, offset, level_count
                )
            }
            DecodeError::UnsupportedSymbolWidth(bits) => {
                write!(f, "unsupported bits-per-symbol: {}", bits)
            }
            DecodeError::InvalidTimestamp { year, month, day } => {
                write!(f, "invalid feed timestamp: {:04}-{:02}-{:02}", year, month, day)
            }
            DecodeError::InconsistentGrid { grid_count, x_count, y_count } => {
                write!(
                    f,
                    "grid count {} does not match {} x {} cells",
                    grid_count, x_count, y_count
                )
            }
            DecodeError::MissingField(name) => {
                write!(f, "feed is missing required field: {}", name)
            }
        }
    }
}

impl std::error::Error for DecodeError {}
