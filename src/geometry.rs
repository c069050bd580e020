/// Geographic hierarchy: meshes grouped into areas (municipalities),
/// secondary subdivisions and prefectures, loaded from `meshes.toml`.
///
/// The registry file is the single source of truth for mesh membership
/// and hazard boundary values — simulation and classification only read
/// this structure and write computed timelines onto it. A fresh tree is
/// cloned out of the cache per run; the cached copy never carries
/// timelines.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::coord::{mesh_code_to_grid_xy, mesh_code_to_latlon};
use crate::model::{NEVER_TRIGGER, RiskPoint, TimePoint};

// ============================================================================
// TOML configuration structures
// ============================================================================

/// Root registry configuration.
#[derive(Debug, Deserialize)]
pub struct MeshRegistry {
    #[serde(default)]
    pub prefecture: Vec<PrefectureConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PrefectureConfig {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub area: Vec<AreaConfig>,
    #[serde(default)]
    pub subdivision: Vec<SubdivisionConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    #[serde(default)]
    pub mesh: Vec<MeshConfig>,
}

/// A secondary subdivision groups areas by name.
#[derive(Debug, Deserialize)]
pub struct SubdivisionConfig {
    pub name: String,
    pub areas: Vec<String>,
}

/// One mesh record. Boundary values may be integers, floats, strings or
/// absent; anything unusable becomes the never-trigger sentinel.
#[derive(Debug, Deserialize)]
pub struct MeshConfig {
    pub code: String,
    pub advisory_bound: Option<toml::Value>,
    pub warning_bound: Option<toml::Value>,
    pub disaster_bound: Option<toml::Value>,
}

/// Parses a raw boundary cell. Blank cells, the `"|"` filler the source
/// tables use, and non-numeric garbage all mean "no boundary defined"
/// and map to the 9999 sentinel. Fractional values truncate.
pub fn parse_boundary_value(raw: Option<&toml::Value>) -> i32 {
    match raw {
        Some(toml::Value::Integer(v)) => *v as i32,
        Some(toml::Value::Float(v)) => *v as i32,
        Some(toml::Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s == "|" {
                NEVER_TRIGGER
            } else {
                s.parse::<f64>().map(|v| v as i32).unwrap_or(NEVER_TRIGGER)
            }
        }
        _ => NEVER_TRIGGER,
    }
}

// ============================================================================
// Domain hierarchy
// ============================================================================

/// Smallest geographic unit: one grid cell with its own hazard boundary
/// values and, once processed, its computed timelines.
#[derive(Debug, Clone, Serialize)]
pub struct Mesh {
    pub code: String,
    pub lat: f64,
    pub lon: f64,
    /// Composite mesh-system grid coordinate decoded from the code.
    pub x: i64,
    pub y: i64,
    pub advisory_bound: i32,
    pub warning_bound: i32,
    pub disaster_bound: i32,

    // Computed by the simulation and risk passes; empty until then. An
    // empty set after processing means the mesh fell outside a grid and
    // carries no data.
    pub swi_timeline: Vec<TimePoint>,
    pub swi_hourly_timeline: Vec<TimePoint>,
    pub rain_timeline: Vec<TimePoint>,
    pub rain_hourly_timeline: Vec<TimePoint>,
    pub rain_hour_max_timeline: Vec<TimePoint>,
    pub risk_hourly_timeline: Vec<RiskPoint>,
    pub risk_3h_max_timeline: Vec<RiskPoint>,
}

impl Mesh {
    /// Builds a mesh from its code and boundary values; position comes
    /// from the code itself.
    pub fn new(code: &str, advisory: i32, warning: i32, disaster: i32) -> Self {
        let (lat, lon) = mesh_code_to_latlon(code);
        let (x, y) = mesh_code_to_grid_xy(code);
        Self {
            code: code.to_string(),
            lat,
            lon,
            x,
            y,
            advisory_bound: advisory,
            warning_bound: warning,
            disaster_bound: disaster,
            swi_timeline: Vec::new(),
            swi_hourly_timeline: Vec::new(),
            rain_timeline: Vec::new(),
            rain_hourly_timeline: Vec::new(),
            rain_hour_max_timeline: Vec::new(),
            risk_hourly_timeline: Vec::new(),
            risk_3h_max_timeline: Vec::new(),
        }
    }
}

/// Municipality-level container of meshes.
#[derive(Debug, Clone, Serialize)]
pub struct Area {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub risk_timeline: Vec<RiskPoint>,
    pub rain_timeline: Vec<TimePoint>,
}

/// Forecast-district grouping of areas, referenced by area name so the
/// meshes themselves live in one place.
#[derive(Debug, Clone, Serialize)]
pub struct SecondarySubdivision {
    pub name: String,
    pub area_names: Vec<String>,
    pub risk_timeline: Vec<RiskPoint>,
    pub rain_timeline: Vec<TimePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prefecture {
    pub name: String,
    pub code: String,
    pub areas: Vec<Area>,
    pub subdivisions: Vec<SecondarySubdivision>,
    pub risk_timeline: Vec<RiskPoint>,
}

// ============================================================================
// Loading
// ============================================================================

/// Loads the mesh registry from a TOML file and builds the hierarchy.
pub fn load_geometry<P: AsRef<Path>>(path: P) -> Result<Vec<Prefecture>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let registry: MeshRegistry = toml::from_str(&content)?;
    Ok(build_hierarchy(registry))
}

fn build_hierarchy(registry: MeshRegistry) -> Vec<Prefecture> {
    registry
        .prefecture
        .into_iter()
        .map(|pref| Prefecture {
            name: pref.name,
            code: pref.code,
            areas: pref
                .area
                .into_iter()
                .map(|area| Area {
                    name: area.name,
                    meshes: area
                        .mesh
                        .iter()
                        .map(|m| {
                            Mesh::new(
                                &m.code,
                                parse_boundary_value(m.advisory_bound.as_ref()),
                                parse_boundary_value(m.warning_bound.as_ref()),
                                parse_boundary_value(m.disaster_bound.as_ref()),
                            )
                        })
                        .collect(),
                    risk_timeline: Vec::new(),
                    rain_timeline: Vec::new(),
                })
                .collect(),
            subdivisions: pref
                .subdivision
                .into_iter()
                .map(|sub| SecondarySubdivision {
                    name: sub.name,
                    area_names: sub.areas,
                    risk_timeline: Vec::new(),
                    rain_timeline: Vec::new(),
                })
                .collect(),
            risk_timeline: Vec::new(),
        })
        .collect()
}

// ============================================================================
// Geometry cache
// ============================================================================

/// Owner-passed cache for the loaded hierarchy.
///
/// `get` serves the cached tree while it is younger than the TTL and
/// reloads otherwise; `refresh` reloads unconditionally. Callers clone
/// the returned tree before attaching timelines — the cached copy stays
/// pristine.
pub struct GeometryCache {
    path: PathBuf,
    ttl: Duration,
    loaded: Option<(Instant, Vec<Prefecture>)>,
}

impl GeometryCache {
    pub fn new<P: Into<PathBuf>>(path: P, ttl: Duration) -> Self {
        Self { path: path.into(), ttl, loaded: None }
    }

    pub fn get(&mut self) -> Result<&Vec<Prefecture>, Box<dyn std::error::Error>> {
        let stale = match &self.loaded {
            Some((at, _)) => at.elapsed() > self.ttl,
            None => true,
        };
        if stale {
            let tree = load_geometry(&self.path)?;
            self.loaded = Some((Instant::now(), tree));
        }
        Ok(&self.loaded.as_ref().expect("loaded above").1)
    }

    pub fn refresh(&mut self) -> Result<&Vec<Prefecture>, Box<dyn std::error::Error>> {
        let tree = load_geometry(&self.path)?;
        self.loaded = Some((Instant::now(), tree));
        Ok(&self.loaded.as_ref().expect("just loaded").1)
    }
}

// ============================================================================
// Tests
// ============================================================================
