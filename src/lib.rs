/// swimon_service: soil-water-index hazard monitoring core.
///
/// # Module structure
///
/// ```text
/// swimon_service
/// ├── model       — shared data types (GridInfo, TimePoint, RiskPoint, DecodeError, …)
/// ├── reader      — big-endian fixed-width integer extraction
/// ├── decode
/// │   ├── header    — indicator/identification/grid-definition sections
/// │   ├── runlength — run-length symbol stream expansion
/// │   ├── section   — representation/bitmap/data section handling
/// │   ├── soil      — soil-water-index feed → DecodedGridSet
/// │   ├── rainfall  — rainfall-guidance feed → ForecastGridSet
/// │   └── fixtures (test only) — synthetic binary feeds
/// ├── coord       — mesh code ↔ lat/lon ↔ grid index mapping
/// ├── geometry    — mesh/area/subdivision/prefecture tree (meshes.toml)
/// ├── tank        — three-tank reservoir step function
/// ├── simulation  — per-mesh timelines + parallel batch driver
/// ├── risk        — hazard classification and max-aggregation
/// └── report      — serializable result tree
/// ```

/// Public modules
pub mod coord;
pub mod decode;
pub mod geometry;
pub mod model;
pub mod reader;
pub mod report;
pub mod risk;
pub mod simulation;
pub mod tank;
