/// Per-mesh timeline simulation.
///
/// For each mesh: resolve its cell in both grids, seed the tank cascade
/// from the decoded soil state, step it through the 3-hourly rainfall
/// forecast, and derive the hourly-resolution refinement from the
/// window-max series. Meshes are independent, the decoded grids are
/// read-only, so the batch driver fans the work out over a thread pool
/// and re-attaches results on the caller thread.

use std::sync::Arc;
use std::sync::mpsc;

use log::warn;
use threadpool::ThreadPool;

use crate::coord::latlon_to_grid_index;
use crate::geometry::{Mesh, Prefecture};
use crate::model::{DecodedGridSet, ForecastGridSet, ForecastStep, TimePoint, VALUE_INVALID};
use crate::tank::{TankState, tank_step};

/// The value series computed for one mesh. All series are ordered by
/// lead hours; every series is empty when the mesh had no usable cell.
#[derive(Debug, Clone, Default)]
pub struct MeshTimelines {
    pub swi: Vec<TimePoint>,
    pub swi_hourly: Vec<TimePoint>,
    pub rain: Vec<TimePoint>,
    pub rain_hourly: Vec<TimePoint>,
    pub rain_hour_max: Vec<TimePoint>,
}

/// Reads one forecast field at a cell, normalizing missing-data markers
/// and out-of-field cells to "no rainfall".
fn sample(step: &ForecastStep, index: usize) -> f64 {
    let value = step.field.get(index).copied().unwrap_or(0.0);
    if value.is_finite() && value < VALUE_INVALID { value } else { 0.0 }
}

/// Simulates one mesh position against the decoded grids.
///
/// An index outside either grid (or initial soil values carrying the
/// missing-data marker) yields empty timelines; the mesh is logged and
/// skipped rather than failing the batch.
pub fn simulate_point(
    code: &str,
    lat: f64,
    lon: f64,
    soil: &DecodedGridSet,
    forecast: &ForecastGridSet,
) -> MeshTimelines {
    let soil_index = latlon_to_grid_index(lat, lon, &soil.info) - 1;
    let Some(cell) = usize::try_from(soil_index)
        .ok()
        .filter(|&i| i < soil.soil.len() && i < soil.first_tank.len() && i < soil.second_tank.len())
    else {
        warn!("mesh {} at ({:.4}, {:.4}) is outside the soil grid", code, lat, lon);
        return MeshTimelines::default();
    };

    let raw_soil = soil.soil[cell];
    let raw_first = soil.first_tank[cell];
    let raw_second = soil.second_tank[cell];
    if [raw_soil, raw_first, raw_second]
        .iter()
        .any(|v| !v.is_finite() || *v >= VALUE_INVALID)
    {
        warn!("mesh {} has no soil analysis data; skipping", code);
        return MeshTimelines::default();
    }

    let rain_index = latlon_to_grid_index(lat, lon, &forecast.info) - 1;
    let Some(rain_cell) = usize::try_from(rain_index)
        .ok()
        .filter(|&i| i < forecast.info.grid_count)
    else {
        warn!("mesh {} at ({:.4}, {:.4}) is outside the rainfall grid", code, lat, lon);
        return MeshTimelines::default();
    };

    // Feed values are in tenths; the third tank is whatever the total
    // leaves after the first two.
    let initial_soil = raw_soil / 10.0;
    let first = raw_first / 10.0;
    let second = raw_second / 10.0;
    let state0 = TankState::new(first, second, initial_soil - first - second);

    // 3-hourly pass.
    let mut swi = vec![TimePoint { lead_hours: 0, value: initial_soil }];
    let mut rain = Vec::with_capacity(forecast.three_hourly.len());
    let mut state = state0;
    for step in &forecast.three_hourly {
        let rainfall = sample(step, rain_cell);
        state = tank_step(state, 3.0, rainfall);
        swi.push(TimePoint { lead_hours: step.lead_hours, value: state.soil_index() });
        rain.push(TimePoint { lead_hours: step.lead_hours, value: rainfall });
    }

    // Hourly refinement over the reconstructed series.
    let rain_hour_max: Vec<TimePoint> = forecast
        .hourly_max
        .iter()
        .map(|step| TimePoint { lead_hours: step.lead_hours, value: sample(step, rain_cell) })
        .collect();
    let rain_hourly = reconstruct_hourly(&rain, &rain_hour_max);

    let mut swi_hourly = vec![TimePoint { lead_hours: 0, value: initial_soil }];
    let mut state = state0;
    for point in &rain_hourly {
        state = tank_step(state, 1.0, point.value);
        swi_hourly.push(TimePoint { lead_hours: point.lead_hours, value: state.soil_index() });
    }

    MeshTimelines { swi, swi_hourly, rain, rain_hourly, rain_hour_max }
}

/// Distributes 3-hour totals into hours using the window-max series: the
/// maximum lands in the middle hour of each block, and the remainder
/// (floored at zero) splits evenly across the two flanking hours. Blocks
/// without a decoded maximum spread the total evenly instead.
pub fn reconstruct_hourly(totals: &[TimePoint], maxima: &[TimePoint]) -> Vec<TimePoint> {
    let mut hourly = Vec::with_capacity(totals.len() * 3);
    for block in totals {
        let end = block.lead_hours;
        let window_max = maxima
            .iter()
            .find(|m| m.lead_hours == end)
            .map(|m| m.value);
        let (first, middle, last) = match window_max {
            Some(max) => {
                let flank = (block.value - max).max(0.0) / 2.0;
                (flank, max, flank)
            }
            None => {
                let third = block.value / 3.0;
                (third, third, third)
            }
        };
        hourly.push(TimePoint { lead_hours: end - 2, value: first });
        hourly.push(TimePoint { lead_hours: end - 1, value: middle });
        hourly.push(TimePoint { lead_hours: end, value: last });
    }
    hourly
}

/// Copies computed timelines onto a mesh.
pub fn attach(mesh: &mut Mesh, timelines: MeshTimelines) {
    mesh.swi_timeline = timelines.swi;
    mesh.swi_hourly_timeline = timelines.swi_hourly;
    mesh.rain_timeline = timelines.rain;
    mesh.rain_hourly_timeline = timelines.rain_hourly;
    mesh.rain_hour_max_timeline = timelines.rain_hour_max;
}

/// Simulates every mesh of the hierarchy on `workers` threads.
///
/// The decoded grids are shared read-only; workers send their results
/// back over a channel and the caller thread attaches them, so no mesh
/// is ever touched concurrently.
pub fn simulate_prefectures(
    prefectures: &mut [Prefecture],
    soil: &Arc<DecodedGridSet>,
    forecast: &Arc<ForecastGridSet>,
    workers: usize,
) {
    let pool = ThreadPool::new(workers.max(1));
    let (tx, rx) = mpsc::channel();

    let mut jobs = 0usize;
    for (pi, pref) in prefectures.iter().enumerate() {
        for (ai, area) in pref.areas.iter().enumerate() {
            for (mi, mesh) in area.meshes.iter().enumerate() {
                let code = mesh.code.clone();
                let (lat, lon) = (mesh.lat, mesh.lon);
                let soil = Arc::clone(soil);
                let forecast = Arc::clone(forecast);
                let tx = tx.clone();
                pool.execute(move || {
                    let timelines = simulate_point(&code, lat, lon, &soil, &forecast);
                    // The receiver only disappears on panic upstream.
                    let _ = tx.send((pi, ai, mi, timelines));
                });
                jobs += 1;
            }
        }
    }
    drop(tx);

    for (pi, ai, mi, timelines) in rx {
        attach(&mut prefectures[pi].areas[ai].meshes[mi], timelines);
    }
    log::info!("simulated {} meshes on {} workers", jobs, workers.max(1));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
