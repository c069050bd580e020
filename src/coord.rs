/// Mesh-code and grid-coordinate mapping.
///
/// An 8-digit mesh code packs a composite grid coordinate: two digits of
/// 80-cell blocks, one digit of 10-cell sub-blocks and one unit digit per
/// axis, interleaved as `YYXXyxyx`. Cells are 30 arc-seconds tall and 45
/// arc-seconds wide, with longitude offset 100 degrees east.

use crate::model::GridInfo;

/// Fallback coordinate for malformed mesh codes (central Honshu).
const DEFAULT_LATLON: (f64, f64) = (35.0, 135.0);

/// Decodes a mesh code into its composite grid coordinate `(x, y)`.
///
/// Malformed codes (shorter than 8 characters or non-numeric) fall back
/// to `(0, 0)` rather than erroring, mirroring the code's lat/lon
/// fallback.
pub fn mesh_code_to_grid_xy(code: &str) -> (i64, i64) {
    match parse_code(code) {
        Some(xy) => xy,
        None => (0, 0),
    }
}

/// Decodes a mesh code into the latitude/longitude of the cell center.
///
/// Malformed codes fall back to a fixed default coordinate.
pub fn mesh_code_to_latlon(code: &str) -> (f64, f64) {
    match parse_code(code) {
        Some((x, y)) => (
            (y as f64 + 0.5) * 30.0 / 3600.0,
            (x as f64 + 0.5) * 45.0 / 3600.0 + 100.0,
        ),
        None => DEFAULT_LATLON,
    }
}

fn parse_code(code: &str) -> Option<(i64, i64)> {
    let digits = code.as_bytes();
    if digits.len() < 8 || !digits[..8].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let d = |i: usize| i64::from(digits[i] - b'0');
    let y = (d(0) * 10 + d(1)) * 80 + d(4) * 10 + d(6);
    let x = (d(2) * 10 + d(3)) * 80 + d(5) * 10 + d(7);
    Some((x, y))
}

/// Maps a coordinate onto the 1-based linear index of a grid.
///
/// The grid origin is its north-west corner: row number grows southward
/// from `start_lat`, column number eastward from `start_lon`. Callers
/// indexing a decoded array must subtract 1, and out-of-range results
/// are the caller's responsibility to bounds-check before indexing.
pub fn latlon_to_grid_index(lat: f64, lon: f64, grid: &GridInfo) -> i64 {
    let y = ((grid.start_lat as f64 / 1e6 - lat) / (grid.delta_lat as f64 / 1e6)).floor() as i64 + 1;
    let x = ((lon - grid.start_lon as f64 / 1e6) / (grid.delta_lon as f64 / 1e6)).floor() as i64 + 1;
    (y - 1) * grid.x_count as i64 + x
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn grid(start_lat: i64, start_lon: i64, delta_lat: i64, delta_lon: i64, x_count: usize) -> GridInfo {
        GridInfo {
            initial_time: NaiveDate::from_ymd_opt(2023, 6, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            grid_count: x_count * x_count,
            x_count,
            y_count: x_count,
            start_lat,
            start_lon,
            end_lat: start_lat - delta_lat * (x_count as i64 - 1),
            end_lon: start_lon + delta_lon * (x_count as i64 - 1),
            delta_lat,
            delta_lon,
        }
    }

    #[test]
    fn test_mesh_code_decomposes_into_grid_axes() {
        // 52352679: y = 52*80 + 2*10 + 7 = 4187, x = 35*80 + 6*10 + 9 = 2869.
        assert_eq!(mesh_code_to_grid_xy("52352679"), (2869, 4187));
    }

    #[test]
    fn test_mesh_code_center_coordinates() {
        let (lat, lon) = mesh_code_to_latlon("52352679");
        assert!((lat - (4187.5 * 30.0 / 3600.0)).abs() < 1e-9);
        assert!((lon - (2869.5 * 45.0 / 3600.0 + 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_codes_fall_back_to_default() {
        assert_eq!(mesh_code_to_latlon(""), DEFAULT_LATLON);
        assert_eq!(mesh_code_to_latlon("1234567"), DEFAULT_LATLON);
        assert_eq!(mesh_code_to_latlon("12a45678"), DEFAULT_LATLON);
        assert_eq!(mesh_code_to_grid_xy("12a45678"), (0, 0));
    }

    #[test]
    fn test_longer_codes_use_their_first_eight_digits() {
        assert_eq!(
            mesh_code_to_grid_xy("523526791"),
            mesh_code_to_grid_xy("52352679")
        );
    }

    #[test]
    fn test_grid_index_is_one_based_row_major() {
        // 36N 135E corner, one-degree cells, 2 columns.
        let g = grid(36_000_000, 135_000_000, 1_000_000, 1_000_000, 2);
        assert_eq!(latlon_to_grid_index(35.5, 135.5, &g), 1);
        assert_eq!(latlon_to_grid_index(35.5, 136.5, &g), 2);
        assert_eq!(latlon_to_grid_index(34.5, 135.5, &g), 3);
        assert_eq!(latlon_to_grid_index(34.5, 136.5, &g), 4);
    }

    #[test]
    fn test_out_of_range_coordinates_produce_out_of_range_indices() {
        let g = grid(36_000_000, 135_000_000, 1_000_000, 1_000_000, 2);
        // North of the grid: row 0 → index below 1.
        assert!(latlon_to_grid_index(37.5, 135.5, &g) < 1);
        // South of the grid: beyond the last cell.
        assert!(latlon_to_grid_index(30.5, 135.5, &g) > 4);
    }

    #[test]
    fn test_mesh_code_round_trips_through_a_matching_grid() {
        // A grid whose spacing matches the mesh system (30" x 45", stored
        // as truncated micro-degrees) and whose corner sits on mesh rows
        // Y0 = 4240 / columns X0 = 2860. Mapping the decoded center of
        // mesh 52352679 (y 4187, x 2869) must land one-based at
        // (Y0 - y, x - X0 + 1) within one cell despite the truncation.
        let y0: i64 = 4240;
        let x0: i64 = 2860;
        let g = GridInfo {
            initial_time: NaiveDate::from_ymd_opt(2023, 6, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            grid_count: 80 * 80,
            x_count: 80,
            y_count: 80,
            start_lat: y0 * 30 * 1_000_000 / 3600,
            start_lon: x0 * 45 * 1_000_000 / 3600 + 100_000_000,
            end_lat: 0,
            end_lon: 0,
            delta_lat: 8333,
            delta_lon: 12500,
        };
        let (lat, lon) = mesh_code_to_latlon("52352679");
        let index = latlon_to_grid_index(lat, lon, &g);
        let row = (index - 1) / 80 + 1;
        let col = (index - 1) % 80 + 1;
        assert!((row - (y0 - 4187)).abs() <= 1, "row {} vs expected {}", row, y0 - 4187);
        assert!((col - (2869 - x0 + 1)).abs() <= 1, "col {} vs expected {}", col, 2869 - x0 + 1);
    }
}
