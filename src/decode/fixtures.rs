/// Test fixtures: synthetic binary feeds exercising the full section
/// layout.
///
/// Real feeds run to megabytes and cover millions of cells, so tests
/// build miniature ones: a 2x2 grid with one-degree spacing, the same
/// section skeleton (indicator, identification, grid definition, then
/// product/representation/bitmap/data groups per field, end marker), and
/// cell values chosen so each scenario's expected output can be computed
/// by hand.
///
/// Grid of every fixture:
///   start (NW) corner 36.0N 135.0E, 1.0-degree spacing, 2 columns x
///   2 rows, cells indexed row-major from the NW corner.

/// NW-corner latitude of the fixture grid, micro-degrees.
pub(crate) const FIXTURE_START_LAT: i64 = 36_000_000;

/// NW-corner longitude of the fixture grid, micro-degrees.
pub(crate) const FIXTURE_START_LON: i64 = 135_000_000;

/// Grid spacing of the fixture grid, micro-degrees (1.0 degree).
pub(crate) const FIXTURE_DELTA: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Section builders
// ---------------------------------------------------------------------------

fn push_uint(buf: &mut Vec<u8>, value: u64, width: usize) {
    for shift in (0..width).rev() {
        buf.push((value >> (shift * 8)) as u8);
    }
}

fn put_uint(buf: &mut [u8], offset: usize, value: u64, width: usize) {
    for (i, shift) in (0..width).rev().enumerate() {
        buf[offset + i] = (value >> (shift * 8)) as u8;
    }
}

/// Identification section (21 bytes): feed reference time.
pub(crate) fn identification_section(
    year: u64,
    month: u64,
    day: u64,
    hour: u64,
    minute: u64,
    second: u64,
) -> Vec<u8> {
    let mut s = vec![0u8; 21];
    put_uint(&mut s, 0, 21, 4);
    s[4] = 1;
    put_uint(&mut s, 12, year, 2);
    s[14] = month as u8;
    s[15] = day as u8;
    s[16] = hour as u8;
    s[17] = minute as u8;
    s[18] = second as u8;
    s
}

/// Grid-definition section (72 bytes) for the standard 2x2 fixture grid.
pub(crate) fn grid_section_2x2() -> Vec<u8> {
    grid_section(
        4,
        2,
        2,
        FIXTURE_START_LAT,
        FIXTURE_START_LON,
        FIXTURE_START_LAT - FIXTURE_DELTA,
        FIXTURE_START_LON + FIXTURE_DELTA,
        FIXTURE_DELTA,
        FIXTURE_DELTA,
    )
}

pub(crate) fn grid_section(
    grid_count: u64,
    x_count: u64,
    y_count: u64,
    start_lat: i64,
    start_lon: i64,
    end_lat: i64,
    end_lon: i64,
    delta_lon: i64,
    delta_lat: i64,
) -> Vec<u8> {
    let mut s = vec![0u8; 72];
    put_uint(&mut s, 0, 72, 4);
    s[4] = 3;
    put_uint(&mut s, 6, grid_count, 4);
    put_uint(&mut s, 30, x_count, 4);
    put_uint(&mut s, 34, y_count, 4);
    put_uint(&mut s, 46, start_lat as u64, 4);
    put_uint(&mut s, 50, start_lon as u64, 4);
    put_uint(&mut s, 55, end_lat as u64, 4);
    put_uint(&mut s, 59, end_lon as u64, 4);
    put_uint(&mut s, 63, delta_lon as u64, 4);
    put_uint(&mut s, 67, delta_lat as u64, 4);
    s
}

/// Product-definition section of the soil feed (34 bytes): product kind
/// at +22, tank ordinal at +24.
pub(crate) fn product_section_soil(kind: u64, ordinal: u64) -> Vec<u8> {
    let mut s = vec![0u8; 34];
    put_uint(&mut s, 0, 34, 4);
    s[4] = 4;
    s[22] = kind as u8;
    put_uint(&mut s, 24, ordinal, 4);
    s
}

/// Product-definition section of the rainfall feed (58 bytes): lead time
/// at +18, accumulation span at +49. The decoded `lead_hours` is
/// `lead + span`.
pub(crate) fn product_section_rain(lead: u64, span: u64) -> Vec<u8> {
    let mut s = vec![0u8; 58];
    put_uint(&mut s, 0, 58, 4);
    s[4] = 4;
    put_uint(&mut s, 18, lead, 4);
    put_uint(&mut s, 49, span, 4);
    s
}

/// Data-representation + bitmap + data group with an arbitrary symbol
/// payload. `levels` populates table entries 1..=len in order; negative
/// values are stored as 16-bit two's complement.
pub(crate) fn data_section_group_with_payload(levels: &[i32], payload: &[u8]) -> Vec<u8> {
    let level_max = levels.len() as u64;
    let mut group = Vec::new();

    // Data-representation section.
    let size5 = 17 + 2 * levels.len();
    let mut s5 = vec![0u8; size5];
    put_uint(&mut s5, 0, size5 as u64, 4);
    s5[4] = 5;
    s5[11] = 8; // bits per symbol
    put_uint(&mut s5, 12, level_max, 2);
    put_uint(&mut s5, 14, level_max, 2); // level_count == level_max here
    for (i, &value) in levels.iter().enumerate() {
        put_uint(&mut s5, 15 + 2 * (i + 1), (value as i64 & 0xFFFF) as u64, 2);
    }
    group.extend_from_slice(&s5);

    // Bitmap section, skipped by the decoder.
    group.extend_from_slice(&[0, 0, 0, 6, 6, 0xFF]);

    // Data section.
    push_uint(&mut group, 5 + payload.len() as u64, 4);
    group.push(7);
    group.extend_from_slice(payload);
    group
}

/// Data group for a list of cell values drawn from `levels`, run-length
/// encoding consecutive repeats the way the feeds do.
pub(crate) fn data_section_group(levels: &[i32], cells: &[i32]) -> Vec<u8> {
    data_section_group_with_payload(levels, &encode_cells(levels, cells))
}

/// Encodes cells as value symbols plus mixed-radix repeat digits.
fn encode_cells(levels: &[i32], cells: &[i32]) -> Vec<u8> {
    let level_max = levels.len() as u64;
    let base = 255 - level_max;
    let symbol_of = |cell: i32| -> u8 {
        match levels.iter().position(|&v| v == cell) {
            Some(i) => (i + 1) as u8,
            // Symbol 0 is the implicit zero level.
            None if cell == 0 => 0,
            None => panic!("cell value {} must appear in the level table", cell),
        }
    };

    let mut payload = Vec::new();
    let mut i = 0;
    while i < cells.len() {
        let mut run = 1usize;
        while i + run < cells.len() && cells[i + run] == cells[i] {
            run += 1;
        }
        payload.push(symbol_of(cells[i]));
        let mut extra = (run - 1) as u64;
        while extra > 0 {
            payload.push((level_max + 1 + extra % base) as u8);
            extra /= base;
        }
        i += run;
    }
    payload
}

/// Assembles an indicator section, the given sections and the end marker
/// into one feed, patching the declared total length.
pub(crate) fn assemble_feed(sections: &[Vec<u8>]) -> Vec<u8> {
    let body: usize = sections.iter().map(Vec::len).sum();
    let mut feed = Vec::with_capacity(16 + body + 4);
    feed.extend_from_slice(b"GRIB");
    feed.extend_from_slice(&[0; 4]);
    push_uint(&mut feed, (16 + body + 4) as u64, 8);
    for section in sections {
        feed.extend_from_slice(section);
    }
    feed.extend_from_slice(b"7777");
    feed
}

// ---------------------------------------------------------------------------
// Feed-level fixtures
// ---------------------------------------------------------------------------

/// Soil feed over the 2x2 grid, reference time 2023-06-02 00:00:00.
///
/// Cell 0 decodes to soil 200 / first tank 200 / second tank 0 — tank
/// state (20, 0, 0) after the tenth-scale division, the hand-computed
/// simulation scenario. Cell 3 is a second live mesh.
pub(crate) fn fixture_soil_feed() -> Vec<u8> {
    assemble_feed(&[
        identification_section(2023, 6, 2, 0, 0, 0),
        grid_section_2x2(),
        product_section_soil(200, 0),
        data_section_group(&[200, 150, 100, 50], &[200, 150, 100, 50]),
        product_section_soil(201, 1),
        data_section_group(&[200, 120, 80, 40], &[200, 120, 80, 40]),
        product_section_soil(201, 2),
        data_section_group(&[20, 15, 5], &[0, 20, 15, 5]),
    ])
}

/// Soil feed with an unrecognized product interleaved before the three
/// known fields; the decoder must skip its data group without losing the
/// cursor.
pub(crate) fn fixture_soil_feed_with_unknown_product() -> Vec<u8> {
    assemble_feed(&[
        identification_section(2023, 6, 2, 0, 0, 0),
        grid_section_2x2(),
        product_section_soil(205, 0),
        data_section_group(&[1, 2], &[1, 2, 2, 1]),
        product_section_soil(200, 0),
        data_section_group(&[200, 150, 100, 50], &[200, 150, 100, 50]),
        product_section_soil(201, 1),
        data_section_group(&[200, 120, 80, 40], &[200, 120, 80, 40]),
        product_section_soil(201, 2),
        data_section_group(&[20, 15, 5], &[0, 20, 15, 5]),
    ])
}

/// Soil feed that ends before the second-tank field appears.
pub(crate) fn fixture_soil_feed_missing_tank() -> Vec<u8> {
    assemble_feed(&[
        identification_section(2023, 6, 2, 0, 0, 0),
        grid_section_2x2(),
        product_section_soil(200, 0),
        data_section_group(&[200, 150, 100, 50], &[200, 150, 100, 50]),
        product_section_soil(201, 1),
        data_section_group(&[200, 120, 80, 40], &[200, 120, 80, 40]),
    ])
}

/// Soil feed whose first data section opens with a symbol above the
/// declared level count.
pub(crate) fn fixture_soil_feed_corrupt_symbol() -> Vec<u8> {
    assemble_feed(&[
        identification_section(2023, 6, 2, 0, 0, 0),
        grid_section_2x2(),
        product_section_soil(200, 0),
        data_section_group_with_payload(&[200, 150], &[250, 1]),
    ])
}

/// Rainfall-guidance feed over the 2x2 grid, reference time
/// 2023-06-02 00:00:00, with both cadence loops:
///
///   loop 1 (window-max, span 1): lead_hours 3 and 6, plus one span-3
///   section at lead_hours 5 that must be skipped;
///   loop 2 (3-hour totals, span 3): lead_hours 3 and 6.
///
/// Cell 0 sees window maxima [0, 8] and totals [0, 10] — the inputs of
/// the hand-computed hourly reconstruction (flanks (10-8)/2 = 1).
pub(crate) fn fixture_guidance_feed() -> Vec<u8> {
    assemble_feed(&[
        identification_section(2023, 6, 2, 0, 0, 0),
        grid_section_2x2(),
        // Loop 1: native window-max series.
        product_section_rain(2, 1),
        data_section_group(&[1, 2, 3], &[0, 1, 2, 3]),
        product_section_rain(2, 3), // span 3 inside loop 1: skipped
        data_section_group(&[9], &[9, 9, 9, 9]),
        product_section_rain(5, 1),
        data_section_group(&[8, 2, 1], &[8, 2, 1, 0]),
        // Lead time drops: loop 2, the 3-hour totals.
        product_section_rain(0, 3),
        data_section_group(&[3, 4, 6], &[0, 3, 4, 6]),
        product_section_rain(3, 3),
        data_section_group(&[10, 4, 2, 1], &[10, 4, 2, 1]),
    ])
}
