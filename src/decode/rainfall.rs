/// Rainfall-guidance feed decoding.
///
/// One guidance file interleaves two forecast cadences, each written as
/// its own run of monotonically increasing lead times. The boundary
/// between runs is detected by watching the running lead time: a
/// decrease means the next "loop" has begun. Within the loops, the
/// accumulation span distinguishes the products:
///
///   loop 1, span 1 — maximum 1-hour rainfall inside each 3-hour window
///   loop 2, span 3 — 3-hour accumulation totals
///
/// The loop heuristic is deliberately kept exactly as the legacy decoder
/// applies it; the layout is otherwise undocumented and a cleaner
/// reinterpretation risks silently reading the wrong cadence.

use log::debug;

use crate::model::{DecodeError, ForecastGridSet, ForecastStep};
use crate::reader::read_uint;

use super::header::parse_header;
use super::section::{decode_data_section, skip_data_sections};

/// Decodes a complete rainfall-guidance feed.
///
/// Both returned series are ordered by non-decreasing lead hours, with
/// each entry's `lead_hours` at its accumulation-window end.
///
/// # Errors
/// Any header or data-group decode error, plus `MissingField` when no
/// 3-hour total decodes — the simulation has nothing to step over.
pub fn decode_rainfall_feed(buf: &[u8]) -> Result<ForecastGridSet, DecodeError> {
    let (info, mut position, total_size) = parse_header(buf)?;

    let mut hourly_max = Vec::new();
    let mut three_hourly = Vec::new();
    let mut loop_index = 1u32;
    let mut prev_lead: i64 = 0;

    while position.saturating_add(4) < total_size {
        let section_size = read_uint(buf, position, 4) as usize;
        if section_size == 0 {
            return Err(DecodeError::SectionOverrun { section: 4, offset: position });
        }
        let span = read_uint(buf, position + 49, 4) as i64;
        let lead_hours = read_uint(buf, position + 18, 4) as i64 + span;
        if prev_lead > lead_hours {
            loop_index += 1;
        }
        position += section_size;

        let series = match (loop_index, span) {
            (1, 1) => Some(&mut hourly_max),
            (2, 3) => Some(&mut three_hourly),
            _ => None,
        };

        match series {
            Some(series) => {
                let (field, next) = decode_data_section(buf, position, info.grid_count)?;
                series.push(ForecastStep { lead_hours: lead_hours as i32, field });
                position = next;
            }
            None => {
                debug!(
                    "skipping guidance section: loop {}, span {}, lead {}h",
                    loop_index, span, lead_hours
                );
                position = skip_data_sections(buf, position)?;
            }
        }

        prev_lead = lead_hours;
    }

    if three_hourly.is_empty() {
        return Err(DecodeError::MissingField("three-hourly rainfall"));
    }

    Ok(ForecastGridSet { info, hourly_max, three_hourly })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
