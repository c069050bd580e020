/// Feed header parsing: indicator, identification and grid-definition
/// sections.
///
/// Field widths and offsets are part of the external file-format contract
/// and must not be altered. All offsets below are 0-based byte positions
/// relative to the start of the section unless noted.

use chrono::NaiveDate;

use crate::model::{DecodeError, GridInfo};
use crate::reader::read_uint;

/// Byte length of the fixed indicator section at the start of a feed.
const INDICATOR_LEN: usize = 16;

/// Offset of the total feed byte length inside the indicator section.
const TOTAL_SIZE_OFFSET: usize = 8;

/// Parses the fixed preamble of a feed.
///
/// Returns the grid metadata, the offset of the first product-definition
/// section, and the total byte length declared by the file (which
/// includes the trailing 4-byte end marker).
///
/// # Errors
/// - `SectionOverrun` — a zero section length, meaning the buffer is
///   truncated before the header completes.
/// - `InvalidTimestamp` — the identification section's date fields do
///   not form a calendar timestamp.
/// - `InconsistentGrid` — the declared cell count is not `x * y`.
pub fn parse_header(buf: &[u8]) -> Result<(GridInfo, usize, usize), DecodeError> {
    let total_size = read_uint(buf, TOTAL_SIZE_OFFSET, 8) as usize;
    if total_size == 0 {
        return Err(DecodeError::SectionOverrun { section: 0, offset: TOTAL_SIZE_OFFSET });
    }
    let mut position = INDICATOR_LEN;

    // Identification section: reference date/time of the feed.
    let section_size = read_uint(buf, position, 4) as usize;
    if section_size == 0 {
        return Err(DecodeError::SectionOverrun { section: 1, offset: position });
    }
    let year = read_uint(buf, position + 12, 2);
    let month = read_uint(buf, position + 14, 1);
    let day = read_uint(buf, position + 15, 1);
    let hour = read_uint(buf, position + 16, 1);
    let minute = read_uint(buf, position + 17, 1);
    let second = read_uint(buf, position + 18, 1);

    let initial_time = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|d| d.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or(DecodeError::InvalidTimestamp { year, month, day })?;
    position += section_size;

    // Grid-definition section.
    let section_size = read_uint(buf, position, 4) as usize;
    if section_size == 0 {
        return Err(DecodeError::SectionOverrun { section: 3, offset: position });
    }
    let grid_count = read_uint(buf, position + 6, 4) as usize;
    let x_count = read_uint(buf, position + 30, 4) as usize;
    let y_count = read_uint(buf, position + 34, 4) as usize;
    let start_lat = read_uint(buf, position + 46, 4) as i64;
    let start_lon = read_uint(buf, position + 50, 4) as i64;
    let end_lat = read_uint(buf, position + 55, 4) as i64;
    let end_lon = read_uint(buf, position + 59, 4) as i64;
    let delta_lon = read_uint(buf, position + 63, 4) as i64;
    let delta_lat = read_uint(buf, position + 67, 4) as i64;
    position += section_size;

    if grid_count != x_count * y_count {
        return Err(DecodeError::InconsistentGrid { grid_count, x_count, y_count });
    }

    let info = GridInfo {
        initial_time,
        grid_count,
        x_count,
        y_count,
        start_lat,
        start_lon,
        end_lat,
        end_lon,
        delta_lat,
        delta_lon,
    };

    Ok((info, position, total_size))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
