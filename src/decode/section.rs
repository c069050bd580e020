/// Data-block handling shared by both feeds: the data-representation,
/// bitmap and data sections that follow every product definition.

use crate::model::DecodeError;
use crate::reader::read_uint;

use super::runlength;

/// Decodes one data-representation + bitmap + data section group starting
/// at `position`, producing exactly `grid_count` values and the offset of
/// the section that follows.
///
/// The data-representation section carries the symbol width, the level
/// bounds and a table of signed 16-bit physical values (two's complement:
/// entries at or above 2^15 have 2^16 subtracted). The bitmap section is
/// skipped. The data section's byte range feeds the run-length expansion.
pub fn decode_data_section(
    buf: &[u8],
    position: usize,
    grid_count: usize,
) -> Result<(Vec<f64>, usize), DecodeError> {
    // Data-representation section.
    let section_size = read_uint(buf, position, 4) as usize;
    if section_size == 0 {
        return Err(DecodeError::SectionOverrun { section: 5, offset: position });
    }
    let bits_per_symbol = read_uint(buf, position + 11, 1);
    let level_max = read_uint(buf, position + 12, 2);
    let level_count = read_uint(buf, position + 14, 2);

    let mut level = vec![0i32; level_max as usize + 1];
    for (i, entry) in level.iter_mut().enumerate().skip(1) {
        let mut value = read_uint(buf, position + 15 + 2 * i, 2) as i64;
        if value >= 1 << 15 {
            value -= 1 << 16;
        }
        *entry = value as i32;
    }
    let position = position + section_size;

    // Bitmap section: present in the layout but never applied.
    let section_size = read_uint(buf, position, 4) as usize;
    if section_size == 0 {
        return Err(DecodeError::SectionOverrun { section: 6, offset: position });
    }
    let position = position + section_size;

    // Data section.
    let section_size = read_uint(buf, position, 4) as usize;
    if section_size == 0 {
        return Err(DecodeError::SectionOverrun { section: 7, offset: position });
    }
    let values = runlength::expand(
        buf,
        position + 5,
        position + section_size,
        bits_per_symbol,
        level_max,
        level_count,
        &level,
        grid_count,
    )?;

    Ok((values, position + section_size))
}

/// Advances past one data-representation + bitmap + data section group
/// without decoding, returning the offset of the section that follows.
pub fn skip_data_sections(buf: &[u8], position: usize) -> Result<usize, DecodeError> {
    let mut position = position;
    for section in [5u8, 6, 7] {
        let section_size = read_uint(buf, position, 4) as usize;
        if section_size == 0 {
            return Err(DecodeError::SectionOverrun { section, offset: position });
        }
        position += section_size;
    }
    Ok(position)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
