/// Soil-water-index feed decoding.
///
/// After the header, the feed carries product-definition sections each
/// followed by a representation/bitmap/data group. Three products are
/// expected: the soil-water index itself (kind 200) and the first and
/// second tank storages (kind 201, ordinals 1 and 2). Anything else is
/// skipped section-by-section so the cursor stays aligned.

use log::debug;

use crate::model::{DecodeError, DecodedGridSet};
use crate::reader::read_uint;

use super::header::parse_header;
use super::section::{decode_data_section, skip_data_sections};

/// Product kind of the soil-water-index field.
const KIND_SOIL_INDEX: u64 = 200;

/// Product kind of the tank-storage fields (distinguished by ordinal).
const KIND_TANK: u64 = 201;

/// Decodes a complete soil-water-index feed.
///
/// # Errors
/// Any header or data-group decode error, plus `MissingField` when the
/// feed ends without all three expected fields — a partial soil state
/// cannot seed the simulation.
pub fn decode_soil_feed(buf: &[u8]) -> Result<DecodedGridSet, DecodeError> {
    let (info, mut position, total_size) = parse_header(buf)?;

    let mut soil = None;
    let mut first_tank = None;
    let mut second_tank = None;

    while total_size.saturating_sub(position) > 4 {
        let section_size = read_uint(buf, position, 4) as usize;
        if section_size == 0 {
            return Err(DecodeError::SectionOverrun { section: 4, offset: position });
        }
        let kind = read_uint(buf, position + 22, 1);
        let ordinal = read_uint(buf, position + 24, 4);
        position += section_size;

        let target = match (kind, ordinal) {
            (KIND_SOIL_INDEX, _) => Some(&mut soil),
            (KIND_TANK, 1) => Some(&mut first_tank),
            (KIND_TANK, 2) => Some(&mut second_tank),
            _ => None,
        };

        match target {
            Some(slot) => {
                let (values, next) = decode_data_section(buf, position, info.grid_count)?;
                *slot = Some(values);
                position = next;
            }
            None => {
                debug!("skipping product kind {} ordinal {} in soil feed", kind, ordinal);
                position = skip_data_sections(buf, position)?;
            }
        }
    }

    Ok(DecodedGridSet {
        info,
        soil: soil.ok_or(DecodeError::MissingField("soil index"))?,
        first_tank: first_tank.ok_or(DecodeError::MissingField("first tank"))?,
        second_tank: second_tank.ok_or(DecodeError::MissingField("second tank"))?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::fixtures::*;

    #[test]
    fn test_decode_extracts_all_three_fields() {
        let set = decode_soil_feed(&fixture_soil_feed()).expect("fixture should decode");

        assert_eq!(set.soil, vec![200.0, 150.0, 100.0, 50.0]);
        assert_eq!(set.first_tank, vec![200.0, 120.0, 80.0, 40.0]);
        assert_eq!(set.second_tank, vec![0.0, 20.0, 15.0, 5.0]);
    }

    #[test]
    fn test_every_field_has_grid_count_values() {
        let set = decode_soil_feed(&fixture_soil_feed()).expect("fixture should decode");
        assert_eq!(set.soil.len(), set.info.grid_count);
        assert_eq!(set.first_tank.len(), set.info.grid_count);
        assert_eq!(set.second_tank.len(), set.info.grid_count);
    }

    #[test]
    fn test_unknown_product_is_skipped_without_desync() {
        let set = decode_soil_feed(&fixture_soil_feed_with_unknown_product())
            .expect("unknown products must not break the walk");
        assert_eq!(set.soil, vec![200.0, 150.0, 100.0, 50.0]);
        assert_eq!(set.second_tank, vec![0.0, 20.0, 15.0, 5.0]);
    }

    #[test]
    fn test_missing_tank_field_is_an_error() {
        let result = decode_soil_feed(&fixture_soil_feed_missing_tank());
        assert_eq!(result.unwrap_err(), DecodeError::MissingField("second tank"));
    }

    #[test]
    fn test_corrupt_symbol_aborts_the_feed() {
        let result = decode_soil_feed(&fixture_soil_feed_corrupt_symbol());
        assert!(
            matches!(result, Err(DecodeError::SymbolOutOfRange { symbol: 250, .. })),
            "symbol above level count must abort, got {:?}",
            result
        );
    }
}
