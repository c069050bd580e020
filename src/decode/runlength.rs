/// Run-length symbol stream expansion.
///
/// The data section encodes grid values as a stream of fixed-width
/// big-endian symbols. A symbol `d <= level_max` selects the physical
/// value `level[d]`; symbols above `level_max` are repeat-count digits
/// for the preceding value, combined in a mixed-radix expansion with base
/// `LNGU = 2^bits - 1 - level_max`. Repeat counts use exact integer
/// arithmetic throughout — grids can exceed four million cells and
/// `LNGU^p` grows quickly.

use crate::model::DecodeError;
use crate::reader::read_uint;

/// Expands the symbol stream in `buf[start..end)` into exactly
/// `grid_count` values.
///
/// `level` maps value symbols to physical values; symbols beyond the
/// table emit 0. Output cells the stream does not reach stay 0 (the
/// shortfall is zero-padded). Emission also stops once `grid_count`
/// values exist, whichever comes first.
///
/// # Errors
/// - `UnsupportedSymbolWidth` — `bits_per_symbol` is not a whole number
///   of bytes between 1 and 4.
/// - `SymbolOutOfRange` — a value symbol above `level_count`; the stream
///   is corrupt or the cursor is misaligned, and continuing would
///   desynchronize every following section.
pub fn expand(
    buf: &[u8],
    start: usize,
    end: usize,
    bits_per_symbol: u64,
    level_max: u64,
    level_count: u64,
    level: &[i32],
    grid_count: usize,
) -> Result<Vec<f64>, DecodeError> {
    if bits_per_symbol == 0 || bits_per_symbol % 8 != 0 || bits_per_symbol > 32 {
        return Err(DecodeError::UnsupportedSymbolWidth(bits_per_symbol));
    }
    let width = (bits_per_symbol / 8) as usize;
    // Mixed-radix base for repeat-count digits.
    let lngu = (1u64 << bits_per_symbol) - 1 - level_max;

    let end = end.min(buf.len());
    let mut out = vec![0.0f64; grid_count];
    let mut emitted = 0usize;
    let mut p = start;

    while p + width <= end && emitted < grid_count {
        let d = read_uint(buf, p, width);
        if d > level_count {
            return Err(DecodeError::SymbolOutOfRange { offset: p, symbol: d, level_count });
        }
        p += width;

        let value = level.get(d as usize).copied().map_or(0.0, f64::from);

        // Peek at the next symbol: a value symbol means `d` stands alone,
        // anything above level_max starts a repeat-count digit run.
        let mut repeat: u64 = 1;
        if p + width <= end {
            let mut dd = read_uint(buf, p, width);
            if dd > level_max {
                let mut run_length: u64 = 0;
                let mut place: u64 = 1; // LNGU^p for the current digit
                loop {
                    run_length = run_length.saturating_add(place.saturating_mul(dd - level_max - 1));
                    p += width;
                    if p + width > end {
                        break;
                    }
                    dd = read_uint(buf, p, width);
                    if dd <= level_max {
                        // Not consumed: this symbol is the next iteration's
                        // value symbol.
                        break;
                    }
                    place = place.saturating_mul(lngu);
                }
                repeat = run_length.saturating_add(1);
            }
        }

        let take = usize::try_from(repeat)
            .unwrap_or(usize::MAX)
            .min(grid_count - emitted);
        out[emitted..emitted + take].fill(value);
        emitted += take;
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
