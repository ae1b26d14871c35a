//! Time suffixes: how long a note lasts relative to a quarter note.
//!
//! A quarter is unmarked. Each halving below a quarter adds a `/`, each
//! extra quarter adds a sustain dash ` -`, and exactly one and a half
//! quarters is a dotted `.`.

use super::constants::*;
use crate::error::JianpuError;

/// Upper bound on halvings and sustain steps before a duration is rejected.
/// Durations that are not built from halvings and quarters cycle forever.
const MAX_STEPS: usize = 64;

/// Encode `duration` (in units where a quarter is `divisions`) as a time suffix.
///
/// Equivalent to the recursive definition
/// `d < q => f(2d) + "/"`, `d == q => ""`, `2d == 3q => "."`,
/// otherwise `" -" + f(d - q)`, unrolled into sustain prefix + core + slashes.
pub fn time_suffix(duration: i64, divisions: i64) -> Result<String, JianpuError> {
    let invalid = || JianpuError::InvalidDuration { duration, divisions };
    if duration <= 0 || divisions <= 0 {
        return Err(invalid());
    }

    let mut d = duration;
    let mut sustains = 0;
    let mut subdivisions = 0;

    for _ in 0..MAX_STEPS {
        if d < divisions {
            d *= 2;
            subdivisions += 1;
        } else if d == divisions {
            return Ok(assemble(sustains, false, subdivisions));
        } else if d * 2 == divisions * 3 {
            return Ok(assemble(sustains, true, subdivisions));
        } else {
            d -= divisions;
            sustains += 1;
        }
    }
    Err(invalid())
}

fn assemble(sustains: usize, dotted: bool, subdivisions: usize) -> String {
    let mut out = SUSTAIN.repeat(sustains);
    if dotted {
        out.push_str(DOTTED);
    }
    out.push_str(&SUBDIVISION.repeat(subdivisions));
    out
}
