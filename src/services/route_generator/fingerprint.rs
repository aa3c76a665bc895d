//! Compact identity for a route geometry, used to spot repeats across requests.
//!
//! Every fifth point is rounded to four decimals and serialized as
//! `[[lng,lat],...]` with shortest number formatting (`37`, not `37.0`), then
//! hashed with djb2 over 32-bit wrapping arithmetic and rendered in base 36.
//! Equal geometries always hash equal; the output is stable across processes.

use crate::constants::{FINGERPRINT_DECIMAL_PLACES, FINGERPRINT_SAMPLE_STRIDE};
use crate::models::coordinates::round_half_up;
use crate::models::RoutePoint;
use std::fmt::Write;

const DJB2_INITIAL: u32 = 5381;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn compute_fingerprint(points: &[RoutePoint]) -> String {
    base36(djb2(&sampled_json(points)))
}

/// Canonical text form of the sampled geometry.
pub fn sampled_json(points: &[RoutePoint]) -> String {
    let mut out = String::from("[");
    for (i, point) in points.iter().step_by(FINGERPRINT_SAMPLE_STRIDE).enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(
            out,
            "[{},{}]",
            format_number(point.lng),
            format_number(point.lat)
        );
    }
    out.push(']');
    out
}

fn format_number(value: f64) -> String {
    let rounded = round_half_up(value, FINGERPRINT_DECIMAL_PLACES);
    if rounded == 0.0 {
        // Covers -0.0
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn djb2(input: &str) -> u32 {
    // UTF-16 code units; the serialized form is ASCII so this equals the bytes
    input
        .encode_utf16()
        .fold(DJB2_INITIAL, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

fn base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
