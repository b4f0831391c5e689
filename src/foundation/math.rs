pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Round a non-negative pixel extent, never returning zero.
pub(crate) fn px_extent(v: f64) -> u32 {
    if !v.is_finite() || v <= 1.0 {
        return 1;
    }
    v.round() as u32
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
