use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn px_extent_never_zero() {
    assert_eq!(px_extent(0.0), 1);
    assert_eq!(px_extent(f64::NAN), 1);
    assert_eq!(px_extent(2539.6), 2540);
}
