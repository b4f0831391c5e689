use super::*;

#[test]
fn premultiply_and_back_is_close() {
    let mut px = vec![200u8, 100, 50, 128, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    for (a, b) in px[..3].iter().zip([200u8, 100, 50]) {
        assert!((i32::from(*a) - i32::from(b)).abs() <= 2);
    }
}

#[test]
fn tint_replaces_color_keeps_alpha() {
    let mut px = vec![10u8, 200, 30, 255, 0, 0, 0, 0, 64, 64, 64, 128];
    tint_rgba8_premul_in_place(&mut px, Rgba8::rgb(255, 0, 0));
    assert_eq!(&px[0..4], &[255, 0, 0, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[128, 0, 0, 128]);
}

#[test]
fn mask_alpha_multiplies_source() {
    let src = [255u8, 255, 255, 255, 255, 255, 255, 255];
    let mask = [0u8, 0, 0, 255, 0, 0, 0, 0];
    let mut dst = [1u8; 8];
    mask_apply_alpha_rgba8_premul(&src, &mask, &mut dst);
    assert_eq!(dst, [255, 255, 255, 255, 0, 0, 0, 0]);
}

#[test]
fn over_opaque_replaces_destination() {
    let mut dst = vec![0u8, 0, 255, 255];
    premul_over_in_place(&mut dst, &[255, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![255, 0, 0, 255]);
    assert!(premul_over_in_place(&mut dst, &[0u8; 8]).is_err());
}

#[test]
fn over_at_offset_clips_to_destination() {
    let mut dst = vec![0u8; 3 * 3 * 4];
    let src = [255u8; 2 * 2 * 4];
    premul_over_at(&mut dst, 3, 3, &src, 2, 2, 2, 2).unwrap();
    let opaque: Vec<usize> = dst
        .chunks_exact(4)
        .enumerate()
        .filter(|(_, p)| p[3] == 255)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(opaque, vec![8]);
}

#[test]
fn opacity_scales_all_channels() {
    let mut px = vec![255u8, 255, 255, 255];
    opacity_rgba8_premul_in_place(&mut px, 0.5);
    assert_eq!(px, vec![128, 128, 128, 128]);
}

#[test]
fn blur_keeps_constant_image() {
    let src = [10u8, 20, 30, 40].repeat(12);
    let out = blur_rgba8_premul(&src, 4, 3, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();
    assert!(out.chunks_exact(4).filter(|p| p[3] != 0).count() > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|p| u32::from(p[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn blur_params_zero_is_identity() {
    assert_eq!(blur_params(0.0).0, 0);
    let (r, s) = blur_params(4.0);
    assert_eq!(s, 2.0);
    assert_eq!(r, 6);
}
