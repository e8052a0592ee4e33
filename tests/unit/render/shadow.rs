use super::*;

#[test]
fn kernel_sums_to_one_q16() {
    for (r, s) in [(1, 0.5), (5, 2.0), (30, 10.0)] {
        let k = gaussian_kernel_q16(r, s).unwrap();
        assert_eq!(k.len(), (2 * r + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
        assert!(k[r as usize] >= k[0]);
    }
    assert_eq!(gaussian_kernel_q16(0, 1.0).unwrap(), vec![65536]);
    assert!(gaussian_kernel_q16(3, 0.0).is_err());
}

#[test]
fn overlay_shadow_parameters() {
    let s = DropShadow::overlay();
    assert_eq!(s.sigma(), 10.0);
    assert_eq!(s.radius(), 30);
    assert_eq!(s.color.a, 204);
    assert_eq!(s.offset, Vec2::new(0.0, 4.0));
}

#[test]
fn blur_spreads_a_single_dot() {
    let (w, h) = (21u32, 21u32);
    let mut mask = vec![0u8; (w * h) as usize];
    mask[(10 * w + 10) as usize] = 255;
    let shadow = DropShadow {
        blur: 4.0,
        ..DropShadow::overlay()
    };
    let mut out = Vec::new();
    ShadowBlur::default()
        .blur_mask(&mask, &mut out, w, h, &shadow)
        .unwrap();
    let center = out[(10 * w + 10) as usize];
    assert!(center < 255 && center > 0);
    assert!(out[(10 * w + 11) as usize] > 0);
    assert_eq!(out[0], 0);
}

#[test]
fn blur_rejects_wrong_mask_size() {
    let mut out = Vec::new();
    let err = ShadowBlur::default().blur_mask(&[0; 3], &mut out, 2, 2, &DropShadow::overlay());
    assert!(err.is_err());
}

#[test]
fn uniform_mask_stays_uniform() {
    let mask = vec![200u8; 16 * 8];
    let mut out = Vec::new();
    ShadowBlur::default()
        .blur_mask(&mask, &mut out, 16, 8, &DropShadow::overlay())
        .unwrap();
    assert!(out.iter().all(|&v| v == 200));
}

#[test]
fn composite_clips_and_blends() {
    let mut dst = vec![0u8, 0, 0, 255].repeat(4);
    let mask = vec![255u8, 128, 255, 0];
    let white = Rgba8Premul::from_straight_rgba(255, 255, 255, 255);
    composite_mask_over(&mut dst, 2, 2, &mask, 2, 2, 1, 0, white);
    assert_eq!(&dst[0..4], &[0, 0, 0, 255]);
    assert_eq!(&dst[4..8], &[255, 255, 255, 255]);
    assert_eq!(&dst[8..12], &[0, 0, 0, 255]);
    assert_eq!(&dst[12..16], &[255, 255, 255, 255]);

    let mut dst = vec![0u8; 4];
    composite_mask_over(&mut dst, 1, 1, &[255], 1, 1, -1, 0, white);
    assert_eq!(dst, vec![0, 0, 0, 0]);
}

#[test]
fn alpha_mask_takes_fourth_channel() {
    let mut out = Vec::new();
    alpha_mask(&[1, 2, 3, 4, 5, 6, 7, 8], &mut out);
    assert_eq!(out, vec![4, 8]);
}
