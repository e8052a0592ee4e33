use super::*;

fn at(kind: AnimationKind, p: f64) -> Transform {
    resolve(kind, Progress::new(p))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn zoom_in_midpoint() {
    let t = at(AnimationKind::ZoomIn, 0.5);
    assert!(approx(t.scale_x, 1.075));
    assert!(approx(t.scale_y, 1.075));
    assert_eq!(t.opacity, 1.0);
}

#[test]
fn pans_sweep_full_range() {
    assert!(approx(at(AnimationKind::PanLeftRight, 0.0).translate_x, 80.0));
    assert!(approx(at(AnimationKind::PanLeftRight, 0.5).translate_x, 0.0));
    assert!(approx(at(AnimationKind::PanRightLeft, 0.75).translate_x, 40.0));
    let tb = at(AnimationKind::PanTopBottom, 0.25);
    assert!(approx(tb.translate_y, 60.0));
    assert!(approx(tb.scale_x, 1.2));
}

#[test]
fn fade_ramps_in_and_out() {
    assert!((at(AnimationKind::Fade, 0.05).opacity - 1.0 / 3.0).abs() < 1e-6);
    assert!(approx(at(AnimationKind::Fade, 0.5).opacity, 1.0));
    assert!((at(AnimationKind::Fade, 0.92).opacity - 0.08 / 0.15).abs() < 1e-6);
    assert!(approx(at(AnimationKind::Fade, 0.0).opacity, 0.0));
}

#[test]
fn pop_holds_after_ramp() {
    assert!(approx(at(AnimationKind::Pop, 0.05).scale_x, 1.025));
    assert!(approx(at(AnimationKind::Pop, 0.1).scale_x, 1.05));
    assert!(approx(at(AnimationKind::Pop, 0.9).scale_x, 1.05));
}

#[test]
fn zoom_rotate_reaches_three_degrees() {
    let t = at(AnimationKind::ZoomRotate, 1.0 - 1e-12);
    assert!((t.rotation_rad - 3f64.to_radians()).abs() < 1e-9);
}

#[test]
fn looping_kinds_meet_at_the_seam() {
    for kind in [AnimationKind::Breathe, AnimationKind::Tilt] {
        let start = at(kind, 0.0);
        let end = at(kind, 1.0 - 1e-9);
        assert!((start.scale_x - end.scale_x).abs() < 1e-6, "{kind}");
        assert!((start.rotation_rad - end.rotation_rad).abs() < 1e-6, "{kind}");
    }
    let start = at(AnimationKind::Parallax, 0.0);
    let end = at(AnimationKind::Parallax, 1.0 - 1e-9);
    assert!((start.translate_x - end.translate_x).abs() < 1e-6);
}

#[test]
fn text_and_unknown_kinds() {
    assert_eq!(at(AnimationKind::Unknown, 0.3), Transform::IDENTITY);
    assert_eq!(
        at(AnimationKind::Typewriter, 0.3),
        at(AnimationKind::ZoomIn, 0.3)
    );
    assert_eq!(at(AnimationKind::FadeUp, 0.0), Transform::IDENTITY);
}

#[test]
fn identity_affine_is_identity() {
    let a = Transform::IDENTITY.to_affine(Point::new(540.0, 960.0));
    let p = a * Point::new(12.0, 34.0);
    assert!((p.x - 12.0).abs() < 1e-9 && (p.y - 34.0).abs() < 1e-9);
}

#[test]
fn scale_keeps_center_fixed() {
    let c = Point::new(540.0, 960.0);
    let a = at(AnimationKind::ZoomOut, 0.0).to_affine(c);
    let p = a * c;
    assert!((p.x - c.x).abs() < 1e-9 && (p.y - c.y).abs() < 1e-9);
    let corner = a * Point::new(0.0, 0.0);
    assert!((corner.x - (540.0 - 540.0 * 1.15)).abs() < 1e-9);
}

#[test]
fn motion_selection_order() {
    assert_eq!(text_motion(AnimationKind::ZoomIn, "cinematic"), TextMotion::FadeUp);
    assert_eq!(text_motion(AnimationKind::Pop, "hype"), TextMotion::Typewriter);
    assert_eq!(text_motion(AnimationKind::FadeUp, "hype"), TextMotion::FadeUp);
    assert_eq!(
        text_motion(AnimationKind::Typewriter, "minimal"),
        TextMotion::Typewriter
    );
}

#[test]
fn typewriter_is_monotonic_and_completes() {
    let mut last = 0;
    for i in 0..40 {
        let p = Progress::new(f64::from(i) / 100.0);
        match resolve_reveal(TextMotion::Typewriter, p, 20) {
            RevealState::Typed { visible_chars } => {
                assert!(visible_chars >= last);
                assert!(visible_chars <= 20);
                last = visible_chars;
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(
        resolve_reveal(TextMotion::Typewriter, Progress::new(0.2), 20),
        RevealState::Typed { visible_chars: 10 }
    );
    assert_eq!(
        resolve_reveal(TextMotion::Typewriter, Progress::new(0.4), 20),
        RevealState::Full
    );
}

#[test]
fn fade_up_settles_after_a_fifth() {
    match resolve_reveal(TextMotion::FadeUp, Progress::new(0.1), 5) {
        RevealState::Faded { opacity, offset_y } => {
            assert!((opacity - 0.5).abs() < 1e-9);
            assert!((offset_y - 50.0).abs() < 1e-9);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        resolve_reveal(TextMotion::FadeUp, Progress::new(0.25), 5),
        RevealState::Full
    );
}
