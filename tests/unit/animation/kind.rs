use super::*;

#[test]
fn parse_accepts_known_spellings() {
    assert_eq!(AnimationKind::parse("zoom-in"), AnimationKind::ZoomIn);
    assert_eq!(AnimationKind::parse("zoom_in"), AnimationKind::ZoomIn);
    assert_eq!(AnimationKind::parse("PAN_TOP_BOTTOM"), AnimationKind::PanTopBottom);
    assert_eq!(
        AnimationKind::parse("text_typewriter"),
        AnimationKind::Typewriter
    );
    assert_eq!(AnimationKind::parse("text-fade-up"), AnimationKind::FadeUp);
}

#[test]
fn parse_unknown_never_fails() {
    assert_eq!(AnimationKind::parse(""), AnimationKind::Unknown);
    assert_eq!(AnimationKind::parse("pan_bottom_top"), AnimationKind::Unknown);
    assert_eq!(AnimationKind::parse("warp-speed"), AnimationKind::Unknown);
}

#[test]
fn names_round_trip_for_all_known_kinds() {
    for kind in AnimationKind::ALL {
        assert_eq!(AnimationKind::parse(kind.name()), kind);
    }
}

#[test]
fn text_kinds_fall_back_to_zoom_in_background() {
    assert_eq!(AnimationKind::Typewriter.background(), AnimationKind::ZoomIn);
    assert_eq!(AnimationKind::FadeUp.background(), AnimationKind::ZoomIn);
    assert_eq!(AnimationKind::Tilt.background(), AnimationKind::Tilt);
}

#[test]
fn serde_uses_lenient_strings() {
    let k: AnimationKind = serde_json::from_str("\"zoom_rotate\"").unwrap();
    assert_eq!(k, AnimationKind::ZoomRotate);
    let k: AnimationKind = serde_json::from_str("\"nope\"").unwrap();
    assert_eq!(k, AnimationKind::Unknown);
    assert_eq!(
        serde_json::to_string(&AnimationKind::PanRightLeft).unwrap(),
        "\"pan-right-left\""
    );
}
