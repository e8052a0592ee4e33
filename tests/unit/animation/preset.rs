use super::*;

#[test]
fn catalog_has_five_unique_presets() {
    assert_eq!(PRESETS.len(), 5);
    for (i, a) in PRESETS.iter().enumerate() {
        for b in &PRESETS[i + 1..] {
            assert_ne!(a.id, b.id);
        }
    }
    assert!(preset_by_id(DEFAULT_PRESET_ID).is_some());
    assert!(preset_by_id(TYPEWRITER_PRESET_ID).is_some());
}

#[test]
fn default_selection_is_cinematic() {
    let sel = AnimationSelection::default();
    let spec = sel.spec();
    assert_eq!(spec.kind, AnimationKind::ZoomIn);
    assert_eq!(spec.duration, Duration::from_secs(10));
}

#[test]
fn manual_values_win_until_new_preset() {
    let mut sel = AnimationSelection::with_preset("showcase");
    sel.set_manual_kind(AnimationKind::Tilt);
    sel.set_manual_duration(Duration::from_secs(15)).unwrap();
    assert_eq!(
        sel.spec(),
        AnimationSpec {
            kind: AnimationKind::Tilt,
            duration: Duration::from_secs(15)
        }
    );

    sel.choose_preset("dynamic");
    assert_eq!(sel.spec().kind, AnimationKind::ZoomRotate);
    assert_eq!(sel.spec().duration, Duration::from_secs(5));
    assert_eq!(sel.manual_kind(), None);
}

#[test]
fn manual_duration_alone_keeps_preset_kind() {
    let mut sel = AnimationSelection::with_preset("minimal");
    sel.set_manual_duration(Duration::from_secs(5)).unwrap();
    assert_eq!(sel.spec().kind, AnimationKind::Breathe);
    assert_eq!(sel.spec().duration, Duration::from_secs(5));
}

#[test]
fn zero_durations_are_rejected() {
    let mut sel = AnimationSelection::default();
    assert!(sel.set_manual_duration(Duration::ZERO).is_err());
    assert!(AnimationSpec::new(AnimationKind::Fade, Duration::ZERO).is_err());
}

#[test]
fn unknown_preset_resolves_to_identity_kind() {
    let sel = AnimationSelection::with_preset("does-not-exist");
    assert_eq!(sel.spec().kind, AnimationKind::Unknown);
    assert!(!sel.spec().duration.is_zero());
}
