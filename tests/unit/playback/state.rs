use super::*;

#[test]
fn starts_paused_and_toggles() {
    let mut s = PlaybackState::default();
    assert_eq!(s, PlaybackState::Paused);
    assert!(!s.keeps_loop_armed());
    assert!(s.apply(PlaybackEvent::Toggle));
    assert_eq!(s, PlaybackState::Playing);
    assert!(s.keeps_loop_armed());
    assert!(s.apply(PlaybackEvent::Toggle));
    assert_eq!(s, PlaybackState::Paused);
}

#[test]
fn redundant_events_do_nothing() {
    let mut s = PlaybackState::Playing;
    assert!(!s.apply(PlaybackEvent::Play));
    let mut s = PlaybackState::Paused;
    assert!(!s.apply(PlaybackEvent::Pause));
    assert!(!s.apply(PlaybackEvent::FinishExport));
}

#[test]
fn exporting_ignores_user_controls() {
    let mut s = PlaybackState::Paused;
    assert!(s.apply(PlaybackEvent::BeginExport));
    assert!(s.is_exporting());
    assert!(s.keeps_loop_armed());
    for e in [
        PlaybackEvent::Play,
        PlaybackEvent::Pause,
        PlaybackEvent::Toggle,
        PlaybackEvent::BeginExport,
    ] {
        assert!(!s.apply(e));
        assert_eq!(s, PlaybackState::Exporting);
    }
}

#[test]
fn export_outcomes() {
    let mut s = PlaybackState::Exporting;
    assert!(s.apply(PlaybackEvent::FinishExport));
    assert_eq!(s, PlaybackState::Playing);

    let mut s = PlaybackState::Exporting;
    assert!(s.apply(PlaybackEvent::FailExport("boom".into())));
    assert_eq!(s, PlaybackState::Failed("boom".into()));
    assert!(!s.keeps_loop_armed());
    assert_eq!(s.to_string(), "failed: boom");

    assert!(s.clone().apply(PlaybackEvent::Play));
    assert_eq!(s.next(&PlaybackEvent::Pause), Some(PlaybackState::Paused));
    assert_eq!(
        s.next(&PlaybackEvent::BeginExport),
        Some(PlaybackState::Exporting)
    );
}
