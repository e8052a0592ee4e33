use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(30, 1).is_ok());
}

#[test]
fn fps_frame_interval_and_cover() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frame_interval(), Duration::from_nanos(33_333_333));
    assert_eq!(fps.frames_to_cover(Duration::from_secs(10)), 300);
    assert_eq!(fps.frames_to_cover(Duration::from_millis(1010)), 31);
    assert_eq!(fps.frames_to_cover(Duration::ZERO), 0);
}

#[test]
fn progress_is_periodic_at_the_seam() {
    let d = Duration::from_millis(7000);
    assert_eq!(Progress::from_elapsed(Duration::ZERO, d), Progress::ZERO);
    assert_eq!(Progress::from_elapsed(d, d), Progress::ZERO);
    assert_eq!(Progress::from_elapsed(d * 3, d), Progress::ZERO);
    let half = Progress::from_elapsed(Duration::from_millis(3500), d);
    assert!((half.get() - 0.5).abs() < 1e-12);
}

#[test]
fn progress_new_wraps_into_unit_interval() {
    assert_eq!(Progress::new(1.0), Progress::ZERO);
    assert!((Progress::new(1.25).get() - 0.25).abs() < 1e-12);
    assert!((Progress::new(-0.25).get() - 0.75).abs() < 1e-12);
    assert_eq!(Progress::new(f64::NAN), Progress::ZERO);
}

#[test]
fn premul_rounds_half_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 0, 0, 128);
    assert_eq!(c.to_array(), [128, 0, 0, 128]);
}

#[test]
fn story_canvas_center() {
    let c = Canvas::STORY.center();
    assert_eq!((c.x, c.y), (540.0, 960.0));
}

#[test]
fn frame_index_orders_numerically() {
    assert!(FrameIndex(2) > FrameIndex(1));
    assert_eq!(FrameIndex::default(), FrameIndex(0));
}
