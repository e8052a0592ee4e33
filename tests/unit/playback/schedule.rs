use super::*;

#[test]
fn virtual_fires_once_per_request() {
    let mut s = VirtualScheduler::new(Duration::from_millis(10));
    assert_eq!(s.wait_for_frame(), None);
    s.request_frame();
    assert!(s.has_pending());
    assert_eq!(s.wait_for_frame(), Some(Duration::from_millis(10)));
    assert_eq!(s.wait_for_frame(), None);
    s.advance(Duration::from_millis(5));
    s.request_frame();
    assert_eq!(s.wait_for_frame(), Some(Duration::from_millis(25)));
}

#[test]
fn cancel_only_drops_matching_request() {
    let mut s = VirtualScheduler::new(Duration::from_millis(10));
    let first = s.request_frame();
    let second = s.request_frame();
    assert_ne!(first, second);
    s.cancel_frame(first);
    assert!(s.has_pending());
    s.cancel_frame(second);
    assert!(!s.has_pending());
    assert_eq!(s.wait_for_frame(), None);
}

#[test]
fn realtime_paces_to_interval() {
    let mut s = RealtimeScheduler::new(Duration::from_millis(5));
    s.request_frame();
    let a = s.wait_for_frame().unwrap();
    s.request_frame();
    let b = s.wait_for_frame().unwrap();
    assert!(b >= a + Duration::from_millis(5));
    assert_eq!(s.wait_for_frame(), None);
}
