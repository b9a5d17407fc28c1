use std::time::Duration;

use super::backoff::LinearBackoff;

#[test]
fn delay_grows_linearly_with_consecutive_failures() {
    let mut backoff = LinearBackoff::new(Duration::from_millis(500), None);

    assert_eq!(backoff.next_delay(), Duration::from_millis(500));
    assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    assert_eq!(backoff.next_delay(), Duration::from_millis(1500));
    assert_eq!(backoff.failures(), 3);
}

#[test]
fn reset_restarts_from_one_unit() {
    let mut backoff = LinearBackoff::new(Duration::from_millis(500), None);
    backoff.next_delay();
    backoff.next_delay();

    backoff.reset();

    assert_eq!(backoff.failures(), 0);
    assert_eq!(backoff.next_delay(), Duration::from_millis(500));
}

#[test]
fn cap_bounds_single_delay() {
    let mut backoff = LinearBackoff::new(Duration::from_millis(500), Some(Duration::from_millis(1200)));

    assert_eq!(backoff.next_delay(), Duration::from_millis(500));
    assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    assert_eq!(backoff.next_delay(), Duration::from_millis(1200));
    assert_eq!(backoff.next_delay(), Duration::from_millis(1200));
    assert_eq!(backoff.failures(), 4);
}
