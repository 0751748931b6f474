//! Integration tests for the refresh scheduler.

use sdram_controller::common::constants::REFRESH_MARGIN;
use sdram_controller::core::refresh::RefreshScheduler;

/// Tests that nothing is due before the first refresh arms the counter.
#[test]
fn test_disarmed_until_first_refresh() {
    let mut r = RefreshScheduler::new(100);
    for _ in 0..1000 {
        r.tick();
    }
    assert!(!r.due());
    assert!(r.fits(10_000));
    assert_eq!(r.elapsed(), 0);
}

/// Tests the due threshold relative to the interval.
#[test]
fn test_due_threshold() {
    let mut r = RefreshScheduler::new(100);
    r.issued();
    for _ in 0..(100 - REFRESH_MARGIN - 1) {
        r.tick();
    }
    assert!(!r.due());
    r.tick();
    assert!(r.due());
}

/// Tests that issuing a refresh resets the counter.
#[test]
fn test_issue_resets() {
    let mut r = RefreshScheduler::new(50);
    r.issued();
    for _ in 0..60 {
        r.tick();
    }
    assert!(r.due());
    r.issued();
    assert_eq!(r.elapsed(), 0);
    assert!(!r.due());
}

/// Tests the burst fit check used for preventive refresh.
#[test]
fn test_fits() {
    let mut r = RefreshScheduler::new(100);
    r.issued();
    for _ in 0..50 {
        r.tick();
    }
    assert!(r.fits(45));
    assert!(!r.fits(46));
    assert_eq!(r.interval(), 100);
}
