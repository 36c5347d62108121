//! End-to-end tests for the update loop with the real detector and estimator.
//!
//! Exercises flowcam-capture frames through flowcam-vision inside
//! flowcam-tracking.

use flowcam_capture::SyntheticSource;
use flowcam_core::{GrayFrame, Point2};
use flowcam_tracking::{FlowTracker, Overlay, OverlayStyle, Tick, TrackerConfig};
use flowcam_vision::{GoodFeatures, PyramidalLk};
use glam::Vec2;

// ── Helpers ────────────────────────────────────────────────────

/// Dark image with a bright lower-right quadrant: one strong corner.
fn stationary_corner() -> GrayFrame {
    GrayFrame::from_fn(64, 64, |x, y| if x >= 32 && y >= 32 { 220 } else { 20 })
}

fn tracker(config: TrackerConfig) -> FlowTracker {
    FlowTracker::new(config, GoodFeatures::default(), PyramidalLk::default())
}

// ── Re-seed schedule ───────────────────────────────────────────

#[test]
fn stationary_corner_full_reseed_cycle() {
    let mut t = tracker(TrackerConfig::default());
    let frame = stationary_corner();

    assert_eq!(t.update(frame.clone()), Tick::Primed);

    let Tick::Tracked {
        matched,
        lost,
        reseeded: true,
    } = t.update(frame.clone())
    else {
        panic!("frame 1 must detect and track");
    };
    let detected = matched + lost;
    assert!(detected > 0);
    let seeded = t.features().previous.clone();

    for index in 2..300u64 {
        let tick = t.update(frame.clone());
        assert!(
            matches!(tick, Tick::Tracked { reseeded: false, .. }),
            "frame {index}: {tick:?}"
        );
        let features = t.features();
        assert!(features.matched_count() > 0, "frame {index} lost everything");
        for (prev, cur) in features.flow_segments() {
            assert!(prev.distance(cur) < 1e-3, "frame {index}: {prev:?} -> {cur:?}");
        }
    }

    let tick = t.update(frame);
    assert!(tick.reseeded() && tick.tracked(), "frame 300: {tick:?}");
    assert_eq!(t.features().len(), detected);
    assert_eq!(t.features().previous, seeded);
    assert_eq!(t.frame_count(), 301);
}

#[test]
fn blank_frames_keep_retrying_detection() {
    let mut t = tracker(TrackerConfig::default());
    let blank = GrayFrame::filled(32, 32, 90);
    t.update(blank.clone());
    for _ in 0..5 {
        assert_eq!(t.update(blank.clone()), Tick::Reseeded { detected: 0 });
    }
    assert!(t.features().is_empty());
}

// ── Motion ─────────────────────────────────────────────────────

#[test]
fn linear_motion_is_tracked() {
    let source = SyntheticSource::new(160, 120)
        .with_square(Point2::new(50.0, 40.0), 40.0)
        .with_velocity(Vec2::new(1.0, 0.0));
    let mut t = tracker(TrackerConfig::default());

    t.update(source.gray_frame_at(0));
    assert!(t.update(source.gray_frame_at(1)).reseeded());

    for index in 2..12 {
        let tick = t.update(source.gray_frame_at(index));
        assert!(tick.tracked() && !tick.reseeded(), "frame {index}: {tick:?}");
        let features = t.features();
        assert!(features.matched_count() > 0, "frame {index} lost everything");
        for (prev, cur) in features.flow_segments() {
            let d = cur - prev;
            assert!(
                (d.x - 1.0).abs() < 0.25 && d.y.abs() < 0.25,
                "frame {index}: displacement {d:?}"
            );
        }
    }
}

#[test]
fn reseed_frames_track_with_short_interval() {
    let config = TrackerConfig {
        reseed_interval: 3,
        ..TrackerConfig::default()
    };
    let mut t = tracker(config);
    let frame = stationary_corner();
    let ticks: Vec<Tick> = (0..4).map(|_| t.update(frame.clone())).collect();

    assert_eq!(ticks[0], Tick::Primed);
    assert!(ticks[1].reseeded() && ticks[1].tracked());
    assert!(ticks[2].tracked() && !ticks[2].reseeded());
    assert!(ticks[3].reseeded() && ticks[3].tracked());
    assert!(t.features().is_aligned());
    assert_eq!(t.last_errors().len(), t.features().len());
}

#[test]
fn detect_only_reseed_leaves_pairs_unmatched() {
    let source = SyntheticSource::new(160, 120)
        .with_square(Point2::new(50.0, 40.0), 40.0)
        .with_velocity(Vec2::new(1.0, 0.0));
    let config = TrackerConfig {
        track_after_reseed: false,
        ..TrackerConfig::default()
    };
    let mut t = tracker(config);

    t.update(source.gray_frame_at(0));
    let tick = t.update(source.gray_frame_at(1));
    assert!(matches!(tick, Tick::Reseeded { detected } if detected > 0));
    assert_eq!(t.features().previous, t.features().current);
    assert_eq!(t.features().flow_segments().count(), 0);
    assert!(t.last_errors().is_empty());
}

// ── Overlay ────────────────────────────────────────────────────

#[test]
fn overlay_segments_match_status() {
    let source = SyntheticSource::new(160, 120).with_square(Point2::new(50.0, 40.0), 40.0);
    let mut t = tracker(TrackerConfig::default());
    for index in 0..4 {
        t.update(source.gray_frame_at(index));
    }
    let features = t.features();
    let overlay = Overlay::build(features, &OverlayStyle::default());
    assert_eq!(overlay.segments().count(), features.matched_count());
    assert_eq!(
        overlay.len(),
        features.previous.len() + features.current.len() + features.matched_count()
    );
}
