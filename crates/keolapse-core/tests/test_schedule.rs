use keolapse_core::schedule::{schedule, ScheduleParams};

fn params(framerate: f64, max_len: f64, min_fps: f64, max_fps: f64) -> ScheduleParams {
    ScheduleParams {
        framerate,
        max_length_seconds: max_len,
        min_fps,
        max_fps,
    }
}

#[test]
fn test_schedule_is_idempotent() {
    let p = params(12.0, 120.0, 5.0, 30.0);
    for n in [0usize, 1, 17, 1440, 1800, 5000, 12345] {
        assert_eq!(schedule(n, &p), schedule(n, &p), "frame count {n}");
    }
}

#[test]
fn test_output_fps_within_bounds() {
    let bounds = [(5.0, 30.0), (10.0, 12.0), (1.0, 60.0), (24.0, 24.0)];
    for &(min, max) in &bounds {
        for framerate in [min, (min + max) / 2.0, max] {
            for max_len in [10.0, 60.0, 120.0, 300.0] {
                for n in [1usize, 50, 999, 1800, 4321, 20_000] {
                    let d = schedule(n, &params(framerate, max_len, min, max));
                    assert!(
                        d.output_fps >= min && d.output_fps <= max,
                        "n={n} fr={framerate} len={max_len}: fps {}",
                        d.output_fps
                    );
                }
            }
        }
    }
}

#[test]
fn test_duration_bound_when_subsampling() {
    let bounds = [(5.0, 30.0), (10.0, 12.0), (1.0, 60.0), (24.0, 24.0)];
    for &(min, max) in &bounds {
        for framerate in [min, max] {
            for max_len in [10.0, 60.0, 120.0] {
                for n in [500usize, 1800, 4321, 20_000] {
                    let d = schedule(n, &params(framerate, max_len, min, max));
                    if d.is_subsampled() || n as f64 / framerate > max_len {
                        assert!(
                            d.duration_seconds() <= max_len + 1.0,
                            "n={n} fr={framerate} len={max_len}: {} s",
                            d.duration_seconds()
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_selected_indices_are_evenly_strided() {
    let d = schedule(20_000, &params(25.0, 60.0, 10.0, 60.0));
    assert!(d.is_subsampled());
    assert_eq!(d.selected[0], 0);
    for pair in d.selected.windows(2) {
        assert_eq!(pair[1] - pair[0], d.stride);
    }
    assert!(*d.selected.last().unwrap() < 20_000);
}

#[test]
fn test_1800_frames_at_12fps_with_120s_cap() {
    // Natural duration 150 s exceeds the cap; 1800 / 1440 rounds the
    // stride down to 1, so the rate has to rise instead.
    let d = schedule(1800, &params(12.0, 120.0, 1.0, 30.0));
    assert_eq!(d.stride, 1);
    assert_eq!(d.selected.len(), 1800);
    assert_eq!(d.output_fps, 15.0);
    assert!(d.selected.len() as f64 / d.output_fps <= 121.0);
}

#[test]
fn test_natural_duration_at_cap_keeps_framerate() {
    let d = schedule(1440, &params(12.0, 120.0, 1.0, 30.0));
    assert_eq!(d.selected.len(), 1440);
    assert_eq!(d.output_fps, 12.0);
    assert!(!d.is_subsampled());
}
