//! Rolling outlier correction ahead of kinematics
//!
//! The second-oldest sample of a full preprocess window is compared against
//! the straight line between the window's oldest and newest samples. A
//! vertical speed further than the clip threshold from that line is replaced
//! by the interpolated sample. Each sample passes position 1 exactly once as
//! the window slides, so it is checked exactly once.

use tracing::debug;

use crate::conversion::elapsed_seconds;
use crate::detection::Kinematics;
use crate::types::InputRow;
use crate::window::FilledWindow;

/// Preprocess window element: a raw row and its unsmoothed kinematics
pub type DespikeEntry<S> = (InputRow<S>, Option<Kinematics>);

/// Position of the checked sample within the window
const FOCUS_POSITION: isize = 1;

/// Check and correct the second-oldest element of `window`.
///
/// Returns true when the element was replaced. Windows shorter than three
/// samples have no inner element and are left alone, as are windows whose
/// endpoints do not span a positive amount of time.
pub fn despike<S: Clone>(window: &mut FilledWindow<DespikeEntry<S>>, clip_threshold: f64) -> bool {
    if window.capacity() < 3 {
        return false;
    }
    window.focus_at(FOCUS_POSITION);

    let (oldest, oldest_kin) = window.oldest();
    let (newest, newest_kin) = window.newest();
    let (focus, _) = window.focus();

    let span = elapsed_seconds(oldest.time, newest.time);
    if span <= 0.0 {
        debug!(
            oldest = %oldest.time,
            newest = %newest.time,
            "despike window has no positive time span, skipping"
        );
        return false;
    }
    let t = (elapsed_seconds(oldest.time, focus.time) / span).clamp(0.0, 1.0);

    let expected = lerp(oldest.vertical_speed(), newest.vertical_speed(), t);
    let actual = focus.vertical_speed();
    if (actual - expected).abs() <= clip_threshold {
        return false;
    }

    let (Some(oldest_kin), Some(newest_kin)) = (oldest_kin, newest_kin) else {
        return false;
    };
    let kinematics = oldest_kin.interpolate(newest_kin, t);
    let altitude = lerp(oldest.altitude, newest.altitude, t);
    let velocity = oldest.velocity.lerp(&newest.velocity, t);

    debug!(
        time = %focus.time,
        actual,
        expected,
        "vertical speed spike corrected"
    );
    window.modify_focus(|(row, _)| {
        (
            InputRow::new(row.time, altitude, velocity, row.source.clone()),
            Some(kinematics),
        )
    });
    true
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoVector;
    use crate::window::FocusWindow;
    use chrono::{DateTime, TimeDelta, Utc};

    fn entry(ms: i64, altitude: f64, vertical: f64, tag: u32) -> DespikeEntry<u32> {
        let row = InputRow::new(
            DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms),
            altitude,
            GeoVector::new(10.0, 0.0, vertical),
            tag,
        );
        let kinematics = Kinematics::create(&row);
        (row, Some(kinematics))
    }

    fn filled(entries: Vec<DespikeEntry<u32>>) -> FilledWindow<DespikeEntry<u32>> {
        let mut window = FocusWindow::new(entries.len());
        for e in entries {
            window = window.push(e).1;
        }
        match window {
            FocusWindow::Filled(w) => w,
            FocusWindow::Filling(_) => panic!("window should be filled"),
        }
    }

    #[test]
    fn test_spike_is_replaced_by_interpolation() {
        let mut window = filled(vec![
            entry(0, 1000.0, -50.0, 1),
            entry(200, 990.0, -10.0, 2),
            entry(400, 980.0, -50.0, 3),
        ]);
        assert!(despike(&mut window, 10.0));

        let (row, kin) = window.get(1).unwrap();
        assert_eq!(row.vertical_speed(), -50.0);
        assert_eq!(row.altitude, 990.0);
        assert_eq!(row.time, DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(200));
        assert_eq!(row.source, 2);
        assert_eq!(kin.unwrap().vertical_speed, -50.0);

        // Endpoints pass through untouched
        assert_eq!(window.oldest().0.source, 1);
        assert_eq!(window.newest().0.vertical_speed(), -50.0);
        assert_eq!(window.cursor(), 1);
    }

    #[test]
    fn test_small_deviation_left_alone() {
        let mut window = filled(vec![
            entry(0, 1000.0, -50.0, 1),
            entry(200, 990.0, -45.0, 2),
            entry(400, 980.0, -50.0, 3),
        ]);
        assert!(!despike(&mut window, 10.0));
        assert_eq!(window.get(1).unwrap().0.vertical_speed(), -45.0);
    }

    #[test]
    fn test_interpolation_follows_elapsed_time() {
        // Focus sits a quarter of the way between the endpoints
        let mut window = filled(vec![
            entry(0, 1000.0, 0.0, 1),
            entry(100, 1000.0, 30.0, 2),
            entry(400, 1000.0, -40.0, 3),
        ]);
        assert!(despike(&mut window, 5.0));
        assert_eq!(window.get(1).unwrap().0.vertical_speed(), -10.0);
    }

    #[test]
    fn test_only_second_oldest_is_checked() {
        let mut window = filled(vec![
            entry(0, 1000.0, -50.0, 1),
            entry(200, 990.0, -50.0, 2),
            entry(400, 980.0, 20.0, 3),
            entry(600, 970.0, -50.0, 4),
            entry(800, 960.0, -50.0, 5),
        ]);
        assert!(!despike(&mut window, 10.0));
        assert_eq!(window.get(2).unwrap().0.vertical_speed(), 20.0);
    }

    #[test]
    fn test_zero_time_span_is_skipped() {
        let mut window = filled(vec![
            entry(0, 1000.0, -50.0, 1),
            entry(0, 990.0, 40.0, 2),
            entry(0, 980.0, -50.0, 3),
        ]);
        assert!(!despike(&mut window, 10.0));
        assert_eq!(window.get(1).unwrap().0.vertical_speed(), 40.0);
    }

    #[test]
    fn test_focus_before_oldest_clamps_to_oldest() {
        let mut window = filled(vec![
            entry(0, 1000.0, -50.0, 1),
            entry(-200, 990.0, 40.0, 2),
            entry(400, 980.0, -20.0, 3),
        ]);
        assert!(despike(&mut window, 5.0));

        let (row, kin) = window.get(1).unwrap();
        assert!(row.vertical_speed().is_finite());
        assert_eq!(row.vertical_speed(), -50.0);
        assert_eq!(row.altitude, 1000.0);
        assert_eq!(kin.unwrap().vertical_speed, -50.0);
        assert_eq!(row.time, DateTime::<Utc>::UNIX_EPOCH - TimeDelta::milliseconds(200));
    }

    #[test]
    fn test_focus_after_newest_clamps_to_newest() {
        let mut window = filled(vec![
            entry(0, 1000.0, -20.0, 1),
            entry(600, 990.0, 40.0, 2),
            entry(400, 980.0, -50.0, 3),
        ]);
        assert!(despike(&mut window, 5.0));

        let (row, kin) = window.get(1).unwrap();
        assert!(row.vertical_speed().is_finite());
        assert_eq!(row.vertical_speed(), -50.0);
        assert_eq!(row.altitude, 980.0);
        assert_eq!(kin.unwrap().vertical_speed, -50.0);
    }

    #[test]
    fn test_missing_neighbour_kinematics_passes_through() {
        let mut first = entry(0, 1000.0, -50.0, 1);
        first.1 = None;
        let mut window = filled(vec![first, entry(200, 990.0, 0.0, 2), entry(400, 980.0, -50.0, 3)]);
        assert!(!despike(&mut window, 10.0));
        assert_eq!(window.get(1).unwrap().0.vertical_speed(), 0.0);
    }

    #[test]
    fn test_two_element_window_is_noop() {
        let mut window = filled(vec![entry(0, 1000.0, -50.0, 1), entry(200, 990.0, 40.0, 2)]);
        assert!(!despike(&mut window, 10.0));
    }
}
