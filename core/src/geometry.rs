//! Contact predicates evaluated by the tick pipeline.

use glam::DVec2;

/// Additive widening of the robot-versus-robot contact threshold, in squared units.
///
/// Robots register contact slightly before their outlines meet. Treat this as a
/// tuning knob for early contact rather than a physical quantity.
pub const AGENT_CONTACT_MARGIN: f64 = 200.0;

/// Robot-versus-robot contact test.
///
/// Reports contact when the squared centre distance is below the squared radius
/// sum plus [`AGENT_CONTACT_MARGIN`].
#[must_use]
pub fn circles_overlap(a: DVec2, a_radius: f64, b: DVec2, b_radius: f64) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach + AGENT_CONTACT_MARGIN
}

/// Plain radius-sum test used against circular obstacles.
#[must_use]
pub fn circles_touch(a: DVec2, a_radius: f64, b: DVec2, b_radius: f64) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

/// Whether a circle reaches the segment running from `start` to `end`.
///
/// The centre is projected onto the segment with the projection parameter
/// clamped to `[0, 1]`. A zero-length segment degrades to a point test.
#[must_use]
pub fn circle_intersects_segment(center: DVec2, radius: f64, start: DVec2, end: DVec2) -> bool {
    let span = end - start;
    let length_squared = span.length_squared();
    let t = if length_squared > 0.0 {
        ((center - start).dot(span) / length_squared).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = start + span * t;
    closest.distance_squared(center) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_touching_splits_the_two_thresholds() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(7.0, 0.0);
        assert_eq!(a.distance_squared(b), 49.0);
        assert!(!circles_touch(a, 3.0, b, 4.0));
        assert!(circles_overlap(a, 3.0, b, 4.0));
    }

    #[test]
    fn margin_bounds_agent_contact() {
        let a = DVec2::ZERO;
        // 225 < 100 + 200 but 324 is not.
        assert!(circles_overlap(a, 5.0, DVec2::new(15.0, 0.0), 5.0));
        assert!(!circles_overlap(a, 5.0, DVec2::new(18.0, 0.0), 5.0));
        assert!(!circles_touch(a, 5.0, DVec2::new(15.0, 0.0), 5.0));
    }

    #[test]
    fn segment_projection_is_clamped_to_endpoints() {
        let start = DVec2::new(0.0, 0.0);
        let end = DVec2::new(40.0, 0.0);
        assert!(circle_intersects_segment(DVec2::new(20.0, 5.0), 10.0, start, end));
        assert!(!circle_intersects_segment(DVec2::new(20.0, 15.0), 10.0, start, end));
        // Beyond the end the nearest point is the endpoint, not the infinite line.
        assert!(!circle_intersects_segment(DVec2::new(55.0, 0.0), 10.0, start, end));
        assert!(circle_intersects_segment(DVec2::new(48.0, 0.0), 10.0, start, end));
        assert!(circle_intersects_segment(DVec2::new(50.0, 0.0), 10.0, start, end));
    }

    #[test]
    fn segment_test_has_no_margin() {
        let start = DVec2::new(0.0, 0.0);
        let end = DVec2::new(0.0, 30.0);
        assert!(!circle_intersects_segment(DVec2::new(10.5, 15.0), 10.0, start, end));
    }

    #[test]
    fn degenerate_segment_behaves_like_a_point() {
        let point = DVec2::new(5.0, 5.0);
        assert!(circle_intersects_segment(DVec2::new(8.0, 9.0), 5.0, point, point));
        assert!(!circle_intersects_segment(DVec2::new(9.0, 9.0), 5.0, point, point));
    }
}
