//! Static obstacles.

use glam::DVec2;
use robot_arena_core::{
    geometry, ObstacleId, ObstacleOutline, ObstacleShape, ObstacleSnapshot, CIRCLE_OBSTACLE_RADIUS,
    LINE_OBSTACLE_SPAN,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Obstacle {
    id: ObstacleId,
    position: DVec2,
    outline: Outline,
    rotation_degrees: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
enum Outline {
    Circle { radius: f64 },
    Line { span: DVec2 },
}

impl Obstacle {
    pub(crate) fn new(
        id: ObstacleId,
        shape: ObstacleShape,
        position: DVec2,
        rotation_degrees: u16,
    ) -> Self {
        let outline = match shape {
            ObstacleShape::Circle => Outline::Circle {
                radius: CIRCLE_OBSTACLE_RADIUS,
            },
            ObstacleShape::Line => Outline::Line {
                span: LINE_OBSTACLE_SPAN,
            },
        };
        Self {
            id,
            position,
            outline,
            rotation_degrees,
        }
    }

    pub(crate) const fn id(&self) -> ObstacleId {
        self.id
    }

    pub(crate) const fn position(&self) -> DVec2 {
        self.position
    }

    pub(crate) fn relocate(&mut self, position: DVec2) {
        self.position = position;
    }

    /// Whether a point picks this obstacle. Lines cannot be picked.
    pub(crate) fn contains(&self, point: DVec2) -> bool {
        match self.outline {
            Outline::Circle { radius } => self.position.distance(point) <= radius,
            Outline::Line { .. } => false,
        }
    }

    /// Margin-free contact test against a robot body.
    pub(crate) fn touches(&self, center: DVec2, radius: f64) -> bool {
        match self.outline {
            Outline::Circle {
                radius: own_radius,
            } => geometry::circles_touch(center, radius, self.position, own_radius),
            Outline::Line { span } => geometry::circle_intersects_segment(
                center,
                radius,
                self.position,
                self.position + span,
            ),
        }
    }

    pub(crate) fn snapshot(&self) -> ObstacleSnapshot {
        let (outline, shape) = match self.outline {
            Outline::Circle { radius } => (ObstacleOutline::Circle { radius }, ObstacleShape::Circle),
            Outline::Line { span } => (
                ObstacleOutline::Line {
                    end: self.position + span,
                },
                ObstacleShape::Line,
            ),
        };
        ObstacleSnapshot {
            id: self.id,
            position: self.position,
            outline,
            color: shape.color(),
            rotation_degrees: self.rotation_degrees,
        }
    }
}

/// Extent of an entity around its anchor, as `(min, max)` offsets.
pub(crate) fn extent(shape: ObstacleShape) -> (DVec2, DVec2) {
    match shape {
        ObstacleShape::Circle => (
            DVec2::splat(-CIRCLE_OBSTACLE_RADIUS),
            DVec2::splat(CIRCLE_OBSTACLE_RADIUS),
        ),
        ObstacleShape::Line => (DVec2::ZERO, LINE_OBSTACLE_SPAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_never_picked() {
        let line = Obstacle::new(ObstacleId::new(0), ObstacleShape::Line, DVec2::new(10.0, 10.0), 90);
        assert!(!line.contains(DVec2::new(10.0, 10.0)));
        assert_eq!(line.snapshot().radius(), 0.0);
        assert_eq!(line.snapshot().color, None);
        assert_eq!(line.snapshot().outline, ObstacleOutline::Line {
            end: DVec2::new(50.0, 45.0),
        });
    }

    #[test]
    fn circles_are_picked_inside_their_radius() {
        let circle = Obstacle::new(ObstacleId::new(1), ObstacleShape::Circle, DVec2::new(100.0, 100.0), 0);
        assert!(circle.contains(DVec2::new(130.0, 100.0)));
        assert!(!circle.contains(DVec2::new(131.0, 100.0)));
        assert_eq!(circle.snapshot().color, Some(robot_arena_core::ColorTag::Red));
    }

    #[test]
    fn circle_contact_uses_plain_radius_sum() {
        let circle = Obstacle::new(ObstacleId::new(1), ObstacleShape::Circle, DVec2::new(100.0, 100.0), 0);
        assert!(!circle.touches(DVec2::new(140.0, 100.0), 10.0));
        assert!(circle.touches(DVec2::new(139.0, 100.0), 10.0));
    }

    #[test]
    fn line_contact_follows_the_fixed_span() {
        let line = Obstacle::new(ObstacleId::new(2), ObstacleShape::Line, DVec2::new(0.0, 0.0), 45);
        assert!(line.touches(DVec2::new(45.0, 40.0), 10.0));
        assert!(!line.touches(DVec2::new(0.0, 40.0), 10.0));
    }
}
