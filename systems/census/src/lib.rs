#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population bookkeeping for presentation collaborators.
//!
//! The census folds world events into running tallies and combines them with
//! a [`WorldSnapshot`] into a [`Report`] or a printable roster.

use robot_arena_core::{AgentKind, Event, ObstacleShape, WorldSnapshot};

/// Pure system that tallies what happened in the arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Census {
    destroyed: u64,
    evasions: u64,
    ticks: u64,
}

impl Census {
    /// Creates a census with empty tallies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the provided world events into the tallies.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TickCompleted { tick } => self.ticks = *tick,
                Event::AgentDestroyed { .. } => self.destroyed = self.destroyed.saturating_add(1),
                Event::EvasionStarted { .. } => self.evasions = self.evasions.saturating_add(1),
                Event::ArenaCleared => {
                    self.destroyed = 0;
                    self.evasions = 0;
                }
                _ => {}
            }
        }
    }

    /// Weak robots destroyed by contact since the last clear.
    #[must_use]
    pub const fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Evasions started by avoider robots since the last clear.
    #[must_use]
    pub const fn evasions(&self) -> u64 {
        self.evasions
    }

    /// Most recent tick observed.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Combines the tallies with the live population in `snapshot`.
    #[must_use]
    pub fn report(&self, snapshot: &WorldSnapshot) -> Report {
        let mut robots = [0; AgentKind::ALL.len()];
        for agent in snapshot.agents() {
            robots[kind_slot(agent.kind)] += 1;
        }
        let circles = snapshot
            .obstacles()
            .iter()
            .filter(|obstacle| obstacle.shape() == ObstacleShape::Circle)
            .count();
        Report {
            robots,
            circles,
            lines: snapshot.obstacles().len() - circles,
            destroyed: self.destroyed,
            evasions: self.evasions,
            ticks: self.ticks,
        }
    }
}

/// Population summary for one moment of the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    robots: [usize; 4],
    circles: usize,
    lines: usize,
    destroyed: u64,
    evasions: u64,
    ticks: u64,
}

impl Report {
    /// Live robots of the provided kind.
    #[must_use]
    pub const fn robots(&self, kind: AgentKind) -> usize {
        self.robots[kind_slot(kind)]
    }

    /// Live robots of every kind.
    #[must_use]
    pub fn total_robots(&self) -> usize {
        self.robots.iter().sum()
    }

    /// Obstacles of the provided shape.
    #[must_use]
    pub const fn obstacles(&self, shape: ObstacleShape) -> usize {
        match shape {
            ObstacleShape::Circle => self.circles,
            ObstacleShape::Line => self.lines,
        }
    }

    /// Weak robots destroyed since the last clear.
    #[must_use]
    pub const fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Evasions started since the last clear.
    #[must_use]
    pub const fn evasions(&self) -> u64 {
        self.evasions
    }

    /// Tick the report was taken at.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

const fn kind_slot(kind: AgentKind) -> usize {
    match kind {
        AgentKind::Normal => 0,
        AgentKind::Weak => 1,
        AgentKind::Avoider => 2,
        AgentKind::Beam => 3,
    }
}

const fn shape_label(shape: ObstacleShape) -> &'static str {
    match shape {
        ObstacleShape::Circle => "Circle Obstacle",
        ObstacleShape::Line => "Line Obstacle",
    }
}

/// One line per entity, robots first, as `"<label><id>: (<x>, <y>)"` with
/// coordinates rounded to whole units.
#[must_use]
pub fn roster(snapshot: &WorldSnapshot) -> Vec<String> {
    let robots = snapshot.agents().iter().map(|agent| {
        format!(
            "{}{}: ({}, {})",
            agent.kind.label(),
            agent.id.get(),
            agent.position.x.round(),
            agent.position.y.round()
        )
    });
    let obstacles = snapshot.obstacles().iter().map(|obstacle| {
        format!(
            "{}{}: ({}, {})",
            shape_label(obstacle.shape()),
            obstacle.id.get(),
            obstacle.position.x.round(),
            obstacle.position.y.round()
        )
    });
    robots.chain(obstacles).collect()
}
