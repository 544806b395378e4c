#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the robot arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Presentation collaborators read the world
//! exclusively through [`WorldSnapshot`] copies.

pub mod direction;
pub mod geometry;

pub use direction::Direction;
pub use glam::DVec2;

use serde::{Deserialize, Serialize};

/// Radius shared by every robot kind.
pub const ROBOT_RADIUS: f64 = 10.0;

/// Radius assigned to circular obstacles.
pub const CIRCLE_OBSTACLE_RADIUS: f64 = 30.0;

/// Offset from a line obstacle's anchor to its far endpoint.
pub const LINE_OBSTACLE_SPAN: DVec2 = DVec2::new(40.0, 35.0);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Runs one pass of the sense, cull, act and resolve pipeline.
    Tick,
    /// Starts or pauses the simulation.
    SetRunning {
        /// Whether the periodic driver should keep issuing ticks.
        running: bool,
    },
    /// Requests a new robot of the provided kind.
    SpawnAgent {
        /// Kind of robot to create.
        kind: AgentKind,
        /// Where the robot should appear.
        placement: Placement,
    },
    /// Requests a new static obstacle.
    SpawnObstacle {
        /// Outline of the obstacle.
        shape: ObstacleShape,
        /// Where the obstacle should be anchored.
        placement: Placement,
    },
    /// Selects the first robot or circular obstacle containing the point.
    Select {
        /// Point in arena coordinates.
        point: DVec2,
    },
    /// Relocates the selected entity and clears the selection.
    MoveSelected {
        /// Destination in arena coordinates.
        point: DVec2,
    },
    /// Removes the selected entity.
    DeleteSelected,
    /// Removes every robot and obstacle and resets all counters.
    Clear,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a tick finished and a fresh snapshot is available.
    TickCompleted {
        /// Number of ticks processed since the world was created or loaded.
        tick: u64,
    },
    /// Announces a change of the running flag.
    RunningChanged {
        /// Flag value after processing the command.
        running: bool,
    },
    /// Confirms that a robot joined the arena.
    AgentSpawned {
        /// Identifier assigned to the robot.
        agent: AgentId,
        /// Kind of robot created.
        kind: AgentKind,
        /// Initial position of the robot.
        position: DVec2,
    },
    /// Confirms that an obstacle joined the arena.
    ObstacleSpawned {
        /// Identifier assigned to the obstacle.
        obstacle: ObstacleId,
        /// Outline of the obstacle.
        shape: ObstacleShape,
        /// Anchor position of the obstacle.
        position: DVec2,
    },
    /// Reports that a weak robot was destroyed by contact.
    AgentDestroyed {
        /// Weak robot that was removed.
        agent: AgentId,
        /// Robot whose sensing pass registered the contact.
        by: AgentId,
    },
    /// Confirms that the selected entity was deleted.
    EntityDeleted {
        /// Entity that was removed.
        entity: Selection,
    },
    /// Confirms that the selected entity was relocated.
    EntityMoved {
        /// Entity that was moved.
        entity: Selection,
        /// New position of the entity.
        to: DVec2,
    },
    /// Announces that the selection changed.
    SelectionChanged {
        /// Entity now selected, if any.
        selection: Option<Selection>,
    },
    /// Reports that an avoider robot began steering around an obstacle.
    EvasionStarted {
        /// Avoider robot that entered evasion.
        agent: AgentId,
        /// Obstacle being avoided.
        obstacle: ObstacleId,
    },
    /// Reports that an avoider robot restored its original heading.
    EvasionEnded {
        /// Avoider robot that left evasion.
        agent: AgentId,
    },
    /// Confirms that every entity was removed.
    ArenaCleared,
    /// Reports that a command was refused and left the world unchanged.
    CommandRejected {
        /// Reason for the refusal.
        reason: Rejection,
    },
}

/// Reasons a command may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum Rejection {
    /// Selection edits are disabled while the simulation runs.
    #[error("simulation is running")]
    SimulationRunning,
    /// The command needs a selected entity but none exists.
    #[error("nothing is selected")]
    NothingSelected,
    /// The provided point lies outside the arena.
    #[error("point lies outside the arena")]
    OutOfBounds,
    /// The arena is too small to place the entity clear of the walls.
    #[error("no room to place the entity clear of the walls")]
    NoSpawnRoom,
}

/// Unique identifier assigned to a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new robot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// The four robot kinds that inhabit the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Bounces off walls and other robots on compass headings.
    Normal,
    /// Moves like a normal robot but is destroyed by any robot contact.
    Weak,
    /// Steers around obstacles before restoring its heading.
    Avoider,
    /// Travels on a continuous angle and projects a beam ahead of itself.
    Beam,
}

impl AgentKind {
    /// Every kind in display order.
    pub const ALL: [AgentKind; 4] = [Self::Normal, Self::Weak, Self::Avoider, Self::Beam];

    /// Body radius of the kind.
    #[must_use]
    pub const fn radius(self) -> f64 {
        ROBOT_RADIUS
    }

    /// Distance travelled per tick.
    #[must_use]
    pub const fn speed(self) -> f64 {
        match self {
            Self::Normal => 2.0,
            Self::Weak | Self::Avoider => 3.0,
            Self::Beam => 0.75,
        }
    }

    /// Fill colour used by presentation collaborators.
    #[must_use]
    pub const fn color(self) -> ColorTag {
        match self {
            Self::Normal => ColorTag::Black,
            Self::Weak => ColorTag::Grey,
            Self::Avoider => ColorTag::Blue,
            Self::Beam => ColorTag::Coral,
        }
    }

    /// Human readable label printed in rosters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Regular Robot",
            Self::Weak => "Weak Robot",
            Self::Avoider => "Avoider Robot",
            Self::Beam => "Beam Robot",
        }
    }
}

/// Named fill colours handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorTag {
    /// Normal robots.
    Black,
    /// Weak robots.
    Grey,
    /// Avoider robots.
    Blue,
    /// Beam robots.
    Coral,
    /// Circular obstacles.
    Red,
}

/// Outline of a static obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Disc of radius [`CIRCLE_OBSTACLE_RADIUS`].
    Circle,
    /// Segment spanning [`LINE_OBSTACLE_SPAN`] from its anchor.
    Line,
}

impl ObstacleShape {
    /// Fill colour of the shape. Lines are drawn as bare strokes.
    #[must_use]
    pub const fn color(self) -> Option<ColorTag> {
        match self {
            Self::Circle => Some(ColorTag::Red),
            Self::Line => None,
        }
    }
}

/// Placement strategy for spawn commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Uniformly random position that keeps the entity clear of every wall.
    Random,
    /// Explicit position that must lie inside the arena.
    At(DVec2),
}

/// Reference to a selectable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// A robot.
    Agent(AgentId),
    /// A circular obstacle.
    Obstacle(ObstacleId),
}

/// Progress of an avoider robot through its obstacle evasion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvasionPhase {
    /// Travelling on its own heading.
    #[default]
    Normal,
    /// Holding a sideways heading while touching an obstacle.
    Evading,
    /// Clear of the obstacle and waiting out the cool-down.
    Recovering,
}

/// Orientation of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Heading {
    /// Snapped to the eight-way compass.
    Compass(Direction),
    /// Free angle in radians, used by beam robots.
    Continuous(f64),
}

impl Heading {
    /// Orientation expressed in radians.
    #[must_use]
    pub fn radians(self) -> f64 {
        match self {
            Self::Compass(direction) => direction.radians(),
            Self::Continuous(angle) => angle,
        }
    }

    /// Unit vector pointing along the heading.
    #[must_use]
    pub fn unit(self) -> DVec2 {
        let angle = self.radians();
        DVec2::new(angle.cos(), angle.sin())
    }
}

/// Immutable representation of a single robot used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Identifier assigned to the robot.
    pub id: AgentId,
    /// Kind of the robot.
    pub kind: AgentKind,
    /// Centre of the robot.
    pub position: DVec2,
    /// Body radius.
    pub radius: f64,
    /// Current orientation.
    pub heading: Heading,
    /// Fill colour.
    pub color: ColorTag,
    /// Evasion progress, always [`EvasionPhase::Normal`] for non-avoiders.
    pub evasion: EvasionPhase,
    /// Beam tip for beam robots.
    pub beam_end: Option<DVec2>,
}

/// Geometry of an obstacle as seen by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObstacleOutline {
    /// Disc centred on the obstacle position.
    Circle {
        /// Disc radius.
        radius: f64,
    },
    /// Segment starting at the obstacle position.
    Line {
        /// Far endpoint of the segment.
        end: DVec2,
    },
}

/// Immutable representation of a single obstacle used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Identifier assigned to the obstacle.
    pub id: ObstacleId,
    /// Centre of a circle or first endpoint of a line.
    pub position: DVec2,
    /// Outline of the obstacle.
    pub outline: ObstacleOutline,
    /// Fill colour, present for circles only.
    pub color: Option<ColorTag>,
    /// Display rotation in whole degrees. Collision ignores it.
    pub rotation_degrees: u16,
}

impl ObstacleSnapshot {
    /// Shape discriminator of the obstacle.
    #[must_use]
    pub const fn shape(&self) -> ObstacleShape {
        match self.outline {
            ObstacleOutline::Circle { .. } => ObstacleShape::Circle,
            ObstacleOutline::Line { .. } => ObstacleShape::Line,
        }
    }

    /// Radius of the obstacle; zero marks a line.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        match self.outline {
            ObstacleOutline::Circle { radius } => radius,
            ObstacleOutline::Line { .. } => 0.0,
        }
    }
}

/// Read-only copy of the world handed to presentation collaborators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    width: f64,
    height: f64,
    tick: u64,
    running: bool,
    selected: Option<Selection>,
    agents: Vec<AgentSnapshot>,
    obstacles: Vec<ObstacleSnapshot>,
}

impl WorldSnapshot {
    /// Assembles a snapshot from captured parts. Entity order is display order.
    #[must_use]
    pub fn new(
        (width, height): (f64, f64),
        tick: u64,
        running: bool,
        selected: Option<Selection>,
        agents: Vec<AgentSnapshot>,
        obstacles: Vec<ObstacleSnapshot>,
    ) -> Self {
        Self {
            width,
            height,
            tick,
            running,
            selected,
            agents,
            obstacles,
        }
    }

    /// Arena width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Arena height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Number of ticks processed when the snapshot was taken.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether the simulation was running.
    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }

    /// Entity selected at capture time.
    #[must_use]
    pub const fn selected(&self) -> Option<Selection> {
        self.selected
    }

    /// Captured robots in display order.
    #[must_use]
    pub fn agents(&self) -> &[AgentSnapshot] {
        &self.agents
    }

    /// Captured obstacles in display order.
    #[must_use]
    pub fn obstacles(&self) -> &[ObstacleSnapshot] {
        &self.obstacles
    }

    /// Looks up a captured robot by identifier.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|agent| agent.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AgentId, AgentKind, ColorTag, DVec2, Direction, Heading, ObstacleId, ObstacleOutline,
        ObstacleShape, ObstacleSnapshot, Rejection, Selection, LINE_OBSTACLE_SPAN,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn selection_round_trips_through_bincode() {
        assert_round_trip(&Selection::Agent(AgentId::new(42)));
    }

    #[test]
    fn heading_round_trips_through_bincode() {
        assert_round_trip(&Heading::Compass(Direction::SouthWest));
        assert_round_trip(&Heading::Continuous(1.25));
    }

    #[test]
    fn rejection_round_trips_through_bincode() {
        assert_round_trip(&Rejection::NothingSelected);
    }

    #[test]
    fn kind_tuning_matches_reference_values() {
        assert_eq!(AgentKind::Normal.speed(), 2.0);
        assert_eq!(AgentKind::Weak.speed(), 3.0);
        assert_eq!(AgentKind::Avoider.speed(), 3.0);
        assert_eq!(AgentKind::Beam.speed(), 0.75);
        for kind in AgentKind::ALL {
            assert_eq!(kind.radius(), 10.0);
        }
        assert_eq!(AgentKind::Weak.color(), ColorTag::Grey);
        assert_eq!(AgentKind::Beam.label(), "Beam Robot");
    }

    #[test]
    fn compass_heading_unit_vector_points_along_bearing() {
        let south = Heading::Compass(Direction::South).unit();
        assert!(south.x.abs() < 1e-12);
        assert!((south.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn line_outline_reports_zero_radius() {
        let line = ObstacleSnapshot {
            id: ObstacleId::new(0),
            position: DVec2::ZERO,
            outline: ObstacleOutline::Line {
                end: LINE_OBSTACLE_SPAN,
            },
            color: ObstacleShape::Line.color(),
            rotation_degrees: 0,
        };
        assert_eq!(line.shape(), ObstacleShape::Line);
        assert_eq!(line.color, None);
        assert_eq!(ObstacleShape::Circle.color(), Some(ColorTag::Red));
        assert_eq!(line.radius(), 0.0);
    }

    #[test]
    fn rejection_messages_are_readable() {
        assert_eq!(Rejection::SimulationRunning.to_string(), "simulation is running");
    }
}
