#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the robot arena.
//!
//! The [`World`] owns every robot and obstacle together with the counters and
//! the random source that the tick pipeline draws from. Adapters mutate it
//! exclusively through [`apply`] and observe it through the [`query`] module.

mod agents;
mod obstacles;
pub mod persistence;
mod tick;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robot_arena_core::{
    AgentId, AgentKind, Command, Event, ObstacleId, ObstacleShape, Placement, Rejection, Selection,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use self::{agents::Agent, obstacles::Obstacle};

pub use self::{agents::EVASION_COOLDOWN_TICKS, persistence::PersistenceError};

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;
const DEFAULT_SEED: u64 = 0x5eed_a12e_4a00_0001;

/// Height reserved above the arena for the control strip.
pub const DEFAULT_WALL_INSET: f64 = 65.0;

/// Gap kept between a randomly placed entity and the nearest wall.
const SPAWN_CLEARANCE: f64 = 5.0;

/// Parameters required to construct a world.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    width: f64,
    height: f64,
    wall_inset: f64,
    rng_seed: u64,
    reset_weak_population_each_tick: bool,
}

impl Config {
    /// Creates a configuration for an arena of the provided size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            wall_inset: DEFAULT_WALL_INSET,
            rng_seed: DEFAULT_SEED,
            reset_weak_population_each_tick: false,
        }
    }

    /// Overrides the band reserved above the top wall.
    #[must_use]
    pub const fn with_wall_inset(mut self, wall_inset: f64) -> Self {
        self.wall_inset = wall_inset;
        self
    }

    /// Overrides the seed of the world's random source.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Zeroes the weak robot population after every cull instead of tracking it.
    #[must_use]
    pub const fn with_weak_population_reset(mut self, enabled: bool) -> Self {
        self.reset_weak_population_each_tick = enabled;
        self
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

    /// Band reserved above the top wall.
    #[must_use]
    pub const fn wall_inset(&self) -> f64 {
        self.wall_inset
    }

    /// Seed of the world's random source.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Checks that the configuration describes a usable arena.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.wall_inset.is_finite() || self.wall_inset < 0.0 || self.wall_inset >= self.height
        {
            return Err(ConfigError::InvalidWallInset {
                inset: self.wall_inset,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Reasons a configuration is refused.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is not a positive finite number.
    #[error("arena dimensions {width}x{height} must be positive and finite")]
    InvalidDimensions {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
    /// The wall inset leaves no playable height.
    #[error("wall inset {inset} must lie within [0, {height})")]
    InvalidWallInset {
        /// Requested inset.
        inset: f64,
        /// Arena height.
        height: f64,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Counters {
    /// Next robot identifier; moves back by one when a weak robot is destroyed.
    robots: u32,
    obstacles: u32,
    weak_population: u32,
}

/// Represents the authoritative robot arena state.
#[derive(Debug)]
pub struct World {
    config: Config,
    agents: Vec<Agent>,
    obstacles: Vec<Obstacle>,
    selected: Option<Selection>,
    running: bool,
    counters: Counters,
    tick_index: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty, paused world.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            agents: Vec::new(),
            obstacles: Vec::new(),
            selected: None,
            running: false,
            counters: Counters::default(),
            tick_index: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    /// Replaces this world with a persisted one.
    ///
    /// The current state is untouched when decoding fails.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), PersistenceError> {
        *self = persistence::decode(bytes)?;
        Ok(())
    }

    fn agent_index(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|agent| agent.id() == id)
    }

    fn obstacle_index(&self, id: ObstacleId) -> Option<usize> {
        self.obstacles.iter().position(|obstacle| obstacle.id() == id)
    }

    fn contains_point(&self, point: DVec2) -> bool {
        point.is_finite()
            && (0.0..=self.config.width).contains(&point.x)
            && (0.0..=self.config.height).contains(&point.y)
    }

    fn allocate_agent_id(&mut self) -> AgentId {
        let mut candidate = self.counters.robots;
        while self.agents.iter().any(|agent| agent.id().get() == candidate) {
            candidate = candidate.wrapping_add(1);
        }
        self.counters.robots = candidate.wrapping_add(1);
        AgentId::new(candidate)
    }

    /// Picks an anchor so that the extent `(min, max)` stays clear of every wall.
    fn random_anchor(&mut self, (min, max): (DVec2, DVec2)) -> Result<DVec2, Rejection> {
        let low = DVec2::new(
            SPAWN_CLEARANCE - min.x,
            self.config.wall_inset + SPAWN_CLEARANCE - min.y,
        );
        let high = DVec2::new(
            self.config.width - SPAWN_CLEARANCE - max.x,
            self.config.height - SPAWN_CLEARANCE - max.y,
        );
        if low.x > high.x || low.y > high.y {
            return Err(Rejection::NoSpawnRoom);
        }
        let x = self.rng.gen_range(low.x..=high.x);
        let y = self.rng.gen_range(low.y..=high.y);
        Ok(DVec2::new(x, y))
    }

    fn place(&mut self, placement: Placement, extent: (DVec2, DVec2)) -> Result<DVec2, Rejection> {
        match placement {
            Placement::Random => self.random_anchor(extent),
            Placement::At(point) if self.contains_point(point) => Ok(point),
            Placement::At(_) => Err(Rejection::OutOfBounds),
        }
    }

    fn spawn_agent(&mut self, kind: AgentKind, placement: Placement) -> Result<Event, Rejection> {
        let radius = kind.radius();
        let position = self.place(placement, (DVec2::splat(-radius), DVec2::splat(radius)))?;
        let id = self.allocate_agent_id();
        self.agents
            .push(Agent::spawn(id, kind, position, &mut self.rng));
        if kind == AgentKind::Weak {
            self.counters.weak_population = self.counters.weak_population.saturating_add(1);
        }
        Ok(Event::AgentSpawned {
            agent: id,
            kind,
            position,
        })
    }

    fn spawn_obstacle(
        &mut self,
        shape: ObstacleShape,
        placement: Placement,
    ) -> Result<Event, Rejection> {
        let position = self.place(placement, obstacles::extent(shape))?;
        let rotation = match shape {
            ObstacleShape::Line => self.rng.gen_range(0..360),
            ObstacleShape::Circle => 0,
        };
        let id = ObstacleId::new(self.counters.obstacles);
        self.counters.obstacles = self.counters.obstacles.wrapping_add(1);
        self.obstacles
            .push(Obstacle::new(id, shape, position, rotation));
        Ok(Event::ObstacleSpawned {
            obstacle: id,
            shape,
            position,
        })
    }

    fn ensure_paused(&self) -> Result<(), Rejection> {
        if self.running {
            Err(Rejection::SimulationRunning)
        } else {
            Ok(())
        }
    }

    fn select(&mut self, point: DVec2) -> Result<Option<Selection>, Rejection> {
        self.ensure_paused()?;
        let agent = self
            .agents
            .iter()
            .find(|agent| agent.position().distance(point) <= agent.radius())
            .map(|agent| Selection::Agent(agent.id()));
        self.selected = agent.or_else(|| {
            self.obstacles
                .iter()
                .find(|obstacle| obstacle.contains(point))
                .map(|obstacle| Selection::Obstacle(obstacle.id()))
        });
        Ok(self.selected)
    }

    fn move_selected(&mut self, point: DVec2) -> Result<Selection, Rejection> {
        self.ensure_paused()?;
        let selection = self.selected.ok_or(Rejection::NothingSelected)?;
        if !self.contains_point(point) {
            return Err(Rejection::OutOfBounds);
        }
        match selection {
            Selection::Agent(id) => {
                if let Some(index) = self.agent_index(id) {
                    self.agents[index].relocate(point);
                }
            }
            Selection::Obstacle(id) => {
                if let Some(index) = self.obstacle_index(id) {
                    self.obstacles[index].relocate(point);
                }
            }
        }
        self.selected = None;
        Ok(selection)
    }

    fn delete_selected(&mut self) -> Result<Selection, Rejection> {
        self.ensure_paused()?;
        let selection = self.selected.take().ok_or(Rejection::NothingSelected)?;
        match selection {
            Selection::Agent(id) => {
                if let Some(index) = self.agent_index(id) {
                    let removed = self.agents.remove(index);
                    if removed.is_weak() {
                        self.counters.weak_population =
                            self.counters.weak_population.saturating_sub(1);
                    }
                }
            }
            Selection::Obstacle(id) => {
                if let Some(index) = self.obstacle_index(id) {
                    let _ = self.obstacles.remove(index);
                }
            }
        }
        Ok(selection)
    }

    fn clear(&mut self) {
        self.agents.clear();
        self.obstacles.clear();
        self.selected = None;
        self.counters = Counters::default();
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => tick::run(world, out_events),
        Command::SetRunning { running } => {
            world.running = running;
            out_events.push(Event::RunningChanged { running });
        }
        Command::SpawnAgent { kind, placement } => {
            emit(world.spawn_agent(kind, placement), out_events);
        }
        Command::SpawnObstacle { shape, placement } => {
            emit(world.spawn_obstacle(shape, placement), out_events);
        }
        Command::Select { point } => {
            let outcome = world
                .select(point)
                .map(|selection| Event::SelectionChanged { selection });
            emit(outcome, out_events);
        }
        Command::MoveSelected { point } => {
            let outcome = world.move_selected(point).map(|entity| {
                debug!(?entity, x = point.x, y = point.y, "moved selected entity");
                Event::EntityMoved { entity, to: point }
            });
            emit(outcome, out_events);
        }
        Command::DeleteSelected => {
            let outcome = world.delete_selected().map(|entity| {
                debug!(?entity, "deleted selected entity");
                Event::EntityDeleted { entity }
            });
            emit(outcome, out_events);
        }
        Command::Clear => {
            world.clear();
            info!("arena cleared");
            out_events.push(Event::ArenaCleared);
        }
    }
}

fn emit(outcome: Result<Event, Rejection>, out_events: &mut Vec<Event>) {
    match outcome {
        Ok(event) => out_events.push(event),
        Err(reason) => {
            debug!(%reason, "command rejected");
            out_events.push(Event::CommandRejected { reason });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use robot_arena_core::{AgentId, Selection, WorldSnapshot};

    use super::{Config, World};

    /// Captures a read-only copy of the arena for presentation collaborators.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot::new(
            (world.config.width, world.config.height),
            world.tick_index,
            world.running,
            world.selected,
            world.agents.iter().map(|agent| agent.snapshot()).collect(),
            world
                .obstacles
                .iter()
                .map(|obstacle| obstacle.snapshot())
                .collect(),
        )
    }

    /// Provides read-only access to the configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Whether the periodic driver should be issuing ticks.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.running
    }

    /// Entity currently selected, if any.
    #[must_use]
    pub fn selection(world: &World) -> Option<Selection> {
        world.selected
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Live weak robot population as tracked by the world.
    #[must_use]
    pub fn weak_population(world: &World) -> u32 {
        world.counters.weak_population
    }

    /// Identifier the next spawned robot will try to claim.
    #[must_use]
    pub fn next_agent_id(world: &World) -> AgentId {
        AgentId::new(world.counters.robots)
    }

    /// Number of robots in the arena.
    #[must_use]
    pub fn agent_count(world: &World) -> usize {
        world.agents.len()
    }

    /// Number of obstacles in the arena.
    #[must_use]
    pub fn obstacle_count(world: &World) -> usize {
        world.obstacles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_arena_core::EvasionPhase;

    fn paused_world() -> World {
        World::new(Config::new(400.0, 400.0).with_seed(17)).expect("valid config")
    }

    fn spawn_at(world: &mut World, kind: AgentKind, x: f64, y: f64) -> AgentId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnAgent {
                kind,
                placement: Placement::At(DVec2::new(x, y)),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::AgentSpawned { agent, .. }] => *agent,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn config_builders_are_visible_through_getters() {
        let config = Config::new(320.0, 240.0).with_wall_inset(20.0).with_seed(77);
        assert_eq!(config.wall_inset(), 20.0);
        assert_eq!(config.rng_seed(), 77);
        assert_eq!(Config::default().wall_inset(), DEFAULT_WALL_INSET);
    }

    #[test]
    fn config_rejects_degenerate_dimensions() {
        assert!(matches!(
            World::new(Config::new(-1.0, 100.0)),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            World::new(Config::new(100.0, f64::NAN)),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            World::new(Config::new(100.0, 60.0)),
            Err(ConfigError::InvalidWallInset { .. })
        ));
    }

    #[test]
    fn random_spawns_stay_clear_of_walls() {
        let mut world = paused_world();
        let mut events = Vec::new();
        for kind in AgentKind::ALL {
            for _ in 0..25 {
                apply(
                    &mut world,
                    Command::SpawnAgent {
                        kind,
                        placement: Placement::Random,
                    },
                    &mut events,
                );
            }
        }
        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.agents().len(), 100);
        for agent in snapshot.agents() {
            assert!(agent.position.x >= agent.radius);
            assert!(agent.position.x <= 400.0 - agent.radius);
            assert!(agent.position.y >= agent.radius + DEFAULT_WALL_INSET);
            assert!(agent.position.y <= 400.0 - agent.radius);
            assert_eq!(agent.evasion, EvasionPhase::Normal);
        }
    }

    #[test]
    fn ids_are_assigned_in_spawn_order() {
        let mut world = paused_world();
        let first = spawn_at(&mut world, AgentKind::Normal, 100.0, 100.0);
        let second = spawn_at(&mut world, AgentKind::Weak, 200.0, 200.0);
        assert_eq!(first, AgentId::new(0));
        assert_eq!(second, AgentId::new(1));
        assert_eq!(query::weak_population(&world), 1);
    }

    #[test]
    fn out_of_bounds_spawn_is_rejected() {
        let mut world = paused_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnAgent {
                kind: AgentKind::Normal,
                placement: Placement::At(DVec2::new(401.0, 10.0)),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: Rejection::OutOfBounds
            }]
        );
        assert_eq!(query::agent_count(&world), 0);
    }

    #[test]
    fn tiny_arena_has_no_spawn_room() {
        let mut world =
            World::new(Config::new(40.0, 100.0).with_wall_inset(10.0)).expect("valid config");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnObstacle {
                shape: ObstacleShape::Circle,
                placement: Placement::Random,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: Rejection::NoSpawnRoom
            }]
        );
    }

    #[test]
    fn select_move_and_delete_follow_selection() {
        let mut world = paused_world();
        let id = spawn_at(&mut world, AgentKind::Weak, 100.0, 150.0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Select {
                point: DVec2::new(105.0, 150.0),
            },
            &mut events,
        );
        assert_eq!(query::selection(&world), Some(Selection::Agent(id)));

        apply(
            &mut world,
            Command::MoveSelected {
                point: DVec2::new(200.0, 220.0),
            },
            &mut events,
        );
        assert_eq!(query::selection(&world), None);
        let moved = query::snapshot(&world).agent(id).cloned().expect("agent");
        assert_eq!(moved.position, DVec2::new(200.0, 220.0));

        apply(
            &mut world,
            Command::Select {
                point: DVec2::new(200.0, 220.0),
            },
            &mut events,
        );
        apply(&mut world, Command::DeleteSelected, &mut events);
        assert_eq!(query::agent_count(&world), 0);
        assert_eq!(query::weak_population(&world), 0);
        assert_eq!(query::selection(&world), None);
    }

    #[test]
    fn selection_edits_are_rejected_while_running() {
        let mut world = paused_world();
        let _ = spawn_at(&mut world, AgentKind::Normal, 100.0, 150.0);
        let mut events = Vec::new();
        apply(&mut world, Command::SetRunning { running: true }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Select {
                point: DVec2::new(100.0, 150.0),
            },
            &mut events,
        );
        apply(&mut world, Command::DeleteSelected, &mut events);
        apply(
            &mut world,
            Command::MoveSelected {
                point: DVec2::new(10.0, 10.0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::CommandRejected {
                    reason: Rejection::SimulationRunning
                };
                3
            ]
        );
        assert_eq!(query::selection(&world), None);
        assert_eq!(query::agent_count(&world), 1);
    }

    #[test]
    fn delete_without_selection_is_a_noop() {
        let mut world = paused_world();
        let _ = spawn_at(&mut world, AgentKind::Normal, 100.0, 150.0);
        let mut events = Vec::new();
        apply(&mut world, Command::DeleteSelected, &mut events);
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: Rejection::NothingSelected
            }]
        );
        assert_eq!(query::agent_count(&world), 1);
    }

    #[test]
    fn line_obstacles_cannot_be_selected() {
        let mut world = paused_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnObstacle {
                shape: ObstacleShape::Line,
                placement: Placement::At(DVec2::new(100.0, 100.0)),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Select {
                point: DVec2::new(100.0, 100.0),
            },
            &mut events,
        );
        assert_eq!(query::selection(&world), None);
    }

    #[test]
    fn clear_is_allowed_while_running_and_resets_counters() {
        let mut world = paused_world();
        let _ = spawn_at(&mut world, AgentKind::Weak, 100.0, 150.0);
        let _ = spawn_at(&mut world, AgentKind::Normal, 200.0, 150.0);
        let mut events = Vec::new();
        apply(&mut world, Command::SetRunning { running: true }, &mut events);
        apply(&mut world, Command::Clear, &mut events);
        assert_eq!(events.last(), Some(&Event::ArenaCleared));
        assert_eq!(query::agent_count(&world), 0);
        assert_eq!(query::weak_population(&world), 0);
        assert_eq!(query::next_agent_id(&world), AgentId::new(0));
        assert!(query::is_running(&world));
    }
}
