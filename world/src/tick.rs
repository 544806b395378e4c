//! Per-tick pipeline: sense, cull, act, resolve, publish.

use std::f64::consts::PI;

use glam::DVec2;
use robot_arena_core::{geometry, AgentId, Direction, Event, Selection};
use tracing::{debug, trace};

use crate::{
    agents::{normalize_angle, Behavior, EvasionTransition},
    Config, World,
};

/// Angle added to a beam robot whenever its beam or body touches something.
const BEAM_NUDGE: f64 = 0.2;

/// Inner planes a robot of a given radius must stay within.
#[derive(Clone, Copy, Debug)]
struct Walls {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Walls {
    fn new(config: &Config, radius: f64) -> Self {
        Self {
            left: radius,
            right: config.width - radius,
            top: radius + config.wall_inset,
            bottom: config.height - radius,
        }
    }

    fn beyond_horizontal(&self, point: DVec2) -> bool {
        point.x < self.left || point.x > self.right
    }

    fn beyond_vertical(&self, point: DVec2) -> bool {
        point.y < self.top || point.y > self.bottom
    }

    fn beyond(&self, point: DVec2) -> bool {
        self.beyond_horizontal(point) || self.beyond_vertical(point)
    }
}

/// Runs one full tick over the world.
pub(crate) fn run(world: &mut World, out_events: &mut Vec<Event>) {
    let destroyed = sense(world, out_events);
    cull(world, &destroyed, out_events);
    act(world);
    resolve(world, out_events);
    world.tick_index = world.tick_index.saturating_add(1);
    out_events.push(Event::TickCompleted {
        tick: world.tick_index,
    });
}

/// Steers every robot away from walls and other robots, queueing weak robots
/// that were touched for destruction.
///
/// Robots already queued still sense, so two touching weak robots take each
/// other out.
fn sense(world: &mut World, out_events: &mut Vec<Event>) -> Vec<AgentId> {
    let mut destroyed = Vec::new();
    for index in 0..world.agents.len() {
        if world.agents[index].compass().is_some() {
            sense_compass(world, index, &mut destroyed, out_events);
        } else {
            sense_beam(world, index, &mut destroyed, out_events);
        }
    }
    destroyed
}

fn sense_compass(
    world: &mut World,
    index: usize,
    destroyed: &mut Vec<AgentId>,
    out_events: &mut Vec<Event>,
) {
    let agent = &world.agents[index];
    let Some(original) = agent.compass() else {
        return;
    };
    let (position, radius) = (agent.position(), agent.radius());
    let walls = Walls::new(&world.config, radius);

    let mut answer = None;
    if position.x < walls.left {
        answer = Some(Direction::go_east(&mut world.rng));
    }
    if position.x > walls.right {
        answer = Some(Direction::go_west(&mut world.rng));
    }
    if position.y < walls.top {
        answer = Some(Direction::go_south(&mut world.rng));
    }
    if position.y > walls.bottom {
        answer = Some(Direction::go_north(&mut world.rng));
    }

    for victim in touched(world, index, destroyed.as_slice()) {
        match victim {
            Contact::Weak(id) => destroy(world, id, index, destroyed, out_events),
            Contact::Solid => answer = Some(original.opposite()),
        }
    }

    if let Some(direction) = answer {
        let agent = &mut world.agents[index];
        if agent.steer(direction) {
            debug!(agent = agent.id().get(), "evasion abandoned after contact");
            out_events.push(Event::EvasionEnded { agent: agent.id() });
        }
    }
}

fn sense_beam(
    world: &mut World,
    index: usize,
    destroyed: &mut Vec<AgentId>,
    out_events: &mut Vec<Event>,
) {
    let agent = &world.agents[index];
    let Behavior::Beam { beam_end, .. } = agent.behavior() else {
        return;
    };
    let mut nudges = 0_u32;
    if Walls::new(&world.config, agent.radius()).beyond(*beam_end) {
        nudges += 1;
    }
    for victim in touched(world, index, destroyed.as_slice()) {
        match victim {
            Contact::Weak(id) => destroy(world, id, index, destroyed, out_events),
            Contact::Solid => nudges += 1,
        }
    }
    if nudges > 0 {
        if let Behavior::Beam { angle, .. } = world.agents[index].behavior_mut() {
            *angle = normalize_angle(*angle + BEAM_NUDGE * f64::from(nudges));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Contact {
    Weak(AgentId),
    Solid,
}

/// Live robots within contact margin of the robot at `index`, in display order.
fn touched(world: &World, index: usize, destroyed: &[AgentId]) -> Vec<Contact> {
    let sensor = &world.agents[index];
    world
        .agents
        .iter()
        .enumerate()
        .filter(|(other_index, other)| {
            *other_index != index
                && !destroyed.contains(&other.id())
                && geometry::circles_overlap(
                    sensor.position(),
                    sensor.radius(),
                    other.position(),
                    other.radius(),
                )
        })
        .map(|(_, other)| {
            if other.is_weak() {
                Contact::Weak(other.id())
            } else {
                Contact::Solid
            }
        })
        .collect()
}

fn destroy(
    world: &mut World,
    victim: AgentId,
    sensor_index: usize,
    destroyed: &mut Vec<AgentId>,
    out_events: &mut Vec<Event>,
) {
    if destroyed.contains(&victim) {
        return;
    }
    let by = world.agents[sensor_index].id();
    destroyed.push(victim);
    world.counters.robots = world.counters.robots.saturating_sub(1);
    trace!(agent = victim.get(), by = by.get(), "weak robot destroyed");
    out_events.push(Event::AgentDestroyed { agent: victim, by });
}

/// Removes the robots queued during sensing and settles the weak population.
fn cull(world: &mut World, destroyed: &[AgentId], out_events: &mut Vec<Event>) {
    if !destroyed.is_empty() {
        let before = world.agents.len();
        world.agents.retain(|agent| !destroyed.contains(&agent.id()));
        let removed = u32::try_from(before - world.agents.len()).unwrap_or(u32::MAX);
        world.counters.weak_population = world.counters.weak_population.saturating_sub(removed);

        if let Some(Selection::Agent(id)) = world.selected {
            if destroyed.contains(&id) {
                world.selected = None;
                out_events.push(Event::SelectionChanged { selection: None });
            }
        }
    }
    if world.config.reset_weak_population_each_tick {
        world.counters.weak_population = 0;
    }
}

/// Moves every robot one step and reflects beam robots off the walls.
fn act(world: &mut World) {
    let config = world.config;
    for agent in &mut world.agents {
        agent.advance();
        let position = agent.position();
        let walls = Walls::new(&config, agent.radius());
        if let Behavior::Beam { angle, .. } = agent.behavior_mut() {
            if walls.beyond_horizontal(position) {
                *angle = PI - *angle;
            }
            if walls.beyond_vertical(position) {
                *angle = -*angle;
            }
            *angle = normalize_angle(*angle);
        }
        agent.refresh_beam();
    }
}

/// Turns robots around on obstacle contact; avoiders advance their evasion.
fn resolve(world: &mut World, out_events: &mut Vec<Event>) {
    let obstacles = &world.obstacles;
    for agent in &mut world.agents {
        let (position, radius) = (agent.position(), agent.radius());
        let id = agent.id();
        if let Behavior::Avoider { heading, evasion } = agent.behavior_mut() {
            let contact = obstacles
                .iter()
                .find(|obstacle| obstacle.touches(position, radius))
                .map(|obstacle| (obstacle.id(), obstacle.position()));
            match evasion.advance(heading, position, contact) {
                Some(EvasionTransition::Started(obstacle)) => {
                    debug!(agent = id.get(), obstacle = obstacle.get(), "evasion started");
                    out_events.push(Event::EvasionStarted {
                        agent: id,
                        obstacle,
                    });
                }
                Some(EvasionTransition::Ended) => {
                    debug!(agent = id.get(), "evasion ended");
                    out_events.push(Event::EvasionEnded { agent: id });
                }
                None => {}
            }
            continue;
        }
        let contacts = obstacles
            .iter()
            .filter(|obstacle| obstacle.touches(position, radius))
            .count();
        for _ in 0..contacts {
            agent.bounce();
        }
        agent.refresh_beam();
    }
}
