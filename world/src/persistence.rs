//! Binary save and load of complete worlds.
//!
//! A saved world starts with the magic bytes `RBAR` followed by a little-endian
//! `u16` format version and a `bincode` payload. Presentation state such as
//! window handles never enters the payload; the running flag is dropped too,
//! so a loaded world is always paused.

use std::{
    collections::HashSet,
    io::{Read, Write},
};

use rand_chacha::ChaCha8Rng;
use robot_arena_core::Selection;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{agents::Agent, obstacles::Obstacle, Config, ConfigError, Counters, World};

/// Leading bytes identifying a saved arena.
pub const MAGIC: [u8; 4] = *b"RBAR";

/// Format version written by [`encode`].
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + std::mem::size_of::<u16>();

/// Failures raised while saving or loading a world.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing the underlying stream failed.
    #[error("i/o failure while transferring world")]
    Io(#[from] std::io::Error),
    /// The input ended before the header was complete.
    #[error("saved world is truncated")]
    Truncated,
    /// The input does not start with the arena magic bytes.
    #[error("input is not a saved arena")]
    BadMagic,
    /// The input was written by an unknown format version.
    #[error("unsupported saved world version {0}")]
    UnsupportedVersion(u16),
    /// The world could not be serialised.
    #[error("failed to encode world")]
    Encode(#[source] bincode::Error),
    /// The payload could not be deserialised.
    #[error("failed to decode world payload")]
    Decode(#[source] bincode::Error),
    /// The payload carries an unusable configuration.
    #[error("saved world has an invalid configuration")]
    InvalidConfig(#[from] ConfigError),
    /// The payload violates a world invariant.
    #[error("saved world is inconsistent: {0}")]
    Inconsistent(&'static str),
}

/// Serialisable mirror of everything a world needs to resume.
#[derive(Serialize)]
struct SavedWorldRef<'a> {
    config: &'a Config,
    agents: &'a [Agent],
    obstacles: &'a [Obstacle],
    selected: Option<Selection>,
    counters: Counters,
    tick_index: u64,
    rng: &'a ChaCha8Rng,
}

#[derive(Deserialize)]
struct SavedWorld {
    config: Config,
    agents: Vec<Agent>,
    obstacles: Vec<Obstacle>,
    selected: Option<Selection>,
    counters: Counters,
    tick_index: u64,
    rng: ChaCha8Rng,
}

/// Serialises the world into its binary form.
pub fn encode(world: &World) -> Result<Vec<u8>, PersistenceError> {
    let saved = SavedWorldRef {
        config: &world.config,
        agents: &world.agents,
        obstacles: &world.obstacles,
        selected: world.selected,
        counters: world.counters,
        tick_index: world.tick_index,
        rng: &world.rng,
    };
    let payload = bincode::serialize(&saved).map_err(PersistenceError::Encode)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Rebuilds a paused world from its binary form.
pub fn decode(bytes: &[u8]) -> Result<World, PersistenceError> {
    if bytes.len() < HEADER_LEN {
        return Err(PersistenceError::Truncated);
    }
    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(PersistenceError::BadMagic);
    }
    let (version, payload) = rest.split_at(std::mem::size_of::<u16>());
    let version = u16::from_le_bytes([version[0], version[1]]);
    if version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(version));
    }

    let saved: SavedWorld = bincode::deserialize(payload).map_err(PersistenceError::Decode)?;
    validate(&saved)?;
    Ok(World {
        config: saved.config,
        agents: saved.agents,
        obstacles: saved.obstacles,
        selected: saved.selected,
        running: false,
        counters: saved.counters,
        tick_index: saved.tick_index,
        rng: saved.rng,
    })
}

/// Writes the binary form of the world into the provided sink.
pub fn write_to<W: Write>(world: &World, mut writer: W) -> Result<(), PersistenceError> {
    let bytes = encode(world)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    info!(
        agents = world.agents.len(),
        obstacles = world.obstacles.len(),
        bytes = bytes.len(),
        "world saved"
    );
    Ok(())
}

/// Reads a world previously written with [`write_to`].
pub fn read_from<R: Read>(mut reader: R) -> Result<World, PersistenceError> {
    let mut bytes = Vec::new();
    let _ = reader.read_to_end(&mut bytes)?;
    let world = decode(&bytes)?;
    info!(
        agents = world.agents.len(),
        obstacles = world.obstacles.len(),
        tick = world.tick_index,
        "world loaded"
    );
    Ok(world)
}

fn validate(saved: &SavedWorld) -> Result<(), PersistenceError> {
    saved.config.validate()?;

    let mut agent_ids = HashSet::with_capacity(saved.agents.len());
    for agent in &saved.agents {
        if !agent_ids.insert(agent.id()) {
            return Err(PersistenceError::Inconsistent("duplicate robot identifier"));
        }
        if !agent.position().is_finite() {
            return Err(PersistenceError::Inconsistent("robot position is not finite"));
        }
        if !agent.is_well_formed() {
            return Err(PersistenceError::Inconsistent(
                "robot tuning does not match its kind",
            ));
        }
    }

    let mut obstacle_ids = HashSet::with_capacity(saved.obstacles.len());
    for obstacle in &saved.obstacles {
        if !obstacle_ids.insert(obstacle.id()) {
            return Err(PersistenceError::Inconsistent(
                "duplicate obstacle identifier",
            ));
        }
        if !obstacle.position().is_finite() {
            return Err(PersistenceError::Inconsistent(
                "obstacle position is not finite",
            ));
        }
    }

    let weak = saved.agents.iter().filter(|agent| agent.is_weak()).count();
    if usize::try_from(saved.counters.weak_population).map_or(true, |count| count > weak) {
        return Err(PersistenceError::Inconsistent(
            "weak population exceeds weak robots present",
        ));
    }

    let selection_exists = match saved.selected {
        None => true,
        Some(Selection::Agent(id)) => agent_ids.contains(&id),
        Some(Selection::Obstacle(id)) => obstacle_ids.contains(&id),
    };
    if !selection_exists {
        return Err(PersistenceError::Inconsistent(
            "selection refers to a missing entity",
        ));
    }
    Ok(())
}
