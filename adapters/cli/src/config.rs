//! Optional TOML file layered beneath the command-line flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Arena settings read from a TOML file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaFile {
    pub(crate) width: Option<f64>,
    pub(crate) height: Option<f64>,
    pub(crate) wall_inset: Option<f64>,
    pub(crate) seed: Option<u64>,
    pub(crate) reset_weak_population: Option<bool>,
    pub(crate) ticks: Option<u64>,
    pub(crate) tick_interval_ms: Option<u64>,
    pub(crate) population: Population,
}

/// Number of entities of each kind spawned into a fresh arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Population {
    pub(crate) normal: Option<u32>,
    pub(crate) weak: Option<u32>,
    pub(crate) avoider: Option<u32>,
    pub(crate) beam: Option<u32>,
    pub(crate) circles: Option<u32>,
    pub(crate) lines: Option<u32>,
}

impl ArenaFile {
    /// Loads the file at `path`, or the defaults when no path was given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
