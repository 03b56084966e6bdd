//! TOML configuration for `cairnctl`.
//!
//! Every section is optional; a missing file means defaults throughout.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, ensure};
use cairn_placement::SharedRing;
use cairn_types::{DEFAULT_CHUNK_SIZE, NodeInfo};
use serde::Deserialize;

/// Default number of distinct nodes each chunk is placed on.
const DEFAULT_REPLICAS: usize = 3;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Chunking parameters.
    pub chunking: ChunkingSection,
    /// Placement parameters.
    pub placement: PlacementSection,
    /// Static node roster (`[[nodes]]` entries).
    pub nodes: Vec<NodeInfo>,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[chunking]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChunkingSection {
    /// Chunk size in bytes. Defaults to 1 MiB.
    pub chunk_size: Option<u32>,
}

/// `[placement]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlacementSection {
    /// Replica count per chunk.
    pub replicas: Option<usize>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                toml::from_str::<CliConfig>(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let config: CliConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.chunk_size() > 0, "chunk_size must be greater than zero");

        let mut ids = HashSet::new();
        let mut addresses = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                bail!("duplicate node id {:?}", node.id);
            }
            if !addresses.insert(node.address()) {
                bail!("duplicate node address {}", node.address());
            }
        }
        Ok(())
    }

    /// Effective chunk size (config value or 1 MiB default).
    pub fn chunk_size(&self) -> u32 {
        self.chunking.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Effective replica count.
    pub fn replicas(&self) -> usize {
        self.placement.replicas.unwrap_or(DEFAULT_REPLICAS)
    }

    /// A ring seeded with every configured node's `host:port` address.
    pub fn ring(&self) -> SharedRing {
        SharedRing::with_nodes(self.nodes.iter().map(NodeInfo::address))
    }
}
