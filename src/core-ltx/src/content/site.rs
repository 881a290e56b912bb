use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ContentTree;
use crate::errors::{Error, read_file};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Domain {
    pub host: String,
    /// Overrides the configured scheme for URLs on this domain.
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Domain {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            scheme: None,
            active: true,
        }
    }

    /// Case-insensitive host comparison, ignoring any `:port` on the request side.
    pub fn matches_host(&self, host: &str) -> bool {
        self.host.eq_ignore_ascii_case(strip_port(host))
    }
}

/// Removes a trailing `:port` from a `Host` header value.
pub(crate) fn strip_port(host: &str) -> &str {
    let host = host.trim();
    match host.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Site {
    /// Site node name; part of every stored artifact key.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domains: Vec<Domain>,
    /// Content tree whose root is the site node.
    #[serde(rename = "root")]
    pub tree: ContentTree,
}

impl Site {
    pub fn primary_domain(&self) -> Option<&Domain> {
        self.domains.iter().find(|d| d.active)
    }

    pub fn serves_host(&self, host: &str) -> bool {
        self.domains.iter().any(|d| d.active && d.matches_host(host))
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() { &self.id } else { &self.name }
    }
}

/// Every site of the CMS at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentSnapshot {
    #[serde(default)]
    pub sites: Vec<Site>,
}

impl ContentSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_json_str(&read_file(path)?)
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    pub fn site_for_host(&self, host: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.serves_host(host))
    }

    /// Active domains of all sites, in site order.
    pub fn active_domains(&self) -> impl Iterator<Item = &Domain> {
        self.sites.iter().flat_map(|s| s.domains.iter()).filter(|d| d.active)
    }
}

/// Where the current content comes from. Called at startup and again on every publish event.
pub trait ContentSource: Send + Sync {
    fn load(&self) -> Result<ContentSnapshot, Error>;
}

/// Reads a JSON snapshot exported from the CMS.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for JsonFileSource {
    fn load(&self) -> Result<ContentSnapshot, Error> {
        tracing::debug!("Loading content snapshot from {}", self.path.display());
        ContentSnapshot::load(&self.path)
    }
}

/// Fixed, in-memory content.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub ContentSnapshot);

impl ContentSource for StaticSource {
    fn load(&self) -> Result<ContentSnapshot, Error> {
        Ok(self.0.clone())
    }
}
