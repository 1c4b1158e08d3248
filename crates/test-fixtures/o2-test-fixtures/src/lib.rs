//! JSON fixtures shared by the o2 crates' tests.
//!
//! `fixtures/manifest.json` maps fixture names to files, grouped by catalog.
//! Each catalog is exposed as a module with `keys`, `json`, `load` and `path`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const MANIFEST_JSON: &str = include_str!("../../../../fixtures/manifest.json");

static MANIFEST: Lazy<Manifest> =
    Lazy::new(|| serde_json::from_str(MANIFEST_JSON).expect("fixtures manifest should parse"));

#[derive(Debug, Deserialize)]
struct Manifest {
    clips: HashMap<String, String>,
    #[serde(rename = "state-graphs")]
    state_graphs: HashMap<String, String>,
}

#[derive(Copy, Clone, Debug)]
enum Catalog {
    Clips,
    StateGraphs,
}

impl Catalog {
    fn label(self) -> &'static str {
        match self {
            Catalog::Clips => "clip set",
            Catalog::StateGraphs => "state graph",
        }
    }

    fn entries(self) -> &'static HashMap<String, String> {
        match self {
            Catalog::Clips => &MANIFEST.clips,
            Catalog::StateGraphs => &MANIFEST.state_graphs,
        }
    }

    fn names(self) -> Vec<String> {
        let mut names: Vec<_> = self.entries().keys().cloned().collect();
        names.sort();
        names
    }

    /// Absolute path of a named fixture; errors on names missing from the manifest.
    fn locate(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading {} '{name}' from {}", self.label(), path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text).with_context(|| format!("parsing {} '{name}'", self.label()))
    }
}

pub mod clips {
    use super::*;

    pub fn keys() -> Vec<String> {
        Catalog::Clips.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Catalog::Clips.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Catalog::Clips.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Catalog::Clips.locate(name)
    }
}

pub mod state_graphs {
    use super::*;

    pub fn keys() -> Vec<String> {
        Catalog::StateGraphs.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Catalog::StateGraphs.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Catalog::StateGraphs.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Catalog::StateGraphs.locate(name)
    }
}
