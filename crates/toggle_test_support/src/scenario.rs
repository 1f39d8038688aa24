//! Click scenarios stored as TOML fixtures.
//!
//! ```toml
//! name = "span click opens the toggle"
//! html = '<div class="toggle" id="t"><span id="s">More</span></div>'
//!
//! [config]              # optional, interpreted by the crate under test
//! marker_class = "toggle"
//!
//! [[steps]]             # a step without `click` only checks state
//! click = "#s"
//! expect_failures = 0
//! [steps.expect]
//! "#t" = "open"
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub html: String,
    #[serde(default)]
    pub config: Option<toml::Table>,
    /// Skip firing document ready, e.g. to check nothing happens before it.
    #[serde(default)]
    pub skip_ready: bool,
    /// Listener count expected right after initialization.
    #[serde(default)]
    pub expect_initialized: Option<usize>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    #[serde(default)]
    pub click: Option<String>,
    /// Selector -> expected state label ("open", "closed" or "none").
    #[serde(default)]
    pub expect: BTreeMap<String, String>,
    #[serde(default)]
    pub expect_failures: usize,
    #[serde(default)]
    pub expect_html: Option<String>,
}

pub fn load_scenario(path: &Path) -> Result<Scenario, String> {
    let text =
        fs::read_to_string(path).map_err(|err| format!("read {}: {err}", path.display()))?;
    toml::from_str(&text).map_err(|err| format!("parse {}: {err}", path.display()))
}

/// Load every `*.toml` under `dir`, sorted by file name.
pub fn load_scenarios(dir: &Path) -> Result<Vec<(PathBuf, Scenario)>, String> {
    let entries =
        fs::read_dir(dir).map_err(|err| format!("read dir {}: {err}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|path| load_scenario(&path).map(|scenario| (path, scenario)))
        .collect()
}
