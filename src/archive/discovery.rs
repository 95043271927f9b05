//! Primary archiver discovery
//!
//! Discovery is an ordered list of probes; the first probe that finds an
//! executable wins. An empty list always selects the built-in fallback.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::Settings;
use crate::logging::Logger;

/// One way of locating the primary archiver
pub trait ToolProbe {
    /// Short description for logs
    fn describe(&self) -> String;

    /// Return the executable path if this probe finds one
    fn probe(&self) -> Option<PathBuf>;
}

/// Looks up executable names on the process search path
pub struct SearchPathProbe {
    names: Vec<String>,
    search_path: Option<OsString>,
}

impl SearchPathProbe {
    /// Search the `PATH` of the current process
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            search_path: None,
        }
    }

    /// Search an explicit path list instead of `PATH`
    pub fn with_search_path(names: Vec<String>, search_path: impl Into<OsString>) -> Self {
        Self {
            names,
            search_path: Some(search_path.into()),
        }
    }
}

impl ToolProbe for SearchPathProbe {
    fn describe(&self) -> String {
        format!("search path ({})", self.names.join(", "))
    }

    fn probe(&self) -> Option<PathBuf> {
        self.names.iter().find_map(|name| match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        })
    }
}

/// Checks a fixed list of install locations
pub struct KnownLocationsProbe {
    paths: Vec<PathBuf>,
}

impl KnownLocationsProbe {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ToolProbe for KnownLocationsProbe {
    fn describe(&self) -> String {
        format!("{} known install locations", self.paths.len())
    }

    fn probe(&self) -> Option<PathBuf> {
        self.paths.iter().find(|p| p.is_file()).cloned()
    }
}

/// Probe that always returns the same answer
pub struct FixedProbe(pub Option<PathBuf>);

impl ToolProbe for FixedProbe {
    fn describe(&self) -> String {
        match &self.0 {
            Some(path) => format!("fixed tool {}", path.display()),
            None => "no tool".to_string(),
        }
    }

    fn probe(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Ordered set of probes
#[derive(Default)]
pub struct ToolDiscovery {
    probes: Vec<Box<dyn ToolProbe>>,
}

impl ToolDiscovery {
    /// Discovery that never finds a primary tool
    pub fn none() -> Self {
        Self::default()
    }

    /// Search path first, then the configured install locations
    pub fn from_settings(settings: &Settings) -> Self {
        Self::none()
            .with_probe(SearchPathProbe::new(settings.primary_tool_names.clone()))
            .with_probe(KnownLocationsProbe::new(settings.known_tool_paths.clone()))
    }

    /// Append a probe
    pub fn with_probe(mut self, probe: impl ToolProbe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Run the probes in order
    pub fn discover(&self, log: &Logger) -> Option<PathBuf> {
        for probe in &self.probes {
            if let Some(path) = probe.probe() {
                log.info(format!("Archiver found via {}: {}", probe.describe(), path.display()));
                return Some(path);
            }
            log.debug(format!("No archiver via {}", probe.describe()));
        }
        None
    }
}
