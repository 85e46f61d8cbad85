use crate::error::Result;
use log::{info, warn};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SightOptions {
    /// Seconds of simulated time between path re-evaluations.
    pub pathing_interval: f32,
    /// Seconds of simulated time between map upload/download/peer-sharing passes.
    pub sharing_interval: f32,
    pub light_level_count: usize,
    pub compress_light: bool,
    pub default_sight: u16,
    pub wall_symbol: char,
    pub floor_symbol: char,
    /// Zero lets the pool pick one thread per core.
    pub worker_threads: usize,
}

impl Default for SightOptions {
    fn default() -> Self {
        SightOptions {
            pathing_interval: 0.5,
            sharing_interval: 1.0,
            light_level_count: 4,
            compress_light: true,
            default_sight: 8,
            wall_symbol: '#',
            floor_symbol: '.',
            worker_threads: 0,
        }
    }
}

impl SightOptions {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&text)
    }

    /// Loads the options, writing the defaults to `path` first if nothing is there.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let defaults = SightOptions::default();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match fs::write(path, defaults.to_ron_string()?) {
            Ok(()) => info!("Wrote default sight options to {:?}", path),
            Err(e) => warn!("Couldn't write default sight options to {:?}: {}", path, e),
        }

        Ok(defaults)
    }
}
