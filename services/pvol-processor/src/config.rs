//! Processor configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use filters::{FilterPipeline, GaussianFilter, SpeckleRemovalFilter, ThresholdFilter};
use radar_common::Channel;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Directory holding scan files.
    pub data_dir: PathBuf,

    /// Output raster width in pixels.
    pub grid_width: usize,

    /// Output raster height in pixels.
    pub grid_height: usize,

    /// Padding around the scan's coverage bounds, degrees.
    pub grid_padding_deg: f64,

    /// Cache backend selection.
    pub cache: CacheBackend,

    /// Process every known volume at startup.
    pub process_on_startup: bool,

    /// Watch the data directory for new files.
    pub watch_directory: bool,

    /// Directory poll interval in seconds.
    pub poll_interval_secs: u64,

    /// Settle time after a new file appears, milliseconds.
    pub debounce_ms: u64,

    /// Cleaning filter chain applied before rasterization.
    pub filters: FilterConfig,

    /// Channels to render per elevation.
    pub channels: Vec<Channel>,
}

/// Cache backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis { url: String, ttl_secs: u64 },
}

/// Per-filter toggles and parameters for the cleaning chain.
///
/// Only reflectivity-like channels are filtered; velocity and correlation
/// fields are rasterized raw regardless of these settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub threshold: bool,
    pub speckle: bool,
    pub speckle_min_area: usize,
    pub gaussian: bool,
    pub gaussian_sigma: f32,
    pub gaussian_radius: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: true,
            speckle: true,
            speckle_min_area: 5,
            gaussian: true,
            gaussian_sigma: 1.0,
            gaussian_radius: 2,
        }
    }
}

impl FilterConfig {
    /// Build the cleaning chain for one channel.
    pub fn pipeline(&self, channel: Channel) -> FilterPipeline {
        match channel {
            Channel::Reflectivity | Channel::TotalPower => {
                let mut pipeline = FilterPipeline::new();
                if self.threshold {
                    let (min, max) = channel.valid_range();
                    pipeline = pipeline.with(ThresholdFilter::new(min, max));
                }
                if self.speckle {
                    pipeline = pipeline.with(SpeckleRemovalFilter::new(self.speckle_min_area));
                }
                if self.gaussian {
                    pipeline =
                        pipeline.with(GaussianFilter::new(self.gaussian_sigma, self.gaussian_radius));
                }
                pipeline
            }
            _ => FilterPipeline::new(),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data/radar"),
            grid_width: 1024,
            grid_height: 1024,
            grid_padding_deg: 0.1,
            cache: CacheBackend::Memory,
            process_on_startup: true,
            watch_directory: true,
            poll_interval_secs: 10,
            debounce_ms: 500,
            filters: FilterConfig::default(),
            channels: vec![Channel::Reflectivity, Channel::RadialVelocity],
        }
    }
}

impl ProcessorConfig {
    /// Load from a YAML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = env::var("RADAR_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var("REDIS_URL") {
            let ttl_secs = match &self.cache {
                CacheBackend::Redis { ttl_secs, .. } => *ttl_secs,
                CacheBackend::Memory => 24 * 3600,
            };
            self.cache = CacheBackend::Redis { url, ttl_secs };
        }
        if let Ok(secs) = env::var("POLL_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                self.poll_interval_secs = secs;
            }
        }
    }
}
