use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use serde::Deserialize;

/// Everything one measurement session needs. Defaults reproduce the fixed
/// board setup (COM4 at 9600 Bd, 1024 samples at a nominal 8192 Hz); a
/// `fftlink.json` next to the executable can override individual fields.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub port: String,
    pub baud_rate: u32,
    pub samples: usize,
    /// Nominal sampling rate in Hz. Only used to scale the plot axes, never
    /// transmitted to the device.
    pub sampling_rate_hz: u32,
    pub read_timeout_ms: u64,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub plot_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: "COM4".to_string(),
            baud_rate: 9600,
            samples: 1024,
            sampling_rate_hz: 8192,
            read_timeout_ms: 5000,
            input_path: PathBuf::from("fft_input.csv"),
            output_path: PathBuf::from("fft_output.csv"),
            plot_path: PathBuf::from("fft_plot.png"),
        }
    }
}

impl SessionConfig {
    /// The device always returns the half spectrum. If the board firmware
    /// ever changes this ratio, this is the one place to touch.
    pub fn magnitude_count(&self) -> usize {
        self.samples / 2
    }

    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!("loaded config overrides from {}", path.display());
        Ok(config)
    }
}
