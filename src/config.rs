use std::{fs::File, io::BufReader, path::Path};

use crate::foundation::{
    core::DelayTicks,
    error::{ConvertError, ConvertResult},
};

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_PALETTE_SIZE: usize = 64;
pub const MIN_PALETTE_SIZE: usize = 2;
pub const MAX_PALETTE_SIZE: usize = 256;

/// Knobs for one conversion run.
///
/// Every field has a default, so a JSON config file only needs the keys it overrides:
///
/// ```json
/// { "concurrency": 4, "delay_ticks": 10 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Number of decode workers (and rayon threads). Must be >= 1.
    pub concurrency: usize,
    /// Display time of every frame.
    pub delay_ticks: DelayTicks,
    /// Colors per frame after quantization, in `2..=256`.
    pub palette_size: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            delay_ticks: DelayTicks(0),
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

impl ConvertConfig {
    pub fn validate(&self) -> ConvertResult<()> {
        if self.concurrency == 0 {
            return Err(ConvertError::config("concurrency must be >= 1"));
        }
        if !(MIN_PALETTE_SIZE..=MAX_PALETTE_SIZE).contains(&self.palette_size) {
            return Err(ConvertError::config(format!(
                "palette size must be within {MIN_PALETTE_SIZE}..={MAX_PALETTE_SIZE}, got {}",
                self.palette_size
            )));
        }
        Ok(())
    }

    pub fn from_json_path(path: &Path) -> ConvertResult<Self> {
        let f = File::open(path).map_err(|e| {
            ConvertError::config(format!("open config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            ConvertError::config(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_delay(mut self, delay: DelayTicks) -> Self {
        self.delay_ticks = delay;
        self
    }

    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
