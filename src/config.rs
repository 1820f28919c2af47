//! Buffer configuration
//!
//! Settings are plain JSON; missing fields fall back to the defaults.
//!
//! ```json
//! { "max_prealloc": 1048576, "initial_capacity": 16384 }
//! ```

use crate::buffer::{GrowthPolicy, MAX_PREALLOC, Sds};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Required size below which growth doubles; additive above it.
    pub max_prealloc: usize,
    /// Spare bytes reserved up front by [`BufferConfig::new_buffer`].
    pub initial_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_prealloc: MAX_PREALLOC,
            initial_capacity: 0,
        }
    }
}

impl BufferConfig {
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        debug!(path = %path.display(), ?config, "loaded buffer config");
        Ok(config)
    }

    /// Write the config through a temporary file so readers never see a
    /// partial document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(self.to_json()?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_prealloc == 0 {
            return Err(Error::config("max_prealloc must be greater than zero"));
        }
        Ok(())
    }

    pub fn policy(&self) -> Result<GrowthPolicy> {
        GrowthPolicy::new(self.max_prealloc)
    }

    /// An empty buffer using this config's policy and initial capacity.
    pub fn new_buffer(&self) -> Result<Sds> {
        let mut s = Sds::empty().with_policy(self.policy()?);
        s.make_room_for(self.initial_capacity)?;
        Ok(s)
    }
}
