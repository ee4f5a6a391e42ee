//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::dispatch::DEFAULT_MAX_DEPTH;
use crate::node::ProcessContext;

/// Settings shared by a [`Patcher`](crate::Patcher) and its
/// [`PatchProcessor`](crate::PatchProcessor).
///
/// Every field has a default, so partial JSON works:
///
/// ```
/// use patchbay::PatchSettings;
///
/// let settings: PatchSettings = serde_json::from_str(r#"{ "block_size": 128 }"#).unwrap();
/// assert_eq!(settings.block_size, 128);
/// assert_eq!(settings.sample_rate, 48_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchSettings {
    /// Host sample rate in Hz, handed to tick hooks
    pub sample_rate: u32,
    /// Samples per processing tick
    pub block_size: usize,
    /// Capacity of the control -> processing command ring
    pub command_capacity: usize,
    /// Capacity of the processing -> control event ring
    pub event_capacity: usize,
    /// Deepest recursion a single stimulus may reach
    pub max_depth: usize,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 64,
            command_capacity: 1024,
            event_capacity: 1024,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PatchSettings {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the recursion ceiling. Values below 1 are raised to 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) fn context(&self) -> ProcessContext {
        ProcessContext {
            sample_rate: self.sample_rate,
            block_size: self.block_size,
        }
    }
}
