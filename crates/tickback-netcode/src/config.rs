//! Netcode configuration
//!
//! The history window is the one resource this layer can run out of: if a
//! correction arrives for a tick that has already been evicted, resimulation
//! proceeds from stale data. That bound is checked once, at startup, by
//! [`NetcodeConfig::validate`].

use serde::{Deserialize, Serialize};
use tickback_core::{Movement, Tick, DEFAULT_TOLERANCE};
use tickback_rollback_buffer::DEFAULT_CAPACITY;

/// Configuration for a predicted entity
///
/// # Example
///
/// ```
/// use tickback_netcode::NetcodeConfig;
///
/// let config = NetcodeConfig::from_ron_str("(history_capacity: 128, speed: 4.0)").unwrap();
/// assert_eq!(config.history_capacity, 128);
/// assert_eq!(config.display_offset, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetcodeConfig {
    /// Ticks held by each history buffer
    pub history_capacity: usize,
    /// Maximum position distance still treated as agreement
    pub tolerance: f32,
    /// Ticks between the simulated tick and the displayed tick
    pub display_offset: Tick,
    /// Movement speed in distance units per second
    pub speed: f32,
    /// Worst round trip, in ticks, the history must be able to absorb
    pub max_round_trip_ticks: Tick,
}

impl NetcodeConfig {
    /// Parse a RON document and validate it
    pub fn from_ron_str(text: &str) -> crate::Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Smallest capacity that covers a full round trip, the display offset
    /// and the tick being simulated, or `None` if that does not fit a `Tick`.
    pub fn required_capacity(&self) -> Option<Tick> {
        self.max_round_trip_ticks
            .checked_add(self.display_offset)?
            .checked_add(2)
    }

    /// Check every startup invariant
    pub fn validate(&self) -> crate::Result<()> {
        if self.history_capacity == 0 {
            return Err(crate::Error::InvalidConfig(
                "history_capacity must be greater than 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(crate::Error::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.speed.is_finite() {
            return Err(crate::Error::InvalidConfig(format!(
                "speed must be finite, got {}",
                self.speed
            )));
        }
        if self.display_offset < 0 || self.max_round_trip_ticks < 0 {
            return Err(crate::Error::InvalidConfig(
                "display_offset and max_round_trip_ticks must be non-negative".to_string(),
            ));
        }

        let required = self.required_capacity().ok_or_else(|| {
            crate::Error::InvalidConfig(format!(
                "max_round_trip_ticks ({}) plus display_offset ({}) is out of range",
                self.max_round_trip_ticks, self.display_offset
            ))
        })?;
        if (self.history_capacity as u64) < required as u64 {
            return Err(crate::Error::HistoryTooShort {
                capacity: self.history_capacity,
                required,
            });
        }
        Ok(())
    }

    /// The movement step configured by `speed`
    pub fn movement(&self) -> Movement {
        Movement::new(self.speed)
    }
}

impl Default for NetcodeConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            tolerance: DEFAULT_TOLERANCE,
            display_offset: 2,
            speed: 2.0,
            max_round_trip_ticks: 30,
        }
    }
}
