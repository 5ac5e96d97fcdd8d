//! Session configuration shared by the world and its drivers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, ConfigError};

/// Tunable parameters of a play session.
///
/// Missing fields fall back to [`GameConfig::default`] when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Gold available when the session starts.
    pub starting_gold: u32,
    /// Escapes the base can absorb.
    pub base_hp: u32,
    /// Last wave that must be cleared for victory.
    pub final_wave: u32,
    /// Seed of the default random source.
    pub rng_seed: u64,
    /// Simulation steps per second.
    pub tick_hz: u32,
    /// Cards offered per draw.
    pub card_choices: usize,
    /// Whether the clock starts the first wave once the path is complete.
    pub auto_start_first_wave: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 5,
            starting_gold: 10,
            base_hp: 10,
            final_wave: 15,
            rng_seed: 0x5eed_0f_da7a,
            tick_hz: 60,
            card_choices: 3,
            auto_start_first_wave: true,
        }
    }
}

impl GameConfig {
    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 3 || self.rows == 0 {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.final_wave == 0 {
            return Err(ConfigError::ZeroFinalWave);
        }
        if self.card_choices == 0 {
            return Err(ConfigError::ZeroCardChoices);
        }
        Ok(())
    }

    /// Cell where enemies enter, on the left edge of the midline.
    #[must_use]
    pub const fn spawn(&self) -> CellCoord {
        CellCoord::new(0, self.rows / 2)
    }

    /// Cell enemies walk toward, on the right edge of the midline.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        CellCoord::new(self.columns.saturating_sub(1), self.rows / 2)
    }

    /// Duration of a single simulation step, rounded up to whole nanoseconds.
    #[must_use]
    pub fn fixed_step(&self) -> Duration {
        let hz = u64::from(self.tick_hz.max(1));
        Duration::from_nanos(1_000_000_000u64.div_ceil(hz))
    }
}
