//! Base map generation with validation and bounded regeneration, plus the
//! full level build on top of it.

mod hazards;
mod pipeline;

use crate::config::{CountRange, GeneratorConfig, RatioBand};
use crate::rng::GameRng;
use crate::types::Grid;

use super::connectivity::{count_rooms, is_connected};
use super::features::PlacementError;
use super::grid::{floor_ratio, perimeter_wall_ratio};
use super::layout::{carve_center_out, carve_perimeter_biased};
use super::model::{BaseMap, GeneratedLevel, GenerationReport, LevelReport, Strategy};
use pipeline::place_features;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("{strategy} generation gave up after {attempts} attempts")]
    AttemptsExhausted {
        strategy: Strategy,
        attempts: u32,
        /// Placement failure of the final attempt, if the base map was accepted.
        last_placement: Option<PlacementError>,
    },
    #[error("{0}")]
    InvalidConfig(String),
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
enum Rejection {
    #[error("map has no floor or no wall")]
    Degenerate,
    #[error("perimeter wall ratio {0:.2} too low")]
    OpenPerimeter(f64),
    #[error("floor ratio {0:.2} outside band")]
    FloorRatio(f64),
    #[error("floor is not connected")]
    Disconnected,
    #[error("{0} rooms outside range")]
    RoomCount(usize),
}

pub struct MapGenerator {
    config: GeneratorConfig,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn band(&self, strategy: Strategy) -> (RatioBand, CountRange) {
        match strategy {
            Strategy::Default => (self.config.default_floor_band, self.config.default_rooms),
            Strategy::CenterOut => {
                (self.config.center_out_floor_band, self.config.center_out_rooms)
            }
        }
    }

    /// Carves candidates until one passes validation or `max_attempts` runs out.
    pub fn generate_base(
        &self,
        strategy: Strategy,
        rng: &mut dyn GameRng,
    ) -> Result<BaseMap, GenerationError> {
        self.config.validate().map_err(|err| GenerationError::InvalidConfig(err.to_string()))?;
        let (band, rooms) = self.band(strategy);
        let (width, height) = (self.config.width, self.config.height);
        for attempt in 1..=self.config.max_attempts {
            let (mask, merged_rooms) = match strategy {
                Strategy::Default => (carve_perimeter_biased(width, height, band, rng), None),
                Strategy::CenterOut => {
                    let layout = carve_center_out(width, height, band, rng);
                    (layout.mask, Some(layout.merged_room_count))
                }
            };
            match self.validate(&mask, band, rooms, merged_rooms) {
                Ok((floor_ratio, room_count)) => {
                    tracing::debug!(
                        %strategy,
                        attempt,
                        floor_ratio,
                        room_count,
                        "base map accepted"
                    );
                    let report =
                        GenerationReport { strategy, attempts: attempt, floor_ratio, room_count };
                    return Ok(BaseMap { mask, report });
                }
                Err(rejection) => {
                    tracing::debug!(%strategy, attempt, %rejection, "base map rejected");
                }
            }
        }
        Err(GenerationError::AttemptsExhausted {
            strategy,
            attempts: self.config.max_attempts,
            last_placement: None,
        })
    }

    fn validate(
        &self,
        mask: &Grid<bool>,
        band: RatioBand,
        rooms: CountRange,
        merged_rooms: Option<usize>,
    ) -> Result<(f64, usize), Rejection> {
        let floor = mask.count_true();
        if floor == 0 || floor == mask.len() {
            return Err(Rejection::Degenerate);
        }
        let perimeter = perimeter_wall_ratio(mask);
        if perimeter < self.config.min_perimeter_wall_ratio {
            return Err(Rejection::OpenPerimeter(perimeter));
        }
        let ratio = floor_ratio(mask);
        if !band.contains(ratio) {
            return Err(Rejection::FloorRatio(ratio));
        }
        if !is_connected(mask) {
            return Err(Rejection::Disconnected);
        }
        let room_count = merged_rooms.unwrap_or_else(|| count_rooms(mask));
        if !rooms.contains(room_count) {
            return Err(Rejection::RoomCount(room_count));
        }
        Ok((ratio, room_count))
    }

    /// Accepted base map plus every gameplay feature. A failed placement
    /// throws the base map away and starts over.
    pub fn generate_complete_level(
        &self,
        strategy: Strategy,
        rng: &mut dyn GameRng,
    ) -> Result<GeneratedLevel, GenerationError> {
        self.config.validate().map_err(|err| GenerationError::InvalidConfig(err.to_string()))?;
        let mut last_placement = None;
        for level_attempt in 1..=self.config.max_attempts {
            let base = self.generate_base(strategy, rng)?;
            match place_features(&base.to_map_data(), &self.config, rng) {
                Ok(placed) => {
                    let report = LevelReport {
                        base: base.report,
                        levels_attempted: level_attempt,
                        placement: placed.report,
                    };
                    return Ok(GeneratedLevel {
                        map: placed.map,
                        player_start: placed.player_start,
                        exit: placed.exit,
                        exit_key: placed.exit_key,
                        enemies: placed.enemies,
                        report,
                    });
                }
                Err(error) => {
                    tracing::debug!(%strategy, level_attempt, %error, "feature placement failed");
                    last_placement = Some(error);
                }
            }
        }
        Err(GenerationError::AttemptsExhausted {
            strategy,
            attempts: self.config.max_attempts,
            last_placement,
        })
    }
}
