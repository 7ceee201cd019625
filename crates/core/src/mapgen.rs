//! Procedural level generation: base layouts, connectivity analysis and
//! feature placement.

pub mod connectivity;
pub mod features;
pub mod model;

mod generator;
mod grid;
mod layout;
mod spawns;

pub use features::{PlacementError, reachability_holds};
pub use generator::{GenerationError, MapGenerator};
pub use model::{
    BaseMap, EnemySpawn, GeneratedLevel, GenerationReport, LevelReport, PlacementReport, Strategy,
};

use crate::config::GeneratorConfig;
use crate::rng::GameRng;

pub fn generate_complete_level(
    strategy: Strategy,
    config: &GeneratorConfig,
    rng: &mut dyn GameRng,
) -> Result<GeneratedLevel, GenerationError> {
    MapGenerator::new(config.clone()).generate_complete_level(strategy, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    #[test]
    fn helper_matches_map_generator_output() {
        let config = GeneratorConfig::default();
        let from_helper =
            generate_complete_level(Strategy::CenterOut, &config, &mut SeededRng::new(77))
                .expect("generation succeeds");
        let from_generator = MapGenerator::new(config)
            .generate_complete_level(Strategy::CenterOut, &mut SeededRng::new(77))
            .expect("generation succeeds");
        assert_eq!(from_helper, from_generator);
    }
}
