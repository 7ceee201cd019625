//! Field-of-view tiers around the hero's torch.
//! This module exists to keep rendering-relevant sight rules deterministic and isolated.
//! It does not own the full-map timer or torch toggling.

use serde::{Deserialize, Serialize};

use crate::state::GameState;
use crate::types::{Grid, Pos};

const FULL_RADIUS: f64 = 2.5;
const MID_RADIUS: f64 = 5.5;
const DIM_RADIUS: f64 = 6.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FovTier {
    Hidden,
    Dim,
    Mid,
    Full,
    /// Hero's own cell while the torch is out.
    SnuffCore,
    /// The eight cells around a snuffed hero.
    SnuffRing,
}

impl FovTier {
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Full => "tier-3",
            Self::Mid => "tier-2",
            Self::Dim => "tier-1",
            Self::Hidden => "tier-0",
            Self::SnuffCore => "snuff-core",
            Self::SnuffRing => "snuff-ring",
        }
    }
}

pub fn fov_tier(player: Pos, cell: Pos, torch_lit: bool, show_full_map: bool) -> FovTier {
    if show_full_map {
        return FovTier::Full;
    }
    if !torch_lit {
        return match player.chebyshev(cell) {
            0 => FovTier::SnuffCore,
            1 => FovTier::SnuffRing,
            _ => FovTier::Hidden,
        };
    }
    let distance = player.euclidean(cell);
    if distance <= FULL_RADIUS {
        FovTier::Full
    } else if distance <= MID_RADIUS {
        FovTier::Mid
    } else if distance <= DIM_RADIUS {
        FovTier::Dim
    } else {
        FovTier::Hidden
    }
}

pub fn compute_fov_tiers(
    width: usize,
    height: usize,
    player: Pos,
    torch_lit: bool,
    show_full_map: bool,
) -> Grid<FovTier> {
    let mut tiers = Grid::new(width, height, FovTier::Hidden);
    for pos in tiers.positions() {
        tiers[pos] = fov_tier(player, pos, torch_lit, show_full_map);
    }
    tiers
}

impl GameState {
    pub fn fov_tiers(&self) -> Grid<FovTier> {
        compute_fov_tiers(
            self.map.width(),
            self.map.height(),
            self.player,
            self.hero.torch_lit,
            self.show_full_map,
        )
    }
}
