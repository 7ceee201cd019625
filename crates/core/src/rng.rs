//! Injectable random sources shared by generation and action resolution.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

pub trait GameRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }

    /// Uniform value in `min..=max`.
    fn range_usize(&mut self, min: usize, max: usize) -> usize {
        debug_assert!(min <= max);
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as usize
    }

    fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_unit()
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }
}

pub fn choose<'a, T>(rng: &mut dyn GameRng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.range_usize(0, items.len() - 1))
}

/// Fisher-Yates over the whole slice.
pub fn shuffle<T>(rng: &mut dyn GameRng, items: &mut [T]) {
    for index in (1..items.len()).rev() {
        let swap_with = rng.range_usize(0, index);
        items.swap(index, swap_with);
    }
}

#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl GameRng for SeededRng {
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

/// Replays forced unit rolls before falling back to a seeded stream.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    rolls: VecDeque<f64>,
    fallback: SeededRng,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self { rolls: rolls.into_iter().collect(), fallback: SeededRng::new(0) }
    }

    pub fn push(&mut self, roll: f64) {
        self.rolls.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl GameRng for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        match self.rolls.pop_front() {
            Some(roll) => (roll.clamp(0.0, 1.0) * u64::MAX as f64) as u64,
            None => self.fallback.next_u64(),
        }
    }

    fn range_usize(&mut self, min: usize, max: usize) -> usize {
        match self.rolls.pop_front() {
            Some(roll) => {
                let span = max - min + 1;
                min + ((roll.clamp(0.0, 1.0) * span as f64) as usize).min(span - 1)
            }
            None => self.fallback.range_usize(min, max),
        }
    }

    fn next_unit(&mut self) -> f64 {
        match self.rolls.pop_front() {
            Some(roll) => roll,
            None => self.fallback.next_unit(),
        }
    }
}

static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    mix_seed_stream(entropy, 0)
}

pub fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

/// Seed for the level generated on `floor_index` of a run.
pub fn derive_floor_seed(run_seed: u64, floor_index: u32) -> u64 {
    mix_seed_stream(run_seed ^ 0x9E37_79B9_7F4A_7C15, u64::from(floor_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_usize_stays_inside_requested_bounds() {
        let mut rng = SeededRng::new(12_345);
        for _ in 0..500 {
            let value = rng.range_usize(7, 13);
            assert!((7..=13).contains(&value));
        }
    }

    #[test]
    fn next_unit_is_half_open() {
        let mut rng = SeededRng::new(9);
        for _ in 0..500 {
            let value = rng.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn same_seed_gives_same_stream() {
        let mut left = SeededRng::new(77);
        let mut right = SeededRng::new(77);
        let left_values: Vec<u64> = (0..16).map(|_| left.next_u64()).collect();
        let right_values: Vec<u64> = (0..16).map(|_| right.next_u64()).collect();
        assert_eq!(left_values, right_values);
    }

    #[test]
    fn scripted_rolls_come_first() {
        let mut rng = ScriptedRng::new([0.25, 0.75]);
        assert_eq!(rng.next_unit(), 0.25);
        assert!(!rng.chance(0.5));
        assert_eq!(rng.remaining(), 0);
        assert!((0.0..1.0).contains(&rng.next_unit()));
    }

    #[test]
    fn floor_seed_changes_with_floor_index() {
        assert_ne!(derive_floor_seed(99, 0), derive_floor_seed(99, 1));
        assert_ne!(derive_floor_seed(99, 1), derive_floor_seed(98, 1));
        assert_eq!(derive_floor_seed(99, 1), derive_floor_seed(99, 1));
    }

    #[test]
    fn runtime_seeds_differ_between_calls() {
        assert_ne!(generate_runtime_seed(), generate_runtime_seed());
    }
}
