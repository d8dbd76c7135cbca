//! Seed derivation from caller-visible state.
//!
//! `daily_seed` hashes the category key with FNV-1a, folds in the day and a
//! re-roll counter, and finishes with the SplitMix64 mixer. Anyone holding
//! the category id and the date can recompute the seed exactly.

use crate::constants::SEED_GAMMA;
use crate::time::Day;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// SplitMix64 finalizer.
pub fn mix64(z: u64) -> u64 {
    let z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    let z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed for one category on one day. `roll` is 0 for the automatic pick and
/// increases with each manual re-roll so every re-roll is a fresh draw.
pub fn daily_seed(category_key: &str, day: Day, roll: u32) -> u64 {
    let day_bits = (day.epoch_days() as u64).wrapping_mul(SEED_GAMMA);
    mix64(fnv1a(category_key.as_bytes()) ^ day_bits ^ mix64(u64::from(roll)))
}
