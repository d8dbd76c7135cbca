/// LCG multiplier (Knuth, MMIX)
pub const LCG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;

/// LCG increment (Knuth, MMIX)
pub const LCG_INCREMENT: u64 = 1_442_695_040_888_963_407;

/// 2^-53: scales the upper 53 bits of a generator step into [0, 1)
pub const UNIT_SCALE: f64 = 1.0 / 9_007_199_254_740_992.0;

/// Recency window applied to new categories
pub const DEFAULT_NO_REPEAT_DAYS: u32 = 3;

/// Largest recency window a category can be configured with
pub const MAX_NO_REPEAT_DAYS: u32 = 14;

/// Golden-ratio increment used to spread day numbers across seed space
pub const SEED_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
