/// Number of RAM bytes ALE exposes for the Atari 2600.
pub const RAM_BYTES: usize = 128;

/// Feature capacity `F = 8*R + 1`; the trailing index is the bias feature.
pub const FEATURE_CAPACITY: usize = 8 * RAM_BYTES + 1;

/// Index of the bias feature, always `FEATURE_CAPACITY - 1`.
pub const BIAS_FEATURE: usize = FEATURE_CAPACITY - 1;
