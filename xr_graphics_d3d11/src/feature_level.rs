/// D3D feature levels, as the runtime reports them

pub const FEATURE_LEVEL_10_0: u32 = 0xa000;
pub const FEATURE_LEVEL_10_1: u32 = 0xa100;
pub const FEATURE_LEVEL_11_0: u32 = 0xb000;
pub const FEATURE_LEVEL_11_1: u32 = 0xb100;
pub const FEATURE_LEVEL_12_0: u32 = 0xc000;
pub const FEATURE_LEVEL_12_1: u32 = 0xc100;

/// Levels the device is created with, highest first
pub const FEATURE_LEVELS: [u32; 6] = [
    FEATURE_LEVEL_12_1,
    FEATURE_LEVEL_12_0,
    FEATURE_LEVEL_11_1,
    FEATURE_LEVEL_11_0,
    FEATURE_LEVEL_10_1,
    FEATURE_LEVEL_10_0,
];

/// Candidate levels not below `min_feature_level`
pub fn candidate_feature_levels(min_feature_level: u32) -> Vec<u32> {
    FEATURE_LEVELS
        .iter()
        .copied()
        .filter(|&level| level >= min_feature_level)
        .collect()
}

/// "11_1" style name
pub fn feature_level_name(level: u32) -> String {
    format!("{}_{}", level >> 12, (level >> 8) & 0xf)
}

#[cfg(test)]
#[path = "feature_level_tests.rs"]
mod tests;
