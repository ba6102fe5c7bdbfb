use std::collections::HashSet;

use crate::constants::{BIAS_FEATURE, FEATURE_CAPACITY};

/// Turns a RAM snapshot into a sparse binary feature vector: the positions
/// of set bits, MSB-first within each byte, plus a trailing bias feature.
/// A null-feature mask suppresses specific indices (used by the staged
/// feature-reveal schedule some agents apply).
#[derive(Debug, Default)]
pub struct FeatureExtractor {
    null_features: HashSet<usize>,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            null_features: HashSet::new(),
        }
    }

    pub fn clear_null_features(&mut self) {
        self.null_features.clear();
    }

    pub fn add_null_feature(&mut self, index: usize) {
        self.null_features.insert(index);
    }

    /// Extracts features from `ram` into `out`, clearing it first. Returns
    /// the number of features written (`out.len()`).
    pub fn extract(&self, ram: &[u8], out: &mut Vec<usize>) -> usize {
        out.clear();
        for (i, byte) in ram.iter().enumerate() {
            for j in 0..8 {
                if byte & (1 << j) != 0 {
                    let p = 8 * i + (7 - j);
                    if !self.null_features.contains(&p) {
                        out.push(p);
                    }
                }
            }
        }
        if !self.null_features.contains(&BIAS_FEATURE) {
            out.push(BIAS_FEATURE);
        }
        debug_assert!(out.iter().all(|&p| p < FEATURE_CAPACITY));
        out.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_msb_first_positions() {
        let extractor = FeatureExtractor::new();
        let mut ram = vec![0u8; crate::constants::RAM_BYTES];
        ram[0] = 0b1000_0001; // bits 0 and 7 set
        let mut out = Vec::new();
        extractor.extract(&ram, &mut out);
        assert!(out.contains(&(8 * 0 + (7 - 0)))); // bit 0 -> position 7
        assert!(out.contains(&(8 * 0 + (7 - 7)))); // bit 7 -> position 0
        assert!(out.contains(&BIAS_FEATURE));
    }

    #[test]
    fn bias_present_unless_masked() {
        let mut extractor = FeatureExtractor::new();
        let ram = vec![0u8; crate::constants::RAM_BYTES];
        let mut out = Vec::new();
        extractor.extract(&ram, &mut out);
        assert_eq!(out, vec![BIAS_FEATURE]);

        extractor.add_null_feature(BIAS_FEATURE);
        extractor.extract(&ram, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn no_duplicate_indices() {
        let extractor = FeatureExtractor::new();
        let mut ram = vec![0xFFu8; crate::constants::RAM_BYTES];
        ram[5] = 0xFF;
        let mut out = Vec::new();
        let n = extractor.extract(&ram, &mut out);
        let unique: HashSet<_> = out.iter().collect();
        assert_eq!(unique.len(), n);
    }

    #[test]
    fn null_feature_suppresses_single_bit() {
        let mut extractor = FeatureExtractor::new();
        let mut ram = vec![0u8; crate::constants::RAM_BYTES];
        ram[0] = 0b0000_0001; // bit 0 -> position 7
        extractor.add_null_feature(7);
        let mut out = Vec::new();
        extractor.extract(&ram, &mut out);
        assert!(!out.contains(&7));
        assert!(out.contains(&BIAS_FEATURE));
    }
}
