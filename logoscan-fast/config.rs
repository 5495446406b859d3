use logoscan_core::FeatureConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Named detector tunings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DetectorPreset {
    /// Library defaults
    #[default]
    Balanced,
    /// Fewer levels and features, higher contrast threshold
    Fast,
    /// More features, lower threshold, finer scale steps
    Quality,
}

impl DetectorPreset {
    /// Apply the preset on top of `cfg`, leaving thread count untouched
    pub fn apply(self, cfg: FeatureConfig) -> FeatureConfig {
        match self {
            DetectorPreset::Balanced => FeatureConfig {
                n_threads: cfg.n_threads,
                ..FeatureConfig::default()
            },
            DetectorPreset::Fast => FeatureConfig {
                threshold: 30,
                n_levels: 4,
                max_features: 300,
                nms_distance: 5.0,
                ..cfg
            },
            DetectorPreset::Quality => FeatureConfig {
                threshold: 12,
                n_levels: 10,
                scale_factor: 1.15,
                nms_distance: 2.0,
                ..cfg
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DetectorPreset::Balanced => "balanced",
            DetectorPreset::Fast => "fast",
            DetectorPreset::Quality => "quality",
        }
    }
}

/// Generate human-readable summary of a detector configuration
pub fn summary(cfg: &FeatureConfig) -> String {
    let cap = match cfg.max_features {
        0 => "all".to_string(),
        n => n.to_string(),
    };
    format!(
        "threshold={}, patch_size={}, edge={}, levels={}x{:.2}, nms={:.1}, max_features={}",
        cfg.threshold,
        cfg.patch_size,
        cfg.edge_threshold,
        cfg.n_levels,
        cfg.scale_factor,
        cfg.nms_distance,
        cap
    )
}
