use crate::error::{CurveError, CurveResult};
use crate::generator::CurveGenerationInfo;
use crate::rotation::{TransformStrategy, DEFAULT_CHUNK_SIZE, DEFAULT_KEYFRAME_CHUNK_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "BatchConfig::default_curve_count")]
    pub curve_count: usize,
    #[serde(default = "BatchConfig::default_step_count")]
    pub step_count: usize,
    #[serde(default = "BatchConfig::default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub parallel_sampling: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "GenerationConfig::default_keys_per_curve")]
    pub keys_per_curve: usize,
    #[serde(default = "GenerationConfig::default_min_value")]
    pub min_value: f32,
    #[serde(default = "GenerationConfig::default_max_value")]
    pub max_value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "DispatchConfig::default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "DispatchConfig::default_keyframe_chunk_size")]
    pub keyframe_chunk_size: usize,
    #[serde(default = "DispatchConfig::default_strategies")]
    pub strategies: Vec<TransformStrategy>,
    #[serde(default = "DispatchConfig::default_keyframe_strategy")]
    pub keyframe_strategy: TransformStrategy,
    #[serde(default = "DispatchConfig::default_build_keyframes")]
    pub build_keyframes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchConfig {
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchConfigOverrides {
    pub curve_count: Option<usize>,
    pub keys_per_curve: Option<usize>,
    pub step_count: Option<usize>,
    pub duration: Option<f32>,
    pub chunk_size: Option<usize>,
    pub keyframe_chunk_size: Option<usize>,
    pub seed: Option<u64>,
    pub strategies: Option<Vec<TransformStrategy>>,
    pub build_keyframes: Option<bool>,
    pub parallel_sampling: Option<bool>,
}

impl BatchConfig {
    const fn default_curve_count() -> usize {
        1_000
    }

    const fn default_step_count() -> usize {
        1_000
    }

    const fn default_duration() -> f32 {
        30.0
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            curve_count: Self::default_curve_count(),
            step_count: Self::default_step_count(),
            duration: Self::default_duration(),
            parallel_sampling: false,
        }
    }
}

impl GenerationConfig {
    const fn default_keys_per_curve() -> usize {
        100
    }

    const fn default_min_value() -> f32 {
        -180.0
    }

    const fn default_max_value() -> f32 {
        180.0
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            keys_per_curve: Self::default_keys_per_curve(),
            min_value: Self::default_min_value(),
            max_value: Self::default_max_value(),
        }
    }
}

impl DispatchConfig {
    const fn default_chunk_size() -> usize {
        DEFAULT_CHUNK_SIZE
    }

    const fn default_keyframe_chunk_size() -> usize {
        DEFAULT_KEYFRAME_CHUNK_SIZE
    }

    fn default_strategies() -> Vec<TransformStrategy> {
        TransformStrategy::ALL.to_vec()
    }

    fn default_keyframe_strategy() -> TransformStrategy {
        TransformStrategy::Vectorized
    }

    const fn default_build_keyframes() -> bool {
        true
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: Self::default_chunk_size(),
            keyframe_chunk_size: Self::default_keyframe_chunk_size(),
            strategies: Self::default_strategies(),
            keyframe_strategy: Self::default_keyframe_strategy(),
            build_keyframes: Self::default_build_keyframes(),
        }
    }
}

impl BenchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &BenchConfigOverrides) {
        if let Some(curve_count) = overrides.curve_count {
            self.batch.curve_count = curve_count;
        }
        if let Some(keys) = overrides.keys_per_curve {
            self.generation.keys_per_curve = keys;
        }
        if let Some(step_count) = overrides.step_count {
            self.batch.step_count = step_count;
        }
        if let Some(duration) = overrides.duration {
            self.batch.duration = duration;
        }
        if let Some(chunk_size) = overrides.chunk_size {
            self.dispatch.chunk_size = chunk_size;
        }
        if let Some(chunk_size) = overrides.keyframe_chunk_size {
            self.dispatch.keyframe_chunk_size = chunk_size;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        if let Some(strategies) = &overrides.strategies {
            self.dispatch.strategies = strategies.clone();
        }
        if let Some(build) = overrides.build_keyframes {
            self.dispatch.build_keyframes = build;
        }
        if let Some(parallel) = overrides.parallel_sampling {
            self.batch.parallel_sampling = parallel;
        }
    }

    pub fn generation_info(&self) -> CurveGenerationInfo {
        CurveGenerationInfo {
            duration: self.batch.duration,
            number_of_keys: self.generation.keys_per_curve,
            min_value: self.generation.min_value,
            max_value: self.generation.max_value,
        }
    }

    /// Rejects settings that would fail partway through a run.
    pub fn validate(&self) -> CurveResult<()> {
        self.generation_info().validate()?;
        if self.batch.step_count == 0 {
            return Err(CurveError::invalid_configuration("step_count must be at least 1"));
        }
        if self.dispatch.chunk_size == 0 || self.dispatch.keyframe_chunk_size == 0 {
            return Err(CurveError::invalid_configuration("chunk sizes must be at least 1"));
        }
        if self.dispatch.strategies.is_empty() {
            return Err(CurveError::invalid_configuration("at least one strategy must be selected"));
        }
        Ok(())
    }
}

impl BenchConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.applied_fields().is_empty()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.curve_count.is_some() {
            fields.push("curve_count");
        }
        if self.keys_per_curve.is_some() {
            fields.push("keys_per_curve");
        }
        if self.step_count.is_some() {
            fields.push("step_count");
        }
        if self.duration.is_some() {
            fields.push("duration");
        }
        if self.chunk_size.is_some() {
            fields.push("chunk_size");
        }
        if self.keyframe_chunk_size.is_some() {
            fields.push("keyframe_chunk_size");
        }
        if self.seed.is_some() {
            fields.push("seed");
        }
        if self.strategies.is_some() {
            fields.push("strategies");
        }
        if self.build_keyframes.is_some() {
            fields.push("build_keyframes");
        }
        if self.parallel_sampling.is_some() {
            fields.push("parallel_sampling");
        }
        fields
    }
}
