//! Schedule configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScheduleError};

/// Shape of the warmup ramp
///
/// Closed set: only linear warmup is defined today. Parsing any other string
/// fails, so a future variant can be added without changing the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmupShape {
    /// Straight line from 0 to the base learning rate
    #[default]
    Linear,
}

impl FromStr for WarmupShape {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(WarmupShape::Linear),
            _ => Err(ScheduleError::UnknownWarmupShape { shape: s.to_string() }),
        }
    }
}

impl fmt::Display for WarmupShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupShape::Linear => write!(f, "linear"),
        }
    }
}

/// Static configuration for a cosine-plateau schedule
///
/// Built once and handed to [`CosinePlateauLR::new`](crate::CosinePlateauLR::new),
/// which validates it and compiles the segment table. Serializable so a
/// training harness can embed the schedule in its own config schema.
///
/// Plateau descriptors are `(position_percent, duration_percent)` pairs, both
/// relative to the post-warmup step count. `[(50.0, 20.0)]` holds the rate
/// flat starting at 50% of the decay span, for 20% of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Total number of training steps, warmup included
    pub total_steps: usize,

    /// Number of warmup steps (0 disables warmup)
    #[serde(default)]
    pub warmup_steps: usize,

    /// Shape of the warmup ramp
    #[serde(default)]
    pub warmup_shape: WarmupShape,

    /// Base (maximum) learning rate. `None` reads each group's current rate
    /// from the optimizer at construction.
    #[serde(default)]
    pub base_lr: Option<f32>,

    /// Floor rate as a fraction of the base rate, in [0, 1]
    #[serde(default)]
    pub min_lr_ratio: f32,

    /// Plateau descriptors as (position %, duration %) pairs
    #[serde(default)]
    pub plateau_steps: Vec<(f32, f32)>,

    /// Step index to resume from; -1 means training has not started
    #[serde(default = "default_resume_step")]
    pub resume_step: i64,
}

fn default_resume_step() -> i64 {
    -1
}

impl ScheduleConfig {
    /// Create a configuration with no warmup, no floor, and no plateaus
    pub fn new(total_steps: usize) -> Self {
        Self {
            total_steps,
            warmup_steps: 0,
            warmup_shape: WarmupShape::default(),
            base_lr: None,
            min_lr_ratio: 0.0,
            plateau_steps: Vec::new(),
            resume_step: default_resume_step(),
        }
    }

    /// Set the number of warmup steps
    pub fn with_warmup(mut self, warmup_steps: usize) -> Self {
        self.warmup_steps = warmup_steps;
        self
    }

    /// Set the warmup ramp shape
    pub fn with_warmup_shape(mut self, shape: WarmupShape) -> Self {
        self.warmup_shape = shape;
        self
    }

    /// Override the base learning rate for every parameter group
    pub fn with_base_lr(mut self, base_lr: f32) -> Self {
        self.base_lr = Some(base_lr);
        self
    }

    /// Set the floor rate as a fraction of the base rate
    pub fn with_min_lr_ratio(mut self, ratio: f32) -> Self {
        self.min_lr_ratio = ratio;
        self
    }

    /// Set the plateau descriptors
    pub fn with_plateaus(mut self, plateau_steps: &[(f32, f32)]) -> Self {
        self.plateau_steps = plateau_steps.to_vec();
        self
    }

    /// Resume from a checkpoint: the next advance lands on `step + 1`
    pub fn resume_from(mut self, step: i64) -> Self {
        self.resume_step = step;
        self
    }

    /// Number of post-warmup steps the decay schedule spans
    pub fn training_steps(&self) -> usize {
        self.total_steps.saturating_sub(self.warmup_steps)
    }
}
