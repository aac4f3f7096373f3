//! Cosine-plateau learning rate scheduler

use crate::config::{ScheduleConfig, WarmupShape};
use crate::error::Result;
use crate::segment::{self, Segment};

/// External collaborator: an ordered sequence of parameter groups, each with
/// a mutable current learning rate
///
/// The scheduler never owns the optimizer; it reads initial rates once at
/// construction (when no explicit base rate is configured) and writes new
/// rates after every advance. Exactly one scheduler should drive a given
/// collaborator.
pub trait ParamGroups {
    /// Number of parameter groups
    fn group_count(&self) -> usize;

    /// Current learning rate of a group
    fn lr(&self, group: usize) -> f32;

    /// Set the learning rate of a group
    fn set_lr(&mut self, group: usize, lr: f32);
}

/// A plain vector of rate slots is the simplest collaborator.
impl ParamGroups for Vec<f32> {
    fn group_count(&self) -> usize {
        self.len()
    }

    fn lr(&self, group: usize) -> f32 {
        self[group]
    }

    fn set_lr(&mut self, group: usize, lr: f32) {
        self[group] = lr;
    }
}

/// Cosine-Plateau Learning Rate Scheduler
///
/// Combines three phases:
/// 1. Warmup: linear increase from 0 to the base rate
/// 2. Cosine decay: smooth descent from the base rate to the floor
/// 3. Plateaus: flat windows carved out of the decay span, holding the rate
///    the global cosine curve had reached when the plateau began
///
/// The segment table is compiled once at construction; stepping only scans
/// it. Segment counts are bounded by twice the plateau count plus one, so a
/// linear scan is already O(1) in practice.
///
/// # Example
///
/// ```
/// use cosine_plateau::{CosinePlateauLR, ScheduleConfig};
///
/// let mut groups = vec![0.1_f32];
/// let config = ScheduleConfig::new(1000)
///     .with_warmup(100)
///     .with_min_lr_ratio(0.1)
///     .with_plateaus(&[(50.0, 20.0)]);
/// let mut scheduler = CosinePlateauLR::new(&mut groups, config).unwrap();
///
/// for _ in 0..1000 {
///     // optimizer.step() would go here
///     scheduler.step(&mut groups);
/// }
/// assert!(groups[0] >= 0.01 - 1e-6);
/// ```
#[derive(Debug)]
pub struct CosinePlateauLR {
    total_steps: usize,
    warmup_steps: usize,
    warmup_shape: WarmupShape,
    base_lrs: Vec<f32>,
    min_lrs: Vec<f32>,
    training_steps: usize,
    effective_training_steps: i64,
    segments: Vec<Segment>,
    current_step: i64,
    last_lrs: Vec<f32>,
}

impl CosinePlateauLR {
    /// Create a scheduler and publish the rate for the starting step
    ///
    /// When `config.base_lr` is `None`, each group's current rate becomes its
    /// base rate. `current_step` is seeded from `config.resume_step` (default
    /// -1, so the first [`step`](Self::step) lands on step 0) and the rate
    /// for that step is written to the collaborator immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`](crate::ScheduleError) when a plateau
    /// position or duration percent lies outside `[0, 100]`. Degenerate but
    /// well-defined inputs (zero-duration plateaus, overlapping windows,
    /// `warmup_steps == total_steps`) are accepted.
    pub fn new<G: ParamGroups>(groups: &mut G, config: ScheduleConfig) -> Result<Self> {
        let base_lrs: Vec<f32> = match config.base_lr {
            Some(base_lr) => vec![base_lr; groups.group_count()],
            None => (0..groups.group_count()).map(|group| groups.lr(group)).collect(),
        };
        let min_lrs: Vec<f32> =
            base_lrs.iter().map(|base_lr| base_lr * config.min_lr_ratio).collect();

        let training_steps = config.training_steps();
        let compiled =
            segment::compile(training_steps, &base_lrs, &min_lrs, &config.plateau_steps)?;

        let mut scheduler = Self {
            total_steps: config.total_steps,
            warmup_steps: config.warmup_steps,
            warmup_shape: config.warmup_shape,
            base_lrs,
            min_lrs,
            training_steps,
            effective_training_steps: compiled.effective_training_steps,
            segments: compiled.segments,
            current_step: config.resume_step,
            last_lrs: Vec::new(),
        };
        scheduler.publish(groups);
        Ok(scheduler)
    }

    /// Advance one step and publish the new rates to the collaborator
    pub fn step<G: ParamGroups>(&mut self, groups: &mut G) {
        self.current_step += 1;
        self.publish(groups);
    }

    /// Most recently published rates, one per parameter group
    pub fn get_last_lr(&self) -> &[f32] {
        &self.last_lrs
    }

    /// Step index the scheduler currently sits on
    pub fn current_step(&self) -> i64 {
        self.current_step
    }

    /// Total steps of the schedule, warmup included
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Post-warmup decay span, in steps
    pub fn training_steps(&self) -> usize {
        self.training_steps
    }

    /// Decay span with all plateau durations excised
    pub fn effective_training_steps(&self) -> i64 {
        self.effective_training_steps
    }

    /// Compiled segment table, ordered by start
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Rates at an arbitrary step, without mutating any state
    ///
    /// Negative steps return the base rates (pre-training sentinel). Steps
    /// past the last segment clamp to the floor rates.
    pub fn lr_at(&self, step: i64) -> Vec<f32> {
        if step < 0 {
            return self.base_lrs.clone();
        }
        let step = step as usize;

        if step < self.warmup_steps {
            return self.warmup_lrs(step);
        }

        let adjusted = step - self.warmup_steps;
        for segment in &self.segments {
            if segment.contains(adjusted) {
                return segment.lrs_at(adjusted);
            }
        }

        // Past the last segment: hold the floor.
        self.min_lrs.clone()
    }

    /// Warmup ramp; only reached when `0 <= step < warmup_steps`
    fn warmup_lrs(&self, step: usize) -> Vec<f32> {
        match self.warmup_shape {
            WarmupShape::Linear => {
                let ramp = step as f32 / self.warmup_steps as f32;
                self.base_lrs.iter().map(|base_lr| base_lr * ramp).collect()
            }
        }
    }

    fn publish<G: ParamGroups>(&mut self, groups: &mut G) {
        let lrs = self.lr_at(self.current_step);
        for (group, &lr) in lrs.iter().enumerate() {
            groups.set_lr(group, lr);
        }
        self.last_lrs = lrs;
    }
}
