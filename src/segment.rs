//! Precomputed schedule segments
//!
//! The segment table is built once at construction so that per-step lookups
//! never redo plateau bookkeeping or effective-position arithmetic.

use std::f32::consts::PI;

use crate::error::{Result, ScheduleError};

/// Absolute plateau window, in steps relative to the post-warmup range
///
/// `end` is not clamped to the training span; a window reaching past it
/// simply produces a flat segment that outlives the nominal schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlateauWindow {
    pub start: usize,
    pub end: usize,
}

impl PlateauWindow {
    fn duration(&self) -> usize {
        self.end - self.start
    }
}

/// One compiled span of the schedule
///
/// Intervals are half-open `[start, end)` over the post-warmup step index.
/// For a well-formed configuration the table is contiguous, non-overlapping,
/// and sorted ascending by `start`.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Cosine transition between two precomputed rate vectors
    Cosine {
        start: usize,
        end: usize,
        start_lrs: Vec<f32>,
        end_lrs: Vec<f32>,
    },
    /// Flat hold at a precomputed rate vector
    Flat {
        start: usize,
        end: usize,
        lrs: Vec<f32>,
    },
}

impl Segment {
    /// First post-warmup step covered by this segment
    pub fn start(&self) -> usize {
        match self {
            Segment::Cosine { start, .. } | Segment::Flat { start, .. } => *start,
        }
    }

    /// One past the last post-warmup step covered by this segment
    pub fn end(&self) -> usize {
        match self {
            Segment::Cosine { end, .. } | Segment::Flat { end, .. } => *end,
        }
    }

    /// Whether this segment covers the given post-warmup step
    pub fn contains(&self, adjusted_step: usize) -> bool {
        self.start() <= adjusted_step && adjusted_step < self.end()
    }

    /// Per-group rates at a post-warmup step inside this segment
    pub(crate) fn lrs_at(&self, adjusted_step: usize) -> Vec<f32> {
        match self {
            Segment::Flat { lrs, .. } => lrs.clone(),
            Segment::Cosine { start, end, start_lrs, end_lrs } => {
                let len = end - start;
                if len == 0 {
                    return start_lrs.clone();
                }
                let progress = (adjusted_step - start) as f32 / len as f32;
                let factor = cosine_factor(progress);
                start_lrs
                    .iter()
                    .zip(end_lrs)
                    .map(|(start_lr, end_lr)| end_lr + (start_lr - end_lr) * factor)
                    .collect()
            }
        }
    }
}

/// Half-cosine interpolation weight: 1 at progress 0, 0 at progress 1
pub(crate) fn cosine_factor(progress: f32) -> f32 {
    0.5 * (1.0 + (PI * progress).cos())
}

/// Segment table plus the derived decay-span length
pub(crate) struct CompiledSchedule {
    pub segments: Vec<Segment>,
    /// Decay span with all plateau durations excised. Overlapping windows
    /// can drive this negative, in which case every plateau holds the floor.
    pub effective_training_steps: i64,
}

/// Compile plateau descriptors into the segment table
///
/// Each plateau's held rate is read off the single global cosine curve at the
/// plateau's effective position, i.e. its start minus the cumulative duration
/// of all earlier plateaus. The curve's timing is therefore unaffected by the
/// time spent flat.
pub(crate) fn compile(
    training_steps: usize,
    base_lrs: &[f32],
    min_lrs: &[f32],
    plateau_steps: &[(f32, f32)],
) -> Result<CompiledSchedule> {
    if plateau_steps.is_empty() {
        return Ok(CompiledSchedule {
            segments: vec![Segment::Cosine {
                start: 0,
                end: training_steps,
                start_lrs: base_lrs.to_vec(),
                end_lrs: min_lrs.to_vec(),
            }],
            effective_training_steps: training_steps as i64,
        });
    }

    let mut windows = Vec::with_capacity(plateau_steps.len());
    for &(pos_pct, dur_pct) in plateau_steps {
        if !(0.0..=100.0).contains(&pos_pct) {
            return Err(ScheduleError::PlateauPositionOutOfRange { value: pos_pct });
        }
        if !(0.0..=100.0).contains(&dur_pct) {
            return Err(ScheduleError::PlateauDurationOutOfRange { value: dur_pct });
        }
        let start = (training_steps as f32 * pos_pct / 100.0) as usize;
        let duration = (training_steps as f32 * dur_pct / 100.0) as usize;
        windows.push(PlateauWindow { start, end: start + duration });
    }
    windows.sort_by_key(|window| window.start);

    let total_plateau_duration: usize = windows.iter().map(PlateauWindow::duration).sum();
    let effective_training_steps = training_steps as i64 - total_plateau_duration as i64;

    // Held rate for each window, evaluated on the global cosine at the
    // window's effective (plateau-time-excluded) position. Signed arithmetic:
    // overlapping windows can push the effective position negative, which the
    // progress clamp absorbs.
    let mut held_lrs: Vec<Vec<f32>> = Vec::with_capacity(windows.len());
    let mut consumed: i64 = 0;
    for window in &windows {
        let held = if effective_training_steps > 0 {
            let effective_position = window.start as i64 - consumed;
            let progress =
                (effective_position as f32 / effective_training_steps as f32).clamp(0.0, 1.0);
            let factor = cosine_factor(progress);
            base_lrs
                .iter()
                .zip(min_lrs)
                .map(|(base_lr, min_lr)| min_lr + (base_lr - min_lr) * factor)
                .collect()
        } else {
            min_lrs.to_vec()
        };
        held_lrs.push(held);
        consumed += window.duration() as i64;
    }

    let mut segments = Vec::with_capacity(windows.len() * 2 + 1);
    let mut cursor = 0usize;
    for (i, window) in windows.iter().enumerate() {
        if cursor < window.start {
            let start_lrs = if i == 0 { base_lrs.to_vec() } else { held_lrs[i - 1].clone() };
            segments.push(Segment::Cosine {
                start: cursor,
                end: window.start,
                start_lrs,
                end_lrs: held_lrs[i].clone(),
            });
        }
        // Zero-duration windows still emit their (empty) flat segment; the
        // half-open interval never matches a lookup.
        segments.push(Segment::Flat {
            start: window.start,
            end: window.end,
            lrs: held_lrs[i].clone(),
        });
        cursor = window.end;
    }
    if cursor < training_steps {
        let start_lrs = held_lrs.last().cloned().unwrap_or_else(|| base_lrs.to_vec());
        segments.push(Segment::Cosine {
            start: cursor,
            end: training_steps,
            start_lrs,
            end_lrs: min_lrs.to_vec(),
        });
    }

    Ok(CompiledSchedule { segments, effective_training_steps })
}
