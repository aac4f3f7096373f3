//! Cosine learning-rate schedule with linear warmup and plateau windows
//!
//! The schedule has three phases:
//! - **Warmup**: linear ramp from 0 to the base rate over `warmup_steps`
//! - **Cosine decay**: half-cosine descent from the base rate to
//!   `base_lr * min_lr_ratio` over the remaining steps
//! - **Plateaus**: flat windows inside the decay span, described as
//!   (position %, duration %) pairs. Each plateau holds the rate the global
//!   cosine had reached at the plateau's start; plateau time does not advance
//!   the cosine, so the curve resumes where it paused.
//!
//! Plateau boundaries and held rates are compiled into a segment table once
//! at construction; every step afterwards is a table lookup plus one cosine
//! evaluation.
//!
//! The scheduler drives any optimizer-like collaborator through the
//! [`ParamGroups`] trait, which `Vec<f32>` already implements:
//!
//! ```
//! use cosine_plateau::{CosinePlateauLR, ScheduleConfig};
//!
//! let mut groups = vec![0.1_f32];
//! let config = ScheduleConfig::new(1000).with_warmup(100).with_min_lr_ratio(0.1);
//! let mut scheduler = CosinePlateauLR::new(&mut groups, config).unwrap();
//!
//! for _ in 0..1000 {
//!     scheduler.step(&mut groups);
//! }
//! // Past the decay span the rate clamps to the floor.
//! assert!((groups[0] - 0.01).abs() < 1e-6);
//! ```

mod config;
mod error;
mod scheduler;
mod segment;


pub use config::{ScheduleConfig, WarmupShape};
pub use error::{Result, ScheduleError};
pub use scheduler::{CosinePlateauLR, ParamGroups};
pub use segment::Segment;
