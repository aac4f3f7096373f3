//! End-to-end schedule properties driven through the public API

use approx::assert_abs_diff_eq;
use cosine_plateau::{CosinePlateauLR, ScheduleConfig, WarmupShape};
use proptest::prelude::*;

#[test]
fn warmup_then_decay_scenario() {
    // total=1000, warmup=100, min_lr_ratio=0.1, base=0.1
    let mut groups = vec![0.1_f32];
    let config = ScheduleConfig::new(1000).with_warmup(100).with_min_lr_ratio(0.1);
    let sched = CosinePlateauLR::new(&mut groups, config).unwrap();

    assert_abs_diff_eq!(sched.lr_at(0)[0], 0.0, epsilon = 1e-8);
    assert_abs_diff_eq!(sched.lr_at(50)[0], 0.05, epsilon = 1e-7);
    assert_abs_diff_eq!(sched.lr_at(100)[0], 0.1, epsilon = 1e-7);
    assert_abs_diff_eq!(sched.lr_at(1000)[0], 0.01, epsilon = 1e-7);
    assert_abs_diff_eq!(sched.lr_at(5000)[0], 0.01, epsilon = 1e-7);
}

#[test]
fn plateau_scenario() {
    // total=1000, warmup=0, min_lr_ratio=0.0, plateau=(50%, 20%), base=1.0
    let mut groups = vec![1.0_f32];
    let config = ScheduleConfig::new(1000).with_plateaus(&[(50.0, 20.0)]);
    let sched = CosinePlateauLR::new(&mut groups, config).unwrap();

    let spans: Vec<(usize, usize)> =
        sched.segments().iter().map(|s| (s.start(), s.end())).collect();
    assert_eq!(spans, vec![(0, 500), (500, 700), (700, 1000)]);

    assert_abs_diff_eq!(sched.lr_at(500)[0], sched.lr_at(699)[0], epsilon = 1e-7);
    assert_abs_diff_eq!(sched.lr_at(0)[0], 1.0, epsilon = 1e-6);
    // Progress never reaches 1.0 within the schedule, so the rate stays
    // strictly above zero.
    assert!(sched.lr_at(999)[0] > 0.0);
}

#[test]
fn driving_a_training_loop_publishes_every_step() {
    let mut groups = vec![0.1_f32, 0.05];
    let config = ScheduleConfig::new(200).with_warmup(20).with_min_lr_ratio(0.5);
    let mut sched = CosinePlateauLR::new(&mut groups, config).unwrap();

    for _ in 0..200 {
        sched.step(&mut groups);
        assert_eq!(sched.get_last_lr(), groups.as_slice());
        assert_eq!(sched.get_last_lr(), sched.lr_at(sched.current_step()).as_slice());
    }
    assert_eq!(sched.current_step(), 199);
}

#[test]
fn config_serde_round_trip() {
    let config = ScheduleConfig::new(10_000)
        .with_warmup(1000)
        .with_base_lr(0.001)
        .with_min_lr_ratio(0.1)
        .with_plateaus(&[(50.0, 30.0), (85.0, 10.0)]);

    let json = serde_json::to_string(&config).unwrap();
    let back: ScheduleConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}

#[test]
fn config_defaults_from_partial_json() {
    let config: ScheduleConfig =
        serde_json::from_str(r#"{"total_steps":1000,"warmup_steps":100,"min_lr_ratio":0.1}"#)
            .unwrap();

    assert_eq!(config.warmup_shape, WarmupShape::Linear);
    assert_eq!(config.base_lr, None);
    assert!(config.plateau_steps.is_empty());
    assert_eq!(config.resume_step, -1);
    assert_eq!(config.training_steps(), 900);
}

#[test]
fn unknown_warmup_shape_rejected_in_json() {
    let result = serde_json::from_str::<ScheduleConfig>(
        r#"{"total_steps":1000,"warmup_shape":"cosine"}"#,
    );
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn prop_floor_and_ceiling_respected(
        warmup in 0usize..200,
        ratio in 0.0f32..=1.0,
        pos_pct in 0.0f32..=100.0,
        dur_pct in 0.0f32..=100.0,
    ) {
        let base_lr = 0.1_f32;
        let mut groups = vec![base_lr];
        let config = ScheduleConfig::new(1000)
            .with_warmup(warmup)
            .with_min_lr_ratio(ratio)
            .with_plateaus(&[(pos_pct, dur_pct)]);
        let sched = CosinePlateauLR::new(&mut groups, config).unwrap();

        let min_lr = base_lr * ratio;
        for step in (warmup as i64)..1000 {
            let lr = sched.lr_at(step)[0];
            prop_assert!(lr >= min_lr - 1e-5, "step {}: {} below floor {}", step, lr, min_lr);
            prop_assert!(lr <= base_lr + 1e-5, "step {}: {} above base {}", step, lr, base_lr);
        }
    }

    #[test]
    fn prop_plateau_window_is_flat(
        pos_pct in 0.0f32..=100.0,
        dur_pct in 1.0f32..=100.0,
    ) {
        let mut groups = vec![1.0_f32];
        let config = ScheduleConfig::new(1000).with_plateaus(&[(pos_pct, dur_pct)]);
        let sched = CosinePlateauLR::new(&mut groups, config).unwrap();

        let start = (1000.0_f32 * pos_pct / 100.0) as i64;
        let end = start + (1000.0_f32 * dur_pct / 100.0) as i64;
        if end > start {
            let held = sched.lr_at(start)[0];
            for step in start..end {
                prop_assert!((sched.lr_at(step)[0] - held).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn prop_resume_matches_fresh_run(k in 1i64..999) {
        let config = ScheduleConfig::new(1000).with_warmup(100).with_min_lr_ratio(0.1);

        let mut fresh_groups = vec![0.1_f32];
        let mut fresh = CosinePlateauLR::new(&mut fresh_groups, config.clone()).unwrap();
        for _ in 0..=k {
            fresh.step(&mut fresh_groups);
        }

        let mut resumed_groups = vec![0.1_f32];
        let mut resumed =
            CosinePlateauLR::new(&mut resumed_groups, config.resume_from(k - 1)).unwrap();
        resumed.step(&mut resumed_groups);

        prop_assert_eq!(fresh.current_step(), k);
        prop_assert_eq!(resumed.current_step(), k);
        prop_assert!((fresh_groups[0] - resumed_groups[0]).abs() < 1e-6);
    }

    #[test]
    fn prop_segments_cover_training_range(
        plateaus in proptest::collection::vec((0.0f32..=100.0, 0.0f32..=50.0), 0..3),
    ) {
        let mut groups = vec![0.1_f32];
        let config = ScheduleConfig::new(1000).with_plateaus(&plateaus);
        let sched = CosinePlateauLR::new(&mut groups, config).unwrap();

        // Every step in the schedule gets a finite, non-negative rate even
        // when windows overlap or run past the nominal end.
        for step in 0..1000 {
            let lr = sched.lr_at(step)[0];
            prop_assert!(lr.is_finite() && lr >= 0.0);
        }
    }
}
