//! LUT application through the full pipeline.

use grade_lut::{Interpolation, Lut3D, cube};
use grade_ops::lut::apply_lut;
use grade_pipeline::{ColorPlan, GradeStatus, PipelineConfig, Stage};
use grade_tests::*;

#[test]
fn identity_lut_round_trip() {
    let ws = Workspace::new();
    ws.add_lut("identity_33.cube", &identity_lut(33));
    let pipeline = ws.pipeline();

    let source = color_ramp(64, 48);
    let outcome = pipeline.process_image(source.clone(), &ColorPlan::with_lut("identity_33.cube"));
    assert!(outcome.is_success());
    let out = outcome.image.unwrap();
    assert!(max_diff(&out, &source) <= 1);
}

#[test]
fn identity_round_trip_tetrahedral() {
    let ws = Workspace::new();
    ws.add_lut("identity_17.cube", &identity_lut(17));
    let pipeline = grade_pipeline::Pipeline::new(PipelineConfig {
        interpolation: "tetrahedral".into(),
        ..ws.config()
    })
    .unwrap();

    let source = color_ramp(32, 32);
    let out = pipeline
        .process_image(source.clone(), &ColorPlan::with_lut("identity_17.cube"))
        .image
        .unwrap();
    assert!(max_diff(&out, &source) <= 1);
}

#[test]
fn two_grid_identity_keeps_pure_red() {
    let ws = Workspace::new();
    ws.add_lut("id2.cube", &identity_lut(2));
    let pipeline = ws.pipeline();

    let red = flat(1, 1, [255, 0, 0]);
    let plan = ColorPlan {
        intensity: 1.0,
        ..ColorPlan::with_lut("id2.cube")
    };
    let (image, message) = pipeline.process_image(red, &plan).into_pair();
    assert_eq!(image.unwrap().get_pixel(0, 0).0, [255, 0, 0]);
    assert!(message.starts_with("success"));
}

#[test]
fn intensity_endpoints_and_linearity() {
    let ws = Workspace::new();
    let path = ws.add_lut("warm.cube", &warm_lut(17));
    let pipeline = ws.pipeline();

    let source = color_ramp(40, 30);
    let parsed = cube::read_3d(&path).unwrap();
    assert_eq!(parsed.interpolation, Interpolation::Trilinear);
    let full = apply_lut(&source, &parsed);

    let run = |intensity: f32| {
        let plan = ColorPlan {
            intensity,
            ..ColorPlan::with_lut("warm.cube")
        };
        pipeline.process_image(source.clone(), &plan).image.unwrap()
    };

    assert_eq!(run(0.0), source);
    assert_eq!(run(1.0), full);

    for t in [0.25f32, 0.5, 0.75] {
        let out = run(t);
        for ((o, s), f) in out.as_raw().iter().zip(source.as_raw()).zip(full.as_raw()) {
            let expected = *s as f32 * (1.0 - t) + *f as f32 * t;
            assert!(
                (*o as f32 - expected).abs() <= 0.5 + 1e-3,
                "t={t}: got {o}, expected {expected}"
            );
        }
    }
}

#[test]
fn secondary_lut_mixes_from_tone_adjusted_source() {
    let ws = Workspace::new();
    ws.add_lut("identity.cube", &identity_lut(2));
    ws.add_lut("invert.cube", &invert_lut());
    let pipeline = ws.pipeline();

    let plan = ColorPlan {
        secondary_lut: Some("invert.cube".into()),
        mix: 0.25,
        ..ColorPlan::with_lut("identity.cube")
    };
    let outcome = pipeline.process_image(flat(2, 2, [200, 40, 0]), &plan);
    assert!(outcome.secondary.is_some());
    // 200*.75 + 55*.25, 40*.75 + 215*.25, 0*.75 + 255*.25
    assert_eq!(outcome.image.unwrap().get_pixel(0, 0).0, [164, 84, 64]);
}

#[test]
fn missing_lut_returns_tone_adjusted_image() {
    let ws = Workspace::new();
    ws.add_lut("portra.cube", &warm_lut(5));
    let pipeline = ws.pipeline();

    let source = color_ramp(16, 16);
    let plan = ColorPlan {
        brightness: 1.2,
        saturation: 0.8,
        ..ColorPlan::with_lut("missing.cube")
    };

    let mut expected = source.clone();
    plan.tone_settings(pipeline.config().white_balance_strength)
        .apply(&mut expected);

    let outcome = pipeline.process_image(source, &plan);
    assert!(matches!(&outcome.status, GradeStatus::LutNotFound(name) if name == "missing.cube"));
    assert_eq!(outcome.stage, Stage::Done);
    assert!(outcome.primary.is_none());

    let (image, message) = outcome.into_pair();
    assert_eq!(image.unwrap(), expected);
    assert!(message.contains("not found"));
    assert_eq!(pipeline.usage().total(), 0);
}

#[test]
fn corrupt_lut_fails_only_that_image() {
    let ws = Workspace::new();
    ws.add_raw_lut("broken.cube", "TITLE \"x\"\nLUT_3D_SIZE 2\n0 0 0\n1 1 1\n");
    let pipeline = ws.pipeline();

    let outcome = pipeline.process_image(flat(2, 2, [1, 2, 3]), &ColorPlan::with_lut("broken.cube"));
    assert!(!outcome.has_image());
    assert_eq!(outcome.stage, Stage::Error);
    assert_eq!(outcome.last_completed, Stage::ToneAdjusted);
    assert!(matches!(
        outcome.status,
        GradeStatus::Failed(grade_pipeline::GradeError::CorruptLut { .. })
    ));
}

#[test]
fn lut_with_out_of_range_sample_is_corrupt() {
    let ws = Workspace::new();
    let mut text = String::from("LUT_3D_SIZE 2\n");
    for i in 0..8 {
        text.push_str(if i == 5 { "0 1.5 0\n" } else { "0 0 0\n" });
    }
    ws.add_raw_lut("hot.cube", &text);
    let pipeline = ws.pipeline();

    let outcome = pipeline.process_image(flat(1, 1, [9, 9, 9]), &ColorPlan::with_lut("hot.cube"));
    assert!(!outcome.has_image());
}

#[test]
fn usage_counts_successful_primary_applications() {
    let ws = Workspace::new();
    ws.add_lut("Portra.cube", &warm_lut(3));
    ws.add_lut("mono.cube", &Lut3D::from_fn(2, |r, g, b| {
        let y = (r + g + b) / 3.0;
        [y, y, y]
    }));
    let pipeline = ws.pipeline();

    for _ in 0..3 {
        pipeline.process_image(flat(1, 1, [5, 5, 5]), &ColorPlan::with_lut("portra.cube"));
    }
    pipeline.process_image(flat(1, 1, [5, 5, 5]), &ColorPlan::with_lut("mono.cube"));
    pipeline.process_image(flat(1, 1, [5, 5, 5]), &ColorPlan::with_lut("nothing-like-it.cube"));

    let usage = pipeline.usage();
    assert_eq!(usage.count("Portra.cube"), 3);
    assert_eq!(usage.count("mono.cube"), 1);
    assert_eq!(usage.total(), 4);
    assert_eq!(usage.top(1)[0].1, 3);
}

#[test]
fn flat_input_lut_hardens_plan_when_enabled() {
    let ws = Workspace::new();
    ws.add_lut("film_log_look.cube", &identity_lut(2));
    let plan = ColorPlan {
        intensity: 0.3,
        ..ColorPlan::with_lut("film_log_look.cube")
    };

    let hardening = grade_pipeline::Pipeline::new(PipelineConfig {
        harden_log_luts: true,
        ..ws.config()
    })
    .unwrap();
    let outcome = hardening.process_image(flat(2, 2, [128, 128, 128]), &plan);
    assert!(outcome.is_success());
    assert!(outcome.warnings.iter().any(|w| w.contains("log simulation")));
    assert_eq!(
        outcome.tone.steps.first(),
        Some(&grade_ops::ToneStep::LogSimulation)
    );

    let outcome = ws.pipeline().process_image(flat(2, 2, [128, 128, 128]), &plan);
    assert!(outcome.tone.steps.is_empty());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn zero_intensity_keeps_source_for_any_lut_name() {
    let ws = Workspace::new();
    ws.add_lut("Analog_Film.cube", &warm_lut(17));
    ws.add_lut("film_log_look.cube", &warm_lut(17));
    let source = color_ramp(40, 30);

    for harden_log_luts in [false, true] {
        let pipeline = grade_pipeline::Pipeline::new(PipelineConfig {
            harden_log_luts,
            ..ws.config()
        })
        .unwrap();
        let plan = ColorPlan {
            intensity: 0.0,
            ..ColorPlan::with_lut("Analog_Film.cube")
        };
        let outcome = pipeline.process_image(source.clone(), &plan);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.image.unwrap(), source);
    }

    let plan = ColorPlan {
        intensity: 0.0,
        ..ColorPlan::with_lut("film_log_look.cube")
    };
    assert_eq!(ws.pipeline().process_image(source.clone(), &plan).image.unwrap(), source);
}
