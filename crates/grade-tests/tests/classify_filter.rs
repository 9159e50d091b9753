//! Image classification and the name-based safety filter.

use approx::assert_abs_diff_eq;
use grade_ops::{ImageClass, analyze, safety};
use grade_pipeline::Candidates;
use grade_tests::*;

const CANDIDATES: &[&str] = &[
    "Kodak_Portra_400.cube",
    "Sony_SLog3_to_Rec709.cube",
    "Fuji_F-Log_Eterna.cube",
    "Teal_Orange.cube",
    "ARRI_LogC_K1S1.cube",
    "Canon_CLog2_Cinema.cube",
    "Vintage_Fade.cube",
    "HLG_to_SDR.cube",
];

#[test]
fn flat_gray_is_log() {
    let (class, stddev) = analyze::classify(&flat(64, 64, [128, 128, 128]));
    assert_eq!(class, ImageClass::Log);
    assert_abs_diff_eq!(stddev, 0.0, epsilon = 1e-4);
}

#[test]
fn checkerboard_is_standard() {
    let (class, stddev) = analyze::classify(&checkerboard(64, 64, 4));
    assert_eq!(class, ImageClass::Standard);
    assert_abs_diff_eq!(stddev, 127.5, epsilon = 0.01);
}

#[test]
fn classification_is_deterministic() {
    let image = color_ramp(97, 31);
    assert_eq!(analyze::classify(&image), analyze::classify(&image));
}

#[test]
fn unreadable_image_counts_as_standard() {
    let ws = Workspace::new();
    let bogus = ws.path().join("bogus.jpg");
    std::fs::write(&bogus, b"\xff\xd8 truncated").unwrap();
    assert_eq!(ws.pipeline().classify_file(&bogus), (ImageClass::Standard, 0.0));
}

#[test]
fn log_images_keep_every_candidate() {
    assert_eq!(safety::filter(CANDIDATES, ImageClass::Log), CANDIDATES.to_vec());
}

#[test]
fn standard_images_drop_log_profiles() {
    let kept = safety::filter(CANDIDATES, ImageClass::Standard);
    assert_eq!(kept, vec!["Kodak_Portra_400.cube", "Teal_Orange.cube", "Vintage_Fade.cube"]);
}

#[test]
fn filter_is_idempotent() {
    for class in [ImageClass::Standard, ImageClass::Log] {
        let once = safety::filter(CANDIDATES, class);
        let twice = safety::filter(&once, class);
        assert_eq!(once, twice);
    }
}

#[test]
fn filter_leaves_input_untouched() {
    let input: Vec<String> = CANDIDATES.iter().map(|s| s.to_string()).collect();
    let before = input.clone();
    let _ = safety::filter(&input, ImageClass::Standard);
    assert_eq!(input, before);
}

#[test]
fn exhausted_candidates_are_reported() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline();
    let board = checkerboard(32, 32, 2);

    let only_log = ["SLog3.cube", "VLog_to_709.cube"];
    match pipeline.safe_candidates(&board, &only_log) {
        Candidates::Exhausted { rejected } => assert_eq!(rejected, only_log.to_vec()),
        other => panic!("expected exhaustion, got {other:?}"),
    }

    let mixed = ["SLog3.cube", "Portra.cube"];
    let found = pipeline.safe_candidates(&board, &mixed);
    assert!(!found.is_exhausted());
    assert_eq!(found.names(), &["Portra.cube"]);

    let gray = flat(32, 32, [100, 100, 100]);
    assert_eq!(pipeline.safe_candidates(&gray, &only_log).names(), &only_log);
}
