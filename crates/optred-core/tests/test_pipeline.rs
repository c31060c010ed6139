mod common;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use optred_core::error::OptredError;
use optred_core::io::{read_master, OverwritePolicy};
use optred_core::pipeline::{
    run_reduction, run_reduction_reported, MasterSource, ProgressReporter, ReductionConfig,
    ReductionStage,
};
use optred_core::stats::frame_median;

use common::{ramp_frame, typed_header, uniform_frame, write_fits};

const H: usize = 4;
const W: usize = 6;

/// A night of synthetic data: three bias, two R flats, two R objects, one
/// V object without flats and one dark.
fn write_night(dir: &Path) {
    for (i, level) in [100.0, 101.0, 102.0].iter().enumerate() {
        write_fits(
            dir,
            &format!("bias{i}.fits"),
            &uniform_frame(H, W, *level, typed_header("zero", None)),
        );
    }
    for (i, scale) in [1000.0, 3000.0].iter().enumerate() {
        write_fits(
            dir,
            &format!("flat{i}.fits"),
            &ramp_frame(H, W, 101.0, *scale, typed_header("flat", Some("R"))),
        );
    }
    for (i, scale) in [200.0, 400.0].iter().enumerate() {
        let mut header = typed_header("object", Some("R"));
        header.set("OBJECT", "M51");
        write_fits(
            dir,
            &format!("obj{i}.fits"),
            &ramp_frame(H, W, 101.0, *scale, header),
        );
    }
    write_fits(
        dir,
        "objV.fits",
        &uniform_frame(H, W, 500.0, typed_header("object", Some("V"))),
    );
    write_fits(
        dir,
        "dark.fits",
        &uniform_frame(H, W, 100.0, typed_header("dark", None)),
    );
}

fn config_for(raw: &Path, out: &Path) -> ReductionConfig {
    ReductionConfig {
        inputs: vec![format!("{}/*.fits", raw.display())],
        output_dir: Some(out.to_path_buf()),
        ..Default::default()
    }
}

#[test]
fn test_end_to_end() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_night(raw.path());

    let summary = run_reduction(&config_for(raw.path(), out.path())).unwrap();
    assert_eq!(summary.inspected, 9);
    assert_eq!(summary.bias_frames, 3);
    assert_eq!(summary.dark_frames, 1);
    assert_eq!(summary.flat_frames, 2);
    assert_eq!(summary.object_frames, 3);
    assert_eq!(summary.skipped_filters, vec!["V"]);

    let bias_path = out.path().join("masterbias.fits");
    assert_eq!(
        summary.master_bias,
        Some(MasterSource::Combined {
            path: bias_path.clone(),
            frames: 3
        })
    );
    let master_bias = read_master(&bias_path).unwrap();
    assert_abs_diff_eq!(master_bias.data[[0, 2, 3]], 101.0, epsilon = 1e-4);
    assert_eq!(master_bias.header.get_text("IMAGETYP").unwrap(), "masterbias");

    let flat_path = out.path().join("masterflat_R.fits");
    let master_flat = read_master(&flat_path).unwrap();
    assert_abs_diff_eq!(frame_median(&master_flat), 1.0, epsilon = 1e-5);
    assert_eq!(master_flat.header.get_text("FILTER").unwrap(), "R");

    assert_eq!(summary.filters.len(), 1);
    let corrected: Vec<PathBuf> = summary.corrected().cloned().collect();
    assert_eq!(
        corrected,
        vec![
            out.path().join("obj0-bsub_flat.fits"),
            out.path().join("obj1-bsub_flat.fits"),
        ]
    );

    // Objects share the flat's pattern, so correction leaves a constant.
    let obj1 = read_master(&corrected[1]).unwrap();
    for v in obj1.data.iter() {
        assert_abs_diff_eq!(*v, 400.0 * 3.5, epsilon = 1e-2);
    }
    assert_eq!(obj1.header.get_text("OBJECT").unwrap(), "M51");
    assert!(obj1
        .header
        .history()
        .iter()
        .any(|l| l.ends_with("Bias and flat field corrected")));

    assert!(!out.path().join("objV-bsub_flat.fits").exists());
}

#[test]
fn test_rerun_in_place_skips_corrected_frames() {
    let raw = TempDir::new().unwrap();
    write_night(raw.path());
    let config = config_for(raw.path(), raw.path());

    let first = run_reduction(&config).unwrap();
    assert_eq!(first.object_frames, 3);
    let before = read_master(&raw.path().join("obj0-bsub_flat.fits")).unwrap();

    let second = run_reduction(&config).unwrap();
    assert_eq!(second.object_frames, 3);
    assert_eq!(second.corrected().count(), 2);
    assert!(!raw.path().join("obj0-bsub_flat-bsub_flat.fits").exists());
    let after = read_master(&raw.path().join("obj0-bsub_flat.fits")).unwrap();
    assert_eq!(before.data, after.data);
}

#[test]
fn test_supplied_masters() {
    let raw = TempDir::new().unwrap();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_night(raw.path());
    run_reduction(&config_for(raw.path(), first.path())).unwrap();

    let mut config = ReductionConfig {
        inputs: vec![format!("{}/obj*.fits", raw.path().display())],
        output_dir: Some(second.path().to_path_buf()),
        master_bias: Some(first.path().join("masterbias.fits")),
        ..Default::default()
    };
    config
        .master_flats
        .insert("R".into(), first.path().join("masterflat_R.fits"));

    let summary = run_reduction(&config).unwrap();
    assert!(matches!(summary.master_bias, Some(MasterSource::Supplied(_))));
    assert!(matches!(
        summary.filters[0].master_flat,
        MasterSource::Supplied(_)
    ));
    assert!(!second.path().join("masterbias.fits").exists());
    assert!(second.path().join("obj0-bsub_flat.fits").exists());

    let a = read_master(&first.path().join("obj0-bsub_flat.fits")).unwrap();
    let b = read_master(&second.path().join("obj0-bsub_flat.fits")).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn test_missing_master_bias_override() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_night(raw.path());
    let config = ReductionConfig {
        master_bias: Some(out.path().join("nope.fits")),
        ..config_for(raw.path(), out.path())
    };
    assert!(matches!(
        run_reduction(&config),
        Err(OptredError::MissingMaster(_))
    ));
}

#[test]
fn test_no_bias_frames() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_fits(
        raw.path(),
        "obj.fits",
        &uniform_frame(H, W, 500.0, typed_header("object", Some("R"))),
    );
    assert!(matches!(
        run_reduction(&config_for(raw.path(), out.path())),
        Err(OptredError::NoFrames(_))
    ));
}

#[test]
fn test_keep_policy_refuses_existing_outputs() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_night(raw.path());
    let mut config = config_for(raw.path(), out.path());
    run_reduction(&config).unwrap();

    config.overwrite = OverwritePolicy::Keep;
    assert!(matches!(
        run_reduction(&config),
        Err(OptredError::OutputExists(_))
    ));

    config.overwrite = OverwritePolicy::Replace;
    run_reduction(&config).unwrap();
}

struct RecordingReporter {
    stages: Mutex<Vec<ReductionStage>>,
    allow_overwrite: bool,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: ReductionStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn confirm_overwrite(&self, _path: &Path) -> bool {
        self.allow_overwrite
    }
}

#[test]
fn test_reporter_stages_and_confirmation() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_night(raw.path());
    let mut config = config_for(raw.path(), out.path());

    let reporter = Arc::new(RecordingReporter {
        stages: Mutex::new(Vec::new()),
        allow_overwrite: false,
    });
    run_reduction_reported(&config, reporter.clone()).unwrap();
    let stages = reporter.stages.lock().unwrap().clone();
    assert_eq!(
        stages,
        vec![
            ReductionStage::Classifying,
            ReductionStage::CombiningBias,
            ReductionStage::Writing,
            ReductionStage::CombiningFlats,
            ReductionStage::Writing,
            ReductionStage::Correcting,
        ]
    );

    // Outputs now exist; a refused confirmation stops the run.
    config.overwrite = OverwritePolicy::Confirm;
    assert!(matches!(
        run_reduction_reported(&config, reporter.clone()),
        Err(OptredError::OutputExists(_))
    ));

    let agreeing = Arc::new(RecordingReporter {
        stages: Mutex::new(Vec::new()),
        allow_overwrite: true,
    });
    run_reduction_reported(&config, agreeing).unwrap();
}
