//! Integration tests for the batch pipeline.

mod helpers;

use meshbatch_core::config::render::GridPolicy;
use meshbatch_pipeline::{BatchPipeline, JobStatus};

use helpers::Fixture;

#[tokio::test]
async fn test_default_run_only_lists() {
    let fx = Fixture::new();
    fx.seed_step_files(&["step/a.step", "step/b.step", "step/c.step", "misc/readme.txt"]);
    let config = fx.config();
    let store = fx.store(&config).await;

    let report = BatchPipeline::new(config, store)
        .expect("pipeline")
        .run()
        .await
        .expect("run");

    let keys: Vec<&str> = report.listed.iter().map(|k| k.as_str()).collect();
    assert_eq!(keys, ["step/a.step", "step/b.step", "step/c.step"]);
    assert!(report.jobs.is_empty());
    assert!(!fx.staging_dir().exists());
    assert!(!fx.output_dir().exists());
}

#[tokio::test]
async fn test_empty_prefix_lists_nothing() {
    let fx = Fixture::new();
    fx.seed_step_files(&["other/a.step"]);
    let mut config = fx.config();
    config.pipeline.list_only = false;
    let store = fx.store(&config).await;

    let report = BatchPipeline::new(config, store)
        .expect("pipeline")
        .run()
        .await
        .expect("run");

    assert!(report.listed.is_empty());
    assert!(report.jobs.is_empty());
    assert!(report.sheet.is_none());
}

#[cfg(unix)]
mod full_run {
    use super::*;

    use std::collections::HashSet;

    #[tokio::test]
    async fn test_full_run_converts_renders_and_composites() {
        let fx = Fixture::new();
        fx.seed_step_files(&["step/a.step", "step/b.step", "step/c.step", "step/d.step"]);
        let mut config = fx.config();
        config.pipeline.list_only = false;
        config.conversion.default_variant = "assimp".to_string();
        config.conversion.tools.assimp = Some(fx.fake_assimp());
        let store = fx.store(&config).await;

        let report = BatchPipeline::new(config, store)
            .expect("pipeline")
            .run()
            .await
            .expect("run");

        assert_eq!(report.jobs.len(), 4);
        assert_eq!(report.count(JobStatus::Rendered), 4);
        for job in &report.jobs {
            assert!(job.mesh.as_ref().expect("mesh").exists());
            assert!(job.preview.as_ref().expect("preview").exists());
        }

        let sheet = report.sheet.expect("sheet");
        assert_eq!(sheet.side, 2);
        assert_eq!((sheet.width, sheet.height), (128, 96));
        let saved = image::open(fx.output_dir().join("output.png")).expect("open sheet");
        assert_eq!((saved.width(), saved.height()), (128, 96));

        let metrics = report.metrics.expect("metrics");
        assert_eq!(metrics.conversions_succeeded, 4);
    }

    #[tokio::test]
    async fn test_failures_and_timeouts_do_not_stop_the_batch() {
        let fx = Fixture::new();
        fx.seed_step_files(&["step/a_bad.step", "step/b_slow.step", "step/c.step"]);
        let mut config = fx.config();
        config.pipeline.list_only = false;
        config.conversion.default_variant = "assimp".to_string();
        config.conversion.timeout_seconds = 1;
        config.conversion.tools.assimp = Some(fx.fake_assimp());
        let store = fx.store(&config).await;

        let report = BatchPipeline::new(config, store)
            .expect("pipeline")
            .run()
            .await
            .expect("run");

        let statuses: Vec<JobStatus> = report.jobs.iter().map(|j| j.status).collect();
        assert_eq!(
            statuses,
            [JobStatus::ConversionFailed, JobStatus::TimedOut, JobStatus::Rendered]
        );
        assert!(
            report.jobs[0]
                .error
                .as_deref()
                .expect("error")
                .contains("cannot read STEP")
        );

        // Timed-out and failed jobs leave no mesh behind.
        assert!(!fx.output_dir().join("meshes/0000_a_bad.stl").exists());
        assert!(!fx.output_dir().join("meshes/0001_b_slow.stl").exists());

        let sheet = report.sheet.expect("sheet");
        assert_eq!(sheet.placed, 1);

        let metrics = report.metrics.expect("metrics");
        assert_eq!(metrics.conversions_timed_out, 1);
        assert_eq!(metrics.conversions_failed, 2);
    }

    #[tokio::test]
    async fn test_floor_grid_drops_overflow_previews() {
        let fx = Fixture::new();
        let keys = ["step/1.step", "step/2.step", "step/3.step", "step/4.step", "step/5.step", "step/6.step"];
        fx.seed_step_files(&keys);
        let mut config = fx.config();
        config.pipeline.list_only = false;
        config.conversion.default_variant = "assimp".to_string();
        config.conversion.tools.assimp = Some(fx.fake_assimp());
        let store = fx.store(&config).await;

        let report = BatchPipeline::new(config, store)
            .expect("pipeline")
            .run()
            .await
            .expect("run");

        let sheet = report.sheet.expect("sheet");
        assert_eq!(sheet.side, 2);
        assert_eq!(sheet.placed, 4);
        assert_eq!(sheet.dropped, 2);
    }

    #[tokio::test]
    async fn test_ceil_grid_keeps_every_preview() {
        let fx = Fixture::new();
        let keys = ["step/1.step", "step/2.step", "step/3.step", "step/4.step", "step/5.step", "step/6.step"];
        fx.seed_step_files(&keys);
        let mut config = fx.config();
        config.pipeline.list_only = false;
        config.conversion.default_variant = "assimp".to_string();
        config.conversion.tools.assimp = Some(fx.fake_assimp());
        config.contact_sheet.grid_policy = GridPolicy::Ceil;
        let store = fx.store(&config).await;

        let report = BatchPipeline::new(config, store)
            .expect("pipeline")
            .run()
            .await
            .expect("run");

        let sheet = report.sheet.expect("sheet");
        assert_eq!(sheet.side, 3);
        assert_eq!(sheet.placed, 6);
        assert_eq!(sheet.dropped, 0);
        assert_eq!((sheet.width, sheet.height), (192, 144));
    }

    #[tokio::test]
    async fn test_keys_sharing_a_file_name_keep_separate_outputs() {
        let fx = Fixture::new();
        fx.seed_step_files(&["step/part.stp", "step/x/part.step", "step/y/part.step"]);
        let mut config = fx.config();
        config.pipeline.list_only = false;
        config.conversion.default_variant = "assimp".to_string();
        config.conversion.tools.assimp = Some(fx.fake_assimp());
        config.contact_sheet.grid_policy = GridPolicy::Ceil;
        let store = fx.store(&config).await;

        let report = BatchPipeline::new(config, store)
            .expect("pipeline")
            .run()
            .await
            .expect("run");

        assert_eq!(report.count(JobStatus::Rendered), 3);
        let meshes: HashSet<_> = report.jobs.iter().map(|j| j.mesh.clone().expect("mesh")).collect();
        let previews: HashSet<_> = report
            .jobs
            .iter()
            .map(|j| j.preview.clone().expect("preview"))
            .collect();
        assert_eq!(meshes.len(), 3);
        assert_eq!(previews.len(), 3);
        assert!(previews.iter().all(|p| p.exists()));

        let staged = std::fs::read_dir(fx.staging_dir()).expect("staging").count();
        assert_eq!(staged, 3);
        assert_eq!(report.sheet.expect("sheet").placed, 3);
    }
}
