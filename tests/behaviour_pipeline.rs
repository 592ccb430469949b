//! Behaviour-driven tests for the fetch-and-patch pipeline.
//!
//! These scenarios exercise the full resolve, download, checksum, and
//! patch sequence against a stub downloader, validating the terminal
//! outcomes and the no-partial-output guarantee. Tests use the rstest-bdd
//! v0.5.0 mutable world pattern.

use camino::{Utf8Path, Utf8PathBuf};
use canary_update::download::BuildDownloader;
use canary_update::error::{FetchError, Result as FetchResult};
use canary_update::pipeline::{ARCHIVE_FILENAME, FetchConfig, MANIFEST_TEMPLATE, run_pipeline};
use canary_update::progress::ProgressReporter;
use canary_update::sha256_digest::compute_sha256;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::sync::Mutex;

const FAKE_ARCHIVE: &[u8] = b"fake nightly archive";
const BASE_URL: &str = "https://example.test";

/// How the stub downloader should respond to `fetch_indicator`.
enum IndicatorBehaviour {
    /// Return the given body text.
    Ok(String),
    /// Return a 404 not-found error.
    Missing,
}

/// How the stub downloader should respond to `download_archive`.
#[derive(Default)]
enum ArchiveBehaviour {
    /// Write the fake archive bytes to the destination.
    #[default]
    Ok,
    /// Fail mid-transfer.
    Interrupted,
}

/// A simple stub implementation of [`BuildDownloader`] for BDD tests.
struct StubDownloader {
    indicator: Mutex<Option<IndicatorBehaviour>>,
    archive: Mutex<Option<ArchiveBehaviour>>,
}

impl StubDownloader {
    fn new(indicator: IndicatorBehaviour, archive: ArchiveBehaviour) -> Self {
        Self {
            indicator: Mutex::new(Some(indicator)),
            archive: Mutex::new(Some(archive)),
        }
    }
}

impl BuildDownloader for StubDownloader {
    fn fetch_indicator(&self, url: &str) -> FetchResult<String> {
        let behaviour = self
            .indicator
            .lock()
            .expect("lock")
            .take()
            .expect("indicator behaviour not set");
        match behaviour {
            IndicatorBehaviour::Ok(body) => Ok(body),
            IndicatorBehaviour::Missing => Err(FetchError::BuildNotFound {
                url: url.to_owned(),
            }),
        }
    }

    fn download_archive(
        &self,
        url: &str,
        dest: &Utf8Path,
        progress: &mut dyn ProgressReporter,
    ) -> FetchResult<()> {
        let behaviour = self
            .archive
            .lock()
            .expect("lock")
            .take()
            .unwrap_or_default();
        match behaviour {
            ArchiveBehaviour::Ok => {
                std::fs::write(dest.as_std_path(), FAKE_ARCHIVE).map_err(FetchError::Io)?;
                progress.on_progress(FAKE_ARCHIVE.len() as u64, Some(FAKE_ARCHIVE.len() as u64));
                Ok(())
            }
            ArchiveBehaviour::Interrupted => Err(FetchError::Download {
                url: url.to_owned(),
                reason: "connection reset".to_owned(),
            }),
        }
    }
}

#[derive(Default)]
struct PipelineWorld {
    _temp_dir: Option<tempfile::TempDir>,
    root: Option<Utf8PathBuf>,
    indicator: Option<IndicatorBehaviour>,
    archive: Option<ArchiveBehaviour>,
    result: Option<FetchResult<Utf8PathBuf>>,
}

impl PipelineWorld {
    fn root(&self) -> &Utf8Path {
        self.root.as_ref().expect("workspace set")
    }

    fn archive_path(&self) -> Utf8PathBuf {
        self.root().join(ARCHIVE_FILENAME)
    }

    fn manifest_output(&self) -> Utf8PathBuf {
        self.root().join("org.gnome.Epiphany.Canary.json")
    }
}

#[fixture]
fn world() -> PipelineWorld {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 path");
    let template = root.join(MANIFEST_TEMPLATE);
    std::fs::write(
        template.as_std_path(),
        concat!(
            r#"{"modules":[{"name":"webkitgtk","sources":[]},"#,
            r#"{"name":"epiphany","sources":[]}]}"#,
        ),
    )
    .expect("write template");

    PipelineWorld {
        _temp_dir: Some(dir),
        root: Some(root),
        ..Default::default()
    }
}

#[given("the indicator names build \"{build}\"")]
fn given_indicator_build(world: &mut PipelineWorld, build: String) {
    world.indicator = Some(IndicatorBehaviour::Ok(format!("{build}\n")));
}

#[given("the indicator resource is missing")]
fn given_indicator_missing(world: &mut PipelineWorld) {
    world.indicator = Some(IndicatorBehaviour::Missing);
}

#[given("the indicator is blank")]
fn given_indicator_blank(world: &mut PipelineWorld) {
    world.indicator = Some(IndicatorBehaviour::Ok("   \n".to_owned()));
}

#[given("the archive transfer fails")]
fn given_archive_fails(world: &mut PipelineWorld) {
    world.archive = Some(ArchiveBehaviour::Interrupted);
}

#[when("the pipeline runs")]
fn when_pipeline_runs(world: &mut PipelineWorld) {
    let indicator = world.indicator.take().expect("indicator behaviour set");
    let archive = world.archive.take().unwrap_or_default();
    let downloader = StubDownloader::new(indicator, archive);

    let template = world.root().join(MANIFEST_TEMPLATE);
    let archive_dest = world.archive_path();
    let project_dir = world.root().to_owned();
    let config = FetchConfig {
        base_url: BASE_URL,
        build_dir: "release",
        template_path: &template,
        archive_dest: &archive_dest,
        project_dir: &project_dir,
        quiet: true,
        show_progress: false,
    };

    let mut stderr = Vec::new();
    world.result = Some(run_pipeline(&config, &downloader, &mut stderr));
}

#[then("the archive is saved to the working directory")]
fn then_archive_saved(world: &mut PipelineWorld) {
    let contents = std::fs::read(world.archive_path().as_std_path()).expect("archive on disk");
    assert_eq!(contents, FAKE_ARCHIVE);
}

#[then("the manifest output references the downloaded archive")]
fn then_manifest_references_archive(world: &mut PipelineWorld) {
    let text =
        std::fs::read_to_string(world.manifest_output().as_std_path()).expect("manifest written");
    let document: Value = serde_json::from_str(&text).expect("valid JSON");
    let source = &document["modules"][0]["sources"][0];

    let expected_url = format!("file://{}", world.archive_path());
    assert_eq!(source["type"], "archive");
    assert_eq!(source["url"], Value::String(expected_url));

    let expected_digest = compute_sha256(world.archive_path().as_std_path()).expect("digest");
    assert_eq!(source["sha256"], Value::String(expected_digest.into_inner()));
}

#[then("the run succeeds")]
fn then_run_succeeds(world: &mut PipelineWorld) {
    match world.result.as_ref().expect("pipeline ran") {
        Ok(path) => assert_eq!(*path, world.manifest_output()),
        Err(err) => panic!("expected success, got {err}"),
    }
}

#[then("the run fails with no build found")]
fn then_fails_no_build(world: &mut PipelineWorld) {
    assert!(matches!(
        world.result.as_ref().expect("pipeline ran"),
        Err(FetchError::BuildNotFound { .. })
    ));
}

#[then("the run fails with a download error")]
fn then_fails_download(world: &mut PipelineWorld) {
    assert!(matches!(
        world.result.as_ref().expect("pipeline ran"),
        Err(FetchError::Download { .. })
    ));
}

#[then("no archive is written")]
fn then_no_archive(world: &mut PipelineWorld) {
    assert!(!world.archive_path().as_std_path().exists());
}

#[then("no output manifest is written")]
fn then_no_manifest(world: &mut PipelineWorld) {
    assert!(!world.manifest_output().as_std_path().exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Fetch the latest nightly and patch the manifest"
)]
fn scenario_fetch_and_patch(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Missing indicator resolves to no build found"
)]
fn scenario_missing_indicator(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Blank indicator resolves to no build found"
)]
fn scenario_blank_indicator(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Interrupted download aborts the run"
)]
fn scenario_interrupted_download(world: PipelineWorld) {
    let _ = world;
}
