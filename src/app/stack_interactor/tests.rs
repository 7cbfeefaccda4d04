// Stack interactor tests with fake fetch, probe and tool ports

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use super::*;
use crate::adapters::{FsLocalAdapter, TracingLogAdapter};

/// Writes a small file wherever the downloader is asked to
#[derive(Default)]
struct FakeFetch {
    fetched: Mutex<Vec<(String, String, PathBuf)>>,
    playlist: Vec<String>,
}

#[async_trait]
impl FetchPort for FakeFetch {
    async fn fetch(
        &self,
        url: &str,
        format_selector: &str,
        destination: &Path,
    ) -> Result<PathBuf, DomainError> {
        std::fs::write(destination, b"video").unwrap();
        self.fetched.lock().unwrap().push((
            url.to_string(),
            format_selector.to_string(),
            destination.to_path_buf(),
        ));
        Ok(destination.to_path_buf())
    }

    async fn list_playlist(&self, _url: &str) -> Result<Vec<String>, DomainError> {
        Ok(self.playlist.clone())
    }
}

struct FakeProbe {
    seconds: f64,
    probed: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe_duration(&self, path: &Path) -> Result<MediaDuration, DomainError> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        MediaDuration::from_seconds(self.seconds)
    }
}

/// Creates segment files per label and final parts, failing chosen outputs
struct FakeTool {
    segments: HashMap<&'static str, usize>,
    fail_outputs: HashSet<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTool {
    fn merges(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|args| args.contains(&"-filter_complex".to_string()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ToolPort for FakeTool {
    async fn run(&self, args: &[String]) -> Result<ToolStatus, DomainError> {
        self.calls.lock().unwrap().push(args.to_vec());
        let target = PathBuf::from(args.last().unwrap());
        let file_name = target.file_name().unwrap().to_string_lossy().to_string();

        if args.contains(&"segment".to_string()) {
            let label = file_name.split("_%").next().unwrap();
            let dir = target.parent().unwrap();
            let count = self.segments.get(label).copied().unwrap_or(0);
            let naming = SegmentNaming::new(label, "mp4", 2);
            for i in 0..count {
                std::fs::write(dir.join(naming.file_name(i)), b"part").unwrap();
            }
            return Ok(ToolStatus::from_code(0));
        }

        if self.fail_outputs.contains(&file_name) {
            return Ok(ToolStatus::from_code(1));
        }
        std::fs::write(&target, b"stacked").unwrap();
        Ok(ToolStatus::from_code(0))
    }

    async fn run_capturing(&self, args: &[String]) -> Result<ToolOutput, DomainError> {
        Ok(ToolOutput {
            status: self.run(args).await?,
            diagnostics: String::new(),
        })
    }
}

struct Harness {
    dir: TempDir,
    fetch: Arc<FakeFetch>,
    probe: Arc<FakeProbe>,
    tool: Arc<FakeTool>,
}

impl Harness {
    fn new(primary_parts: usize, secondary_parts: usize) -> Self {
        Self::with_playlist(primary_parts, secondary_parts, Vec::new())
    }

    fn with_playlist(primary_parts: usize, secondary_parts: usize, playlist: Vec<String>) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            fetch: Arc::new(FakeFetch {
                fetched: Mutex::new(Vec::new()),
                playlist,
            }),
            probe: Arc::new(FakeProbe {
                seconds: 130.0,
                probed: Mutex::new(Vec::new()),
            }),
            tool: Arc::new(FakeTool {
                segments: HashMap::from([
                    (PRIMARY_LABEL, primary_parts),
                    (SECONDARY_LABEL, secondary_parts),
                ]),
                fail_outputs: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    fn failing(mut self, output: &str) -> Self {
        Arc::get_mut(&mut self.tool)
            .unwrap()
            .fail_outputs
            .insert(output.to_string());
        self
    }

    fn interactor(&self) -> StackInteractor {
        StackInteractor::new(
            self.fetch.clone(),
            self.probe.clone(),
            self.tool.clone(),
            Arc::new(FsLocalAdapter::new()),
            Arc::new(TracingLogAdapter::default()),
        )
    }

    /// Settings with two local sources inside the temp dir
    fn settings(&self) -> Settings {
        let primary = self.dir.path().join("main.mp4");
        let secondary = self.dir.path().join("filler.mp4");
        std::fs::write(&primary, b"main").unwrap();
        std::fs::write(&secondary, b"filler").unwrap();

        let mut settings = Settings::default();
        settings.sources.primary = Some(primary.to_string_lossy().to_string());
        settings.sources.secondary = Some(secondary.to_string_lossy().to_string());
        settings.paths.work_dir = self.dir.path().to_path_buf();
        settings
    }

    fn scratch(&self) -> PathBuf {
        self.dir.path().join("output_parts")
    }

    fn final_dir(&self) -> PathBuf {
        self.dir.path().join("final_output")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

#[tokio::test]
async fn test_full_run_with_cyclic_pairing() {
    let harness = Harness::new(3, 2);
    let request = StackRequest::from_settings(&harness.settings()).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    assert_eq!(report.stage, RunStage::Done);
    let pairs: Vec<(String, String, String)> = report
        .pairs
        .iter()
        .map(|p| (file_name(&p.primary), file_name(&p.secondary), file_name(&p.output)))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("video1_00.mp4".into(), "video2_00.mp4".into(), "final_part0.mp4".into()),
            ("video1_01.mp4".into(), "video2_01.mp4".into(), "final_part1.mp4".into()),
            ("video1_02.mp4".into(), "video2_00.mp4".into(), "final_part2.mp4".into()),
        ]
    );
    for i in 0..3 {
        assert!(harness.final_dir().join(format!("final_part{}.mp4", i)).exists());
    }

    // Segments and scratch dir removed, local sources untouched
    assert!(!harness.scratch().exists());
    assert!(harness.dir.path().join("main.mp4").exists());
    assert!(harness.dir.path().join("filler.mp4").exists());

    let written = std::fs::read_to_string(harness.final_dir().join(REPORT_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["stage"], "done");
    assert_eq!(json["pairs"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_count_mode_probes_primary_only() {
    let harness = Harness::new(5, 5);
    let request = StackRequest::from_settings(&harness.settings()).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    assert_eq!(harness.probe.probed.lock().unwrap().len(), 1);
    assert_eq!(report.primary_plan, report.secondary_plan);
    let calls = harness.tool.calls.lock().unwrap();
    assert!(calls[0].contains(&"expr:gte(t,n_forced*26)".to_string()));
}

#[tokio::test]
async fn test_fixed_mode_probes_each_source() {
    let harness = Harness::new(3, 3);
    let mut settings = harness.settings();
    settings.segment.mode = "fixed_length".to_string();
    settings.segment.seconds = 60.0;
    let request = StackRequest::from_settings(&settings).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    assert_eq!(harness.probe.probed.lock().unwrap().len(), 2);
    let plan = report.primary_plan.unwrap();
    assert_eq!(plan.boundaries, vec![60.0, 120.0, 130.0]);
    let calls = harness.tool.calls.lock().unwrap();
    assert!(calls[0].contains(&"60,120,130".to_string()));
}

#[tokio::test]
async fn test_remote_sources_are_fetched_and_removed() {
    let harness = Harness::new(2, 2);
    let mut settings = harness.settings();
    settings.sources.primary = Some("https://www.youtube.com/watch?v=main".to_string());
    settings.sources.secondary = Some("https://www.youtube.com/watch?v=filler".to_string());
    settings.fetch.format_selector = "best[ext=mp4]".to_string();
    let request = StackRequest::from_settings(&settings).unwrap();

    harness.interactor().execute(&request).await.unwrap();

    let fetched = harness.fetch.fetched.lock().unwrap().clone();
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].0, "https://www.youtube.com/watch?v=main");
    assert_eq!(fetched[0].1, "best[ext=mp4]");
    assert_eq!(fetched[0].2, harness.dir.path().join("video1.mp4"));
    assert_eq!(fetched[1].2, harness.dir.path().join("video2.mp4"));
    assert!(!harness.dir.path().join("video1.mp4").exists());
    assert!(!harness.dir.path().join("video2.mp4").exists());
}

#[tokio::test]
async fn test_first_merge_failure_aborts_run() {
    let harness = Harness::new(3, 3).failing("final_part1.mp4");
    let request = StackRequest::from_settings(&harness.settings()).unwrap();

    let result = harness.interactor().execute(&request).await;

    assert!(matches!(result, Err(DomainError::ToolFailure { code: Some(1), .. })));
    assert_eq!(harness.tool.merges().len(), 2);
    assert!(!harness.final_dir().join("final_part2.mp4").exists());

    // Partial files stay on disk
    assert!(harness.scratch().join("video1_00.mp4").exists());

    let written = std::fs::read_to_string(harness.final_dir().join(REPORT_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["stage"], "failed");
    assert_eq!(json["failed_stage"], "merging");
}

#[tokio::test]
async fn test_isolated_failures_run_remaining_pairs() {
    let harness = Harness::new(4, 2).failing("final_part1.mp4");
    let mut settings = harness.settings();
    settings.merge.isolate_failures = true;
    let request = StackRequest::from_settings(&settings).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    assert_eq!(harness.tool.merges().len(), 4);
    assert_eq!(report.failed_pairs(), 1);
    assert_eq!(report.outputs().len(), 3);
    assert!(report.pairs[1].error.is_some());
    // Intermediates kept for inspection
    assert!(harness.scratch().join("video2_01.mp4").exists());
}

#[tokio::test]
async fn test_parallel_workers_keep_ordinal_order() {
    let harness = Harness::new(8, 3);
    let mut settings = harness.settings();
    settings.merge.workers = 4;
    let request = StackRequest::from_settings(&settings).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    let indices: Vec<usize> = report.pairs.iter().map(|p| p.index).collect();
    assert_eq!(indices, (0..8).collect::<Vec<_>>());
    assert_eq!(file_name(&report.pairs[7].secondary), "video2_01.mp4");
    assert_eq!(report.outputs().len(), 8);
}

#[tokio::test]
async fn test_empty_primary_is_nothing_to_merge() {
    let harness = Harness::new(0, 3);
    let request = StackRequest::from_settings(&harness.settings()).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    assert_eq!(report.stage, RunStage::Done);
    assert!(report.pairs.is_empty());
    assert!(harness.tool.merges().is_empty());
}

#[tokio::test]
async fn test_empty_secondary_fails_pairing() {
    let harness = Harness::new(3, 0);
    let request = StackRequest::from_settings(&harness.settings()).unwrap();

    let result = harness.interactor().execute(&request).await;

    assert!(matches!(result, Err(DomainError::EmptySegmentList(_))));
    assert!(harness.tool.merges().is_empty());
}

#[tokio::test]
async fn test_keep_intermediates() {
    let harness = Harness::new(2, 2);
    let mut settings = harness.settings();
    settings.cleanup.keep_intermediates = true;
    let request = StackRequest::from_settings(&settings).unwrap();

    harness.interactor().execute(&request).await.unwrap();

    assert!(harness.scratch().join("video1_00.mp4").exists());
    assert!(harness.scratch().join("video2_01.mp4").exists());
}

#[tokio::test]
async fn test_missing_local_source_fails_before_segmenting() {
    let harness = Harness::new(2, 2);
    let mut settings = harness.settings();
    settings.sources.primary = Some(
        harness
            .dir
            .path()
            .join("absent.mp4")
            .to_string_lossy()
            .to_string(),
    );
    let request = StackRequest::from_settings(&settings).unwrap();

    let result = harness.interactor().execute(&request).await;

    assert!(matches!(result, Err(DomainError::FsFail(_))));
    assert!(harness.tool.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_secondary_from_playlist() {
    let harness = Harness::with_playlist(
        2,
        2,
        vec![
            "https://www.youtube.com/watch?v=a".to_string(),
            "https://www.youtube.com/watch?v=b".to_string(),
        ],
    );
    let mut settings = harness.settings();
    settings.sources.secondary = None;
    settings.sources.secondary_playlist =
        Some("https://www.youtube.com/playlist?list=xyz".to_string());
    let request = StackRequest::from_settings(&settings).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    let fetched = harness.fetch.fetched.lock().unwrap().clone();
    assert_eq!(fetched.len(), 1);
    assert!(fetched[0].0.starts_with("https://www.youtube.com/watch?v="));
    assert_eq!(report.secondary.as_deref(), Some(fetched[0].0.as_str()));
}

#[tokio::test]
async fn test_empty_playlist_is_fetch_failure() {
    let harness = Harness::new(2, 2);
    let mut settings = harness.settings();
    settings.sources.secondary = None;
    settings.sources.secondary_playlist = Some("https://www.youtube.com/playlist?list=x".to_string());
    let request = StackRequest::from_settings(&settings).unwrap();

    let result = harness.interactor().execute(&request).await;
    assert!(matches!(result, Err(DomainError::FetchFailure { .. })));
}

#[test]
fn test_request_requires_both_sources() {
    let mut settings = Settings::default();
    assert!(matches!(
        StackRequest::from_settings(&settings),
        Err(DomainError::BadArgs(_))
    ));

    settings.sources.primary = Some("main.mp4".to_string());
    assert!(matches!(
        StackRequest::from_settings(&settings),
        Err(DomainError::BadArgs(_))
    ));

    settings.sources.secondary = Some("filler.mp4".to_string());
    let request = StackRequest::from_settings(&settings).unwrap();
    assert_eq!(request.primary, SourceSpec::Local(PathBuf::from("main.mp4")));
    assert_eq!(request.mode, SegmentMode::Count { n: 5 });
    assert_eq!(request.pairing, PairingPolicy::Cyclic);
    assert_eq!(request.paths.scratch_dir, PathBuf::from("./output_parts"));
}

#[tokio::test]
async fn test_secondary_segments_past_padding_limit_overflow() {
    // Count mode cuts the secondary with the primary's length, so a long
    // secondary can produce more segments than two digits can order
    let harness = Harness::new(20, 150);
    let mut settings = harness.settings();
    settings.segment.count = 20;
    let request = StackRequest::from_settings(&settings).unwrap();

    let result = harness.interactor().execute(&request).await;

    assert!(matches!(
        result,
        Err(DomainError::SegmentOverflow { planned: 150, max: 100 })
    ));
    assert!(harness.tool.merges().is_empty());
}

#[tokio::test]
async fn test_leftover_segments_from_earlier_run_are_replaced() {
    let harness = Harness::new(3, 3);
    std::fs::create_dir_all(harness.scratch()).unwrap();
    for i in 3..6 {
        std::fs::write(harness.scratch().join(format!("video1_{:02}.mp4", i)), b"old").unwrap();
    }
    let request = StackRequest::from_settings(&harness.settings()).unwrap();

    let report = harness.interactor().execute(&request).await.unwrap();

    assert_eq!(report.pairs.len(), 3);
    assert_eq!(harness.tool.merges().len(), 3);
    assert_eq!(file_name(&report.pairs[2].primary), "video1_02.mp4");
    assert!(!harness.final_dir().join("final_part3.mp4").exists());
}

#[tokio::test]
async fn test_seeded_playlist_pick_is_reproducible() {
    let entries: Vec<String> = (0..20)
        .map(|i| format!("https://www.youtube.com/watch?v={}", i))
        .collect();

    let mut picks = Vec::new();
    for _ in 0..2 {
        let harness = Harness::with_playlist(2, 2, entries.clone());
        let mut settings = harness.settings();
        settings.sources.secondary = None;
        settings.sources.secondary_playlist =
            Some("https://www.youtube.com/playlist?list=xyz".to_string());
        settings.pairing.seed = Some(42);
        let request = StackRequest::from_settings(&settings).unwrap();

        let report = harness.interactor().execute(&request).await.unwrap();
        picks.push(report.secondary.unwrap());
    }

    assert_eq!(picks[0], picks[1]);
    assert_eq!(pick_entry(&entries, Some(42)), Some(&picks[0]));
}

#[test]
fn test_pick_entry() {
    let entries = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(pick_entry(&entries, Some(7)), pick_entry(&entries, Some(7)));
    assert!(entries.contains(pick_entry(&entries, None).unwrap()));
    assert_eq!(pick_entry(&[], Some(1)), None);
}
