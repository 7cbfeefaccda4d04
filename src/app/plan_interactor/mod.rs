// Plan interactor - Dry run of the segmentation planner

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Where the planned duration comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    Duration(MediaDuration),
    /// Probed with the media tool
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub source: PlanSource,
    pub mode: SegmentMode,
    pub label: String,
    pub extension: String,
    pub pad_width: usize,
}

/// Boundary set plus the files the segment muxer would produce
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub duration: MediaDuration,
    pub mode: SegmentMode,
    pub boundaries: Vec<f64>,
    pub segment_lengths: Vec<f64>,
    pub segment_count: usize,
    pub segment_files: Vec<String>,
}

impl PlanReport {
    /// Human-readable rendering for the terminal
    pub fn render_text(&self) -> String {
        let mut text = format!(
            "Duration: {} ({}s)\nMode: {}\nSegments: {}\n",
            self.duration,
            self.duration.seconds(),
            self.mode,
            self.segment_count
        );
        let boundaries: Vec<String> = self.boundaries.iter().map(|b| b.to_string()).collect();
        text.push_str(&format!("Boundaries: [{}]\n", boundaries.join(", ")));
        for (name, length) in self.segment_files.iter().zip(&self.segment_lengths) {
            text.push_str(&format!("  {}  {:.3}s\n", name, length));
        }
        text
    }
}

/// Interactor for segmentation dry runs
pub struct PlanInteractor {
    probe_port: Arc<dyn ProbePort>,
    log_port: Arc<dyn LogPort>,
}

impl PlanInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, log_port: Arc<dyn LogPort>) -> Self {
        Self {
            probe_port,
            log_port,
        }
    }

    pub async fn execute(&self, request: &PlanRequest) -> Result<PlanReport, DomainError> {
        let duration = match &request.source {
            PlanSource::Duration(duration) => *duration,
            PlanSource::File(path) => {
                self.log_port
                    .debug(&format!("Probing {}", path.display()))
                    .await;
                self.probe_port.probe_duration(path).await?
            }
        };

        let naming = SegmentNaming::new(&request.label, &request.extension, request.pad_width);
        let plan = SegmentPlanner::plan_boundaries(duration, request.mode)?;
        SegmentPlanner::check_capacity(&plan, &naming)?;

        let segment_count = plan.segment_count();
        Ok(PlanReport {
            duration,
            mode: request.mode,
            segment_lengths: plan.segment_lengths(),
            segment_count,
            segment_files: (0..segment_count).map(|i| naming.file_name(i)).collect(),
            boundaries: plan.boundaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TracingLogAdapter;
    use async_trait::async_trait;

    struct FixedProbe(f64);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe_duration(&self, _path: &std::path::Path) -> Result<MediaDuration, DomainError> {
            MediaDuration::from_seconds(self.0)
        }
    }

    fn interactor(seconds: f64) -> PlanInteractor {
        PlanInteractor::new(
            Arc::new(FixedProbe(seconds)),
            Arc::new(TracingLogAdapter::default()),
        )
    }

    fn request(source: PlanSource, mode: SegmentMode) -> PlanRequest {
        PlanRequest {
            source,
            mode,
            label: "video1".to_string(),
            extension: "mp4".to_string(),
            pad_width: 2,
        }
    }

    #[tokio::test]
    async fn test_plan_from_duration() {
        let report = interactor(0.0)
            .execute(&request(
                PlanSource::Duration(MediaDuration::from_seconds(130.0).unwrap()),
                SegmentMode::FixedLength { seconds: 60.0 },
            ))
            .await
            .unwrap();

        assert_eq!(report.boundaries, vec![60.0, 120.0, 130.0]);
        assert_eq!(report.segment_lengths, vec![60.0, 60.0, 10.0]);
        assert_eq!(
            report.segment_files,
            vec!["video1_00.mp4", "video1_01.mp4", "video1_02.mp4"]
        );
        let text = report.render_text();
        assert!(text.contains("Boundaries: [60, 120, 130]"));
        assert!(text.contains("video1_02.mp4  10.000s"));
    }

    #[tokio::test]
    async fn test_plan_from_probed_file() {
        let report = interactor(100.0)
            .execute(&request(
                PlanSource::File(PathBuf::from("video1.mp4")),
                SegmentMode::Count { n: 4 },
            ))
            .await
            .unwrap();
        assert_eq!(report.boundaries, vec![25.0, 50.0, 75.0]);
        assert_eq!(report.segment_count, 4);
    }

    #[tokio::test]
    async fn test_plan_over_padding_capacity_fails() {
        let result = interactor(0.0)
            .execute(&request(
                PlanSource::Duration(MediaDuration::from_seconds(1000.0).unwrap()),
                SegmentMode::FixedLength { seconds: 5.0 },
            ))
            .await;
        assert_eq!(
            result,
            Err(DomainError::SegmentOverflow {
                planned: 200,
                max: 100
            })
        );
    }
}
