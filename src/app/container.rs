use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    FFmpegAdapter, FFmpegProbeAdapter, FsLocalAdapter, TracingLogAdapter, YtDlpAdapter,
};
use crate::app::{BatchInteractor, ConvertInteractor, PlanInteractor, StackInteractor};
use crate::domain::model::Settings;
use crate::ports::{FetchPort, FsPort, LogPort, ProbePort, ToolPort};

pub trait AppContainer: Send + Sync {
    fn stack_interactor(&self) -> Arc<StackInteractor>;
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn plan_interactor(&self) -> Arc<PlanInteractor>;
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
}

pub struct DefaultAppContainer {
    stack_interactor: Arc<StackInteractor>,
    batch_interactor: Arc<BatchInteractor>,
    plan_interactor: Arc<PlanInteractor>,
    convert_interactor: Arc<ConvertInteractor>,
}

impl DefaultAppContainer {
    /// Wire the real adapters for the configured tool binaries
    pub fn new(settings: &Settings) -> Self {
        let timeout = settings.tool.timeout_secs.map(Duration::from_secs);

        let tool_port: Arc<dyn ToolPort> =
            Arc::new(FFmpegAdapter::new(settings.tool.ffmpeg.clone(), timeout));
        let probe_port: Arc<dyn ProbePort> = Arc::new(
            FFmpegProbeAdapter::new(Arc::clone(&tool_port)).strict(settings.tool.strict_probe),
        );
        let fetch_port: Arc<dyn FetchPort> =
            Arc::new(YtDlpAdapter::new(settings.fetch.binary.clone(), timeout));
        let fs_port: Arc<dyn FsPort> = Arc::new(FsLocalAdapter::new());
        let log_port: Arc<dyn LogPort> = Arc::new(TracingLogAdapter::new("stackclip::app"));

        let stack_interactor = Arc::new(StackInteractor::new(
            Arc::clone(&fetch_port),
            Arc::clone(&probe_port),
            Arc::clone(&tool_port),
            Arc::clone(&fs_port),
            Arc::clone(&log_port),
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(
            Arc::clone(&fetch_port),
            Arc::clone(&stack_interactor),
            Arc::clone(&fs_port),
            Arc::clone(&log_port),
        ));

        let plan_interactor = Arc::new(PlanInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&log_port),
        ));

        let convert_interactor = Arc::new(ConvertInteractor::new(
            Arc::clone(&fetch_port),
            Arc::clone(&tool_port),
            Arc::clone(&fs_port),
            Arc::clone(&log_port),
        ));

        Self {
            stack_interactor,
            batch_interactor,
            plan_interactor,
            convert_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn stack_interactor(&self) -> Arc<StackInteractor> {
        Arc::clone(&self.stack_interactor)
    }

    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn plan_interactor(&self) -> Arc<PlanInteractor> {
        Arc::clone(&self.plan_interactor)
    }

    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }
}
