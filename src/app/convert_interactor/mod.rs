// Convert interactor - Single video to phone-compatible mp4

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::ConvertCommand;
use crate::ports::*;

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub source: SourceSpec,
    pub output: PathBuf,
    pub format_selector: String,
    pub encode: EncodeSettings,
    /// Leave the raw download next to the output
    pub keep_download: bool,
}

impl ConvertRequest {
    /// Raw download lands beside the output as `<stem>_raw.mp4`
    pub fn download_path(&self) -> PathBuf {
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        self.output.with_file_name(format!("{}_raw.mp4", stem))
    }
}

/// Interactor for the convert use case
pub struct ConvertInteractor {
    fetch_port: Arc<dyn FetchPort>,
    tool_port: Arc<dyn ToolPort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
}

impl ConvertInteractor {
    pub fn new(
        fetch_port: Arc<dyn FetchPort>,
        tool_port: Arc<dyn ToolPort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            fetch_port,
            tool_port,
            fs_port,
            log_port,
        }
    }

    /// Fetch if needed, transcode, then drop the raw download
    pub async fn execute(&self, request: &ConvertRequest) -> Result<PathBuf, DomainError> {
        request.encode.validate()?;
        if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs_port.create_directory(parent).await?;
        }

        let (input, downloaded) = match &request.source {
            SourceSpec::Remote(url) => {
                self.log_port.info(&format!("Fetching {}", url)).await;
                let path = self
                    .fetch_port
                    .fetch(url, &request.format_selector, &request.download_path())
                    .await?;
                (path, true)
            }
            SourceSpec::Local(path) => {
                if !self.fs_port.file_exists(path).await? {
                    return Err(DomainError::FsFail(format!(
                        "Source file does not exist: {}",
                        path.display()
                    )));
                }
                (path.clone(), false)
            }
        };

        if input == request.output {
            return Err(DomainError::BadArgs(
                "Output path must differ from the input file".to_string(),
            ));
        }

        self.log_port
            .info(&format!("Converting to {}", request.output.display()))
            .await;
        let args = ConvertCommand {
            input: &input,
            output: &request.output,
            encode: &request.encode,
        }
        .build();
        self.tool_port.run(&args).await?.check("convert")?;

        if downloaded && !request.keep_download {
            if let Err(e) = self.fs_port.delete_file(&input).await {
                self.log_port.warn(&format!("Cleanup failed: {}", e)).await;
            }
        }

        self.log_port
            .info(&format!("Converted video saved to {}", request.output.display()))
            .await;
        Ok(request.output.clone())
    }
}
