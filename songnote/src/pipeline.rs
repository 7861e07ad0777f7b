//! End-to-end run: resolve, download, cut, deliver
//!
//! Resolution never fails the run. Download, processing and delivery
//! failures do. The working directory is cleaned up either way when asked.

use crate::error::PipelineError;
use crate::orchestrator::FallbackOrchestrator;
use crate::presentation::PresentationStrings;
use crate::services::media_processor::VIDEO_NOTE_SIZE;
use crate::services::{ClipSpec, MediaFetcher, MediaProcessor, MessageSender, WorkDir};
use crate::types::{ResolvedMetadata, SongOverride, SourceLink};
use std::path::PathBuf;
use tracing::info;

/// One run's inputs
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub link: SourceLink,
    pub clip: ClipSpec,
    pub song_override: Option<SongOverride>,
    pub chat_id: String,
    /// Remove the working directory when done
    pub remove_work_dir: bool,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub metadata: ResolvedMetadata,
    pub presentation: PresentationStrings,
    pub download_target: String,
    pub output_path: PathBuf,
}

pub struct Pipeline {
    orchestrator: FallbackOrchestrator,
    fetcher: Box<dyn MediaFetcher>,
    processor: Box<dyn MediaProcessor>,
    sender: Box<dyn MessageSender>,
    work_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        orchestrator: FallbackOrchestrator,
        fetcher: Box<dyn MediaFetcher>,
        processor: Box<dyn MediaProcessor>,
        sender: Box<dyn MessageSender>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            orchestrator,
            fetcher,
            processor,
            sender,
            work_dir: work_dir.into(),
        }
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunReport, PipelineError> {
        let metadata = self.orchestrator.resolve(&request.link).await.metadata;
        let presentation =
            PresentationStrings::build(&metadata, request.song_override.as_ref(), &request.link);
        let download_target = metadata.download_target(&request.link).to_string();

        info!(
            display = %presentation.display_text,
            file_name = %presentation.file_name,
            download_target = %download_target,
            "Presentation ready"
        );

        let work = WorkDir::prepare(&self.work_dir)?;
        let result = self
            .deliver(request, &presentation, &download_target, &work)
            .await;
        work.finish(request.remove_work_dir);

        let output_path = result?;
        Ok(RunReport {
            metadata,
            presentation,
            download_target,
            output_path,
        })
    }

    async fn deliver(
        &self,
        request: &RunRequest,
        presentation: &PresentationStrings,
        download_target: &str,
        work: &WorkDir,
    ) -> Result<PathBuf, PipelineError> {
        let download_path = work.download_path(&presentation.file_name);
        let output_path = work.output_path(&presentation.file_name);

        self.fetcher.fetch(download_target, &download_path).await?;
        self.processor
            .process(&download_path, &output_path, request.clip)
            .await?;
        info!(output = %output_path.display(), "Clip ready");

        self.sender
            .send_text(&request.chat_id, &presentation.message_text(&request.link))
            .await?;
        self.sender
            .send_video_note(
                &request.chat_id,
                &output_path,
                VIDEO_NOTE_SIZE,
                request.clip.duration_secs,
            )
            .await?;
        info!(chat_id = %request.chat_id, "Delivered");

        Ok(output_path)
    }
}
