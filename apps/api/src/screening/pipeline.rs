//! Screening pipeline: a fixed, linear four-stage run over one résumé / job description pair.
//!
//! Flow: parse_resume → parse_jd → match_analysis → compile_report → end.
//!
//! Every stage executes on every run. A stage that finds an error already recorded
//! does nothing, and `compile_report` turns that error into the failure report, so a
//! run always ends with a report and never with an `Err`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::ScreenError;
use crate::llm_client::ModelInvoker;
use crate::screening::documents::{extension_of, TextExtractor};
use crate::screening::extractor::StructuredExtractor;
use crate::screening::matcher::{MatchResult, MatchScorer};
use crate::screening::report::{compile_report, failure_report, ReportWriter};
use crate::screening::schema::{StructuredRecord, JOB_DESCRIPTION_SCHEMA, RESUME_SCHEMA};

// ────────────────────────────────────────────────────────────────────────────
// Inputs and state
// ────────────────────────────────────────────────────────────────────────────

/// Where the résumé comes from. Resolved once, before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    FilePath(PathBuf),
    RawText(String),
}

impl ResumeSource {
    /// A file path wins over text; blank text counts as absent.
    pub fn resolve(file: Option<PathBuf>, text: Option<String>) -> Option<Self> {
        file.map(ResumeSource::FilePath).or_else(|| {
            text.filter(|t| !t.trim().is_empty())
                .map(ResumeSource::RawText)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ParseResume,
    ParseJd,
    MatchAnalysis,
    CompileReport,
}

impl Stage {
    pub const FIRST: Stage = Stage::ParseResume;

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::ParseResume => Some(Stage::ParseJd),
            Stage::ParseJd => Some(Stage::MatchAnalysis),
            Stage::MatchAnalysis => Some(Stage::CompileReport),
            Stage::CompileReport => None,
        }
    }
}

/// State threaded through one run. Owned by that run alone.
#[derive(Debug, Serialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    #[serde(skip)]
    pub resume_source: Option<ResumeSource>,
    #[serde(skip)]
    pub jd_text: String,
    pub resume_record: Option<StructuredRecord>,
    pub jd_record: Option<StructuredRecord>,
    pub match_result: Option<MatchResult>,
    pub final_report: String,
    pub report_path: Option<PathBuf>,
    pub error: Option<String>,
    pub stages: Vec<Stage>,
}

impl PipelineState {
    pub fn new(resume_source: Option<ResumeSource>, jd_text: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            resume_source,
            jd_text: jd_text.into(),
            resume_record: None,
            jd_record: None,
            match_result: None,
            final_report: String::new(),
            report_path: None,
            error: None,
            stages: Vec::with_capacity(4),
        }
    }

    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Records `error` unless an earlier one is already set.
    fn fail(&mut self, error: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }
}

/// A résumé uploaded through the HTTP layer.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct ScreeningInput {
    pub job_description: String,
    pub resume_text: Option<String>,
    pub resume_file: Option<UploadedResume>,
}

/// What callers get back from `ScreeningPipeline::process`.
#[derive(Debug, Serialize)]
pub struct ScreeningOutcome {
    pub final_report: String,
    pub error: Option<String>,
    pub match_result: Option<MatchResult>,
    pub resume_record: Option<StructuredRecord>,
    pub jd_record: Option<StructuredRecord>,
    pub report_path: Option<PathBuf>,
}

impl ScreeningOutcome {
    fn failed(error: &ScreenError) -> Self {
        Self {
            final_report: format!("Error: {error}"),
            error: Some(error.to_string()),
            match_result: None,
            resume_record: None,
            jd_record: None,
            report_path: None,
        }
    }
}

impl From<PipelineState> for ScreeningOutcome {
    fn from(state: PipelineState) -> Self {
        Self {
            final_report: state.final_report,
            error: state.error,
            match_result: state.match_result,
            resume_record: state.resume_record,
            jd_record: state.jd_record,
            report_path: state.report_path,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

pub struct ScreeningPipeline {
    resume_parser: StructuredExtractor,
    jd_parser: StructuredExtractor,
    matcher: MatchScorer,
    documents: Arc<dyn TextExtractor>,
    reports: ReportWriter,
}

/// Per-schema input caps, in characters.
#[derive(Debug, Clone, Copy)]
pub struct InputLimits {
    pub resume_max_chars: usize,
    pub jd_max_chars: usize,
}

impl ScreeningPipeline {
    pub fn new(
        llm: Arc<dyn ModelInvoker>,
        documents: Arc<dyn TextExtractor>,
        reports: ReportWriter,
        limits: InputLimits,
    ) -> Self {
        Self {
            resume_parser: StructuredExtractor::resume(llm.clone(), limits.resume_max_chars),
            jd_parser: StructuredExtractor::job_description(llm.clone(), limits.jd_max_chars),
            matcher: MatchScorer::new(llm),
            documents,
            reports,
        }
    }

    /// Top-level entry: stages any uploaded file, runs the pipeline and never fails.
    pub async fn process(&self, input: ScreeningInput) -> ScreeningOutcome {
        let upload = input.resume_file;
        // Keeps the staged upload alive for the whole run; dropped (and deleted) after.
        let staged = blocking(move || upload.as_ref().map(stage_upload).transpose()).await;
        let staged = match staged {
            Ok(staged) => staged,
            Err(e) => {
                error!("Could not stage uploaded resume: {e}");
                return ScreeningOutcome::failed(&e);
            }
        };

        let source = ResumeSource::resolve(
            staged.as_ref().map(|f| f.path().to_path_buf()),
            input.resume_text,
        );

        self.run(PipelineState::new(source, input.job_description))
            .await
            .into()
    }

    /// Runs all four stages in order and returns the final state.
    pub async fn run(&self, mut state: PipelineState) -> PipelineState {
        let span = info_span!("screening", run_id = %state.run_id);
        async {
            let mut stage = Some(Stage::FIRST);
            while let Some(current) = stage {
                self.execute(current, &mut state).await;
                state.stages.push(current);
                stage = current.next();
            }
            info!(failed = state.has_failed(), "Screening run finished");
        }
        .instrument(span)
        .await;

        state
    }

    async fn execute(&self, stage: Stage, state: &mut PipelineState) {
        match stage {
            Stage::ParseResume => self.parse_resume(state).await,
            Stage::ParseJd => self.parse_jd(state).await,
            Stage::MatchAnalysis => self.match_analysis(state).await,
            Stage::CompileReport => self.compile(state).await,
        }
    }

    async fn parse_resume(&self, state: &mut PipelineState) {
        if state.has_failed() {
            return;
        }

        match self.read_resume(state.resume_source.as_ref()).await {
            Ok(record) => {
                if record.is_placeholder() {
                    warn!("Resume extraction recovered no fields");
                }
                info!("Resume parsed successfully");
                state.resume_record = Some(record);
            }
            Err(e) => {
                error!("Error parsing resume: {e}");
                state.fail(e.to_string());
                state.resume_record = Some(StructuredRecord::placeholder(&RESUME_SCHEMA));
            }
        }
    }

    async fn read_resume(
        &self,
        source: Option<&ResumeSource>,
    ) -> Result<StructuredRecord, ScreenError> {
        match source {
            Some(ResumeSource::FilePath(path)) => {
                info!("Parsing resume file {}", path.display());
                let documents = Arc::clone(&self.documents);
                let path = path.clone();
                let text = blocking(move || documents.extract_text(&path)).await?;
                self.resume_parser.extract(&text).await
            }
            Some(ResumeSource::RawText(text)) => {
                // Same file-reading path as uploads. The temp file is removed when
                // `staged` drops, whichever way the closure returns.
                let documents = Arc::clone(&self.documents);
                let text = text.clone();
                let text = blocking(move || {
                    let staged = stage_text(&text)?;
                    documents.extract_text(staged.path())
                })
                .await?;
                self.resume_parser.extract(&text).await
            }
            None => Err(ScreenError::Input(
                "no resume file or text provided".to_string(),
            )),
        }
    }

    async fn parse_jd(&self, state: &mut PipelineState) {
        if state.has_failed() {
            return;
        }

        info!("Parsing job description...");
        let result = if state.jd_text.trim().is_empty() {
            Err(ScreenError::Input(
                "no job description text provided".to_string(),
            ))
        } else {
            self.jd_parser.extract(&state.jd_text).await
        };

        match result {
            Ok(record) => {
                if record.is_placeholder() {
                    warn!("Job description extraction recovered no fields");
                }
                info!("Job description parsed successfully");
                state.jd_record = Some(record);
            }
            Err(e) => {
                error!("Error parsing job description: {e}");
                state.fail(e.to_string());
                state.jd_record = Some(StructuredRecord::placeholder(&JOB_DESCRIPTION_SCHEMA));
            }
        }
    }

    async fn match_analysis(&self, state: &mut PipelineState) {
        if state.has_failed() {
            return;
        }

        info!("Analyzing match...");
        let scored = match (&state.resume_record, &state.jd_record) {
            (Some(resume), Some(jd)) => Some(self.matcher.score(resume, jd).await),
            _ => None,
        };

        match scored {
            Some(result) => {
                state.match_result = Some(result);
                info!("Match analysis completed");
            }
            None => {
                error!("Match analysis started without parsed inputs");
                state.fail("missing resume or job description data");
                state.match_result = Some(MatchResult::default());
            }
        }
    }

    async fn compile(&self, state: &mut PipelineState) {
        info!("Compiling report...");

        if let Some(error) = &state.error {
            state.final_report = failure_report(error);
            return;
        }

        let result = state.match_result.clone().unwrap_or_default();
        let report = compile_report(&result, None);

        let reports = self.reports.clone();
        let contents = report.clone();
        match blocking(move || reports.persist(&contents)).await {
            Ok(path) => {
                state.report_path = Some(path);
                state.final_report = report;
                info!("Report compiled successfully");
            }
            Err(e) => {
                error!("Error compiling report: {e}");
                state.fail(e.to_string());
                state.final_report = failure_report(&e.to_string());
            }
        }
    }
}

/// Runs file and CPU-heavy work (document parsing, temp files, report writes)
/// on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, ScreenError>
where
    F: FnOnce() -> Result<T, ScreenError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

fn stage_text(text: &str) -> Result<NamedTempFile, ScreenError> {
    let mut file = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Writes an upload to a temp file that keeps its original extension, so the
/// document extractor can dispatch on it.
fn stage_upload(upload: &UploadedResume) -> Result<NamedTempFile, ScreenError> {
    let suffix = extension_of(Path::new(&upload.file_name))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(&upload.bytes)?;
    file.flush()?;
    Ok(file)
}
