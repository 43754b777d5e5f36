use std::path::PathBuf;
use std::sync::Arc;

pub mod sink;

pub use sink::{ArtifactSink, DirectorySink};

pub fn report_file_name(prediction_id: i64) -> String {
    format!("sme_prediction_report_{prediction_id}.pdf")
}

/// Binary report as delivered by the report service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub prediction_id: i64,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    pub fn file_name(&self) -> String {
        report_file_name(self.prediction_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorKind {
    NotFound,
    Network,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("prediction {prediction_id} has no report")]
    NotFound { prediction_id: i64 },
    #[error("could not reach report service: {message}")]
    Network { message: String },
    #[error("report export failed: {message}")]
    Unknown { message: String },
}

impl ExportError {
    pub fn kind(&self) -> ExportErrorKind {
        match self {
            ExportError::NotFound { .. } => ExportErrorKind::NotFound,
            ExportError::Network { .. } => ExportErrorKind::Network,
            ExportError::Unknown { .. } => ExportErrorKind::Unknown,
        }
    }
}

#[async_trait::async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_report(&self, prediction_id: i64) -> Result<ReportArtifact, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub prediction_id: i64,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Fetches one report and saves it locally. Exporters share no state, so
/// several exports may run at once. Saving runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct ReportExporter<R, S = DirectorySink> {
    source: R,
    sink: Arc<S>,
}

impl<R: ReportSource, S: ArtifactSink + 'static> ReportExporter<R, S> {
    pub fn new(source: R, sink: S) -> Self {
        Self {
            source,
            sink: Arc::new(sink),
        }
    }

    pub async fn export(&self, prediction_id: i64) -> Result<ExportedReport, ExportError> {
        let artifact = self.source.fetch_report(prediction_id).await?;
        let bytes = artifact.bytes.len();

        let sink = Arc::clone(&self.sink);
        let path = tokio::task::spawn_blocking(move || sink.save(&artifact))
            .await
            .map_err(|err| ExportError::Unknown {
                message: format!("report save task failed: {err}"),
            })??;

        tracing::info!(
            prediction_id,
            path = %path.display(),
            bytes,
            "report saved"
        );

        Ok(ExportedReport {
            prediction_id,
            path,
            bytes,
        })
    }
}
