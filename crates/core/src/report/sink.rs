use crate::report::{ExportError, ReportArtifact};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Local destination for downloaded reports.
pub trait ArtifactSink: Send + Sync {
    fn save(&self, artifact: &ReportArtifact) -> Result<PathBuf, ExportError>;
}

/// Saves reports into one directory. Each save goes through a temporary file
/// in the same directory that is renamed into place on success; on any error
/// the temporary file is dropped and removed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, artifact: &ReportArtifact) -> Result<PathBuf, ExportError> {
        let target = self.dir.join(artifact.file_name());

        let mut temp = tempfile::Builder::new()
            .prefix(".sme_report")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(|err| io_failure("create temporary report file in", &self.dir, err))?;

        temp.write_all(&artifact.bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|err| io_failure("write report to", temp.path(), err))?;

        temp.persist(&target)
            .map_err(|err| io_failure("save report as", &target, err.error))?;

        Ok(target)
    }
}

fn io_failure(action: &str, path: &Path, err: std::io::Error) -> ExportError {
    ExportError::Unknown {
        message: format!("failed to {action} {}: {err}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifact(id: i64) -> ReportArtifact {
        ReportArtifact {
            prediction_id: id,
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4\n%test".to_vec(),
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn saves_under_report_name_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());

        let path = sink.save(&artifact(3)).unwrap();

        assert_eq!(path, dir.path().join("sme_prediction_report_3.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4\n%test");
        assert_eq!(entries(dir.path()), vec!["sme_prediction_report_3.pdf"]);
    }

    #[test]
    fn repeated_export_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());

        sink.save(&artifact(3)).unwrap();
        let mut newer = artifact(3);
        newer.bytes = b"%PDF-1.7".to_vec();
        sink.save(&newer).unwrap();

        assert_eq!(entries(dir.path()), vec!["sme_prediction_report_3.pdf"]);
        assert_eq!(
            std::fs::read(dir.path().join("sme_prediction_report_3.pdf")).unwrap(),
            b"%PDF-1.7"
        );
    }

    #[test]
    fn missing_directory_is_unknown_error() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path().join("absent"));

        let err = sink.save(&artifact(1)).unwrap_err();

        assert!(matches!(err, ExportError::Unknown { .. }));
        assert!(err.to_string().contains("absent"));
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn failed_rename_removes_temporary_file() {
        let dir = TempDir::new().unwrap();
        // A directory squatting on the target name makes the final rename fail.
        std::fs::create_dir(dir.path().join("sme_prediction_report_9.pdf")).unwrap();
        std::fs::write(
            dir.path().join("sme_prediction_report_9.pdf").join("keep"),
            b"x",
        )
        .unwrap();
        let sink = DirectorySink::new(dir.path());

        let err = sink.save(&artifact(9)).unwrap_err();

        assert!(matches!(err, ExportError::Unknown { .. }));
        assert_eq!(entries(dir.path()), vec!["sme_prediction_report_9.pdf"]);
    }
}
