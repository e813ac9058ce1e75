use codegraph_core::PipelineError;
use std::collections::HashMap;

/// The stable, machine-classifiable kinds a per-file error is bucketed
/// into for the final build summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    IrBuild,
    SemanticBuild,
    ExternalAnalyzerUnavailable,
    CrossFileAmbiguity,
    DependencyCycle,
    Cancelled,
    Other,
}

impl From<&PipelineError> for ErrorKind {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::Parse { .. } => ErrorKind::Parse,
            PipelineError::IrBuild { .. } => ErrorKind::IrBuild,
            PipelineError::SemanticBuild { .. } => ErrorKind::SemanticBuild,
            PipelineError::ExternalAnalyzerUnavailable(_) => ErrorKind::ExternalAnalyzerUnavailable,
            PipelineError::CrossFileAmbiguity { .. } => ErrorKind::CrossFileAmbiguity,
            PipelineError::DependencyCycle { .. } => ErrorKind::DependencyCycle,
            PipelineError::Cancelled => ErrorKind::Cancelled,
            PipelineError::Io(_) | PipelineError::Serialization(_) => ErrorKind::Other,
        }
    }
}

/// Per-file errors never fail the build; they are isolated, logged, and
/// counted here. The caller decides what to do with a non-empty summary.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub files_processed: usize,
    pub error_counts: HashMap<ErrorKind, usize>,
    pub failed_files: Vec<String>,
}

impl BuildSummary {
    pub fn record_failure(&mut self, file: impl Into<String>, err: &PipelineError) {
        *self.error_counts.entry(ErrorKind::from(err)).or_insert(0) += 1;
        self.failed_files.push(file.into());
    }

    pub fn record_diagnostic_kind(&mut self, kind: ErrorKind) {
        *self.error_counts.entry(kind).or_insert(0) += 1;
    }

    pub fn total_errors(&self) -> usize {
        self.error_counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_failure_under_its_error_kind() {
        let mut summary = BuildSummary::default();
        summary.record_failure("a.py", &PipelineError::Parse { file: "a.py".into(), details: "bad".into() });
        assert_eq!(summary.error_counts.get(&ErrorKind::Parse), Some(&1));
        assert_eq!(summary.failed_files, vec!["a.py".to_string()]);
    }
}
