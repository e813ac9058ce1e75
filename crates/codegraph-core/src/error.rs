use thiserror::Error;

/// The seven stable, machine-classifiable error kinds the pipeline can
/// produce. Each per-file kind is isolated by the orchestrator: the
/// affected file's artifact for that phase is dropped and the build
/// continues. Only two global conditions (no files processed; type server
/// required but unavailable with `cycle_policy=error`) surface as a
/// build-level failure to the caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("parse error in {file}: {details}")]
    Parse { file: String, details: String },

    #[error("IR build error in {file}: {reason}")]
    IrBuild { file: String, reason: String },

    #[error("semantic build error in {file} (phase {phase}): {reason}")]
    SemanticBuild {
        file: String,
        phase: String,
        reason: String,
    },

    #[error("external type analyzer unavailable: {0}")]
    ExternalAnalyzerUnavailable(String),

    #[error("cross-file ambiguity for fqn {fqn}: {candidates:?}")]
    CrossFileAmbiguity { fqn: String, candidates: Vec<String> },

    #[error("dependency cycle across {} files", scc.len())]
    DependencyCycle { scc: Vec<String> },

    #[error("build cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
