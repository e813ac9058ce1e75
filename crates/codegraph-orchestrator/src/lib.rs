pub mod cancellation;
pub mod module_fqn;
pub mod pipeline;
pub mod summary;

pub use cancellation::CancellationToken;
pub use module_fqn::module_fqn_for_file;
pub use pipeline::{index_repository, BuildArtifacts, IncrementalRequest};
pub use summary::{BuildSummary, ErrorKind};
