//! Read-only adapter over an external language-server-protocol-like type
//! server. Strict layering: only `TypeServerHandle<Present>` (held by
//! the Type, Signature, and Expression builders in `codegraph-semantic`)
//! can query it; every other builder gets `TypeServerHandle<Never>`.

mod adapter;
mod capability;
mod client;
mod error;
mod types;
mod wire;

pub use adapter::TypeServerAdapter;
pub use capability::{Capability, Never, Present, TypeServerHandle};
pub use error::TypeServerError;
pub use types::{HoverResult, Location, Position};
