//! Language-agnostic structural IR generator: an iterative,
//! dispatch-table-driven walk from a parsed syntax tree to an `IrDocument`.

mod builder;
mod dispatch;
mod scope;

pub use builder::{build_error, IrBuilder};
pub use dispatch::{dispatch_for, NodeAction};
pub use scope::{ScopeFrame, ScopeStack};
