//! CLI command implementations.

pub mod check;
pub mod plan;
pub mod resolve;

pub use check::CheckCommand;
pub use plan::PlanCommand;
pub use resolve::ResolveCommand;
