mod executor;
mod fork_executor;
mod path_resolver;
mod stage;
#[cfg(test)]
pub mod tests;

pub use executor::{ExecError, ExecStatus, Executor};
pub use fork_executor::ForkExecutor;
pub use path_resolver::PathResolver;
