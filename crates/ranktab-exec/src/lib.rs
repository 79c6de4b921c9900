//! `ranktab-exec` — Command execution against cluster hosts.
//!
//! This crate owns every I/O primitive the discovery engine consumes: a
//! local process runner, an authenticated SSH session per remote host, and
//! the local-address lookup that decides which of the two a host gets.
//! The engine itself never touches a socket or a process directly; it talks
//! to the [`CommandRunner`] seam.

// ── Module declarations ───────────────────────────────────────────────────────

pub mod local;
pub mod resolver;
pub mod runner;
pub mod ssh;
pub mod target;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use local::LocalRunner;
pub use resolver::{match_local_address, resolve_local_address};
pub use runner::{CommandOutput, CommandRunner};
pub use ssh::SshSession;
pub use target::ExecutionTarget;
