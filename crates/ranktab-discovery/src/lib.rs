//! `ranktab-discovery` — Topology discovery and rank assignment.
//!
//! Given an ordered host list and credentials, this crate reaches every
//! host (in-process for the local machine, over SSH otherwise), queries
//! each device slot for its network address, and assembles one rank-table
//! descriptor with globally unique, contiguous rank ids. The build is
//! all-or-nothing per host — a host either contributes its complete device
//! list or nothing — and, under the default abort-all policy, all-or-nothing
//! for the whole run.
//!
//! ```text
//! hosts ──▶ resolve local ──▶ per host: connect ─▶ enumerate ─▶ close
//!                                        │
//!                                        ▼
//!                         ordered device lists ──▶ assign ranks ──▶ RankTable
//! ```
//!
//! Discovery is sequential over hosts; rank assignment is a separate pure
//! pass over the collected results, so rank order depends only on the input
//! host order and never on I/O timing.

pub mod builder;
pub mod connector;
pub mod enumerator;
pub mod error;
pub mod progress;
pub mod ranker;

// ── Public re-exports ────────────────────────────────────────────────────────

pub use builder::RankTableBuilder;
pub use connector::{ClusterConnector, Connector, ExecMode};
pub use enumerator::DeviceEnumerator;
pub use error::{BuildError, Result};
pub use progress::{BuildPhase, DiscoveryRun};
pub use ranker::assign_ranks;
