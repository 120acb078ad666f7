pub mod collector;
pub mod platform;
pub mod process;
pub mod snapshot;

pub use collector::{Collector, SnapshotSource};
pub use process::ProcessEntry;
pub use snapshot::{LookupFailure, ProcessIdentity, ResourceSnapshot};
