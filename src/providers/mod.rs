//! Provider data sources.
//!
//! Concrete vendor API clients live outside this crate and plug in through
//! [`CloudInfoer`]. [`SnapshotInfoer`] serves a catalogue from a JSON file.

mod snapshot;
mod traits;

pub use snapshot::{ProviderSnapshot, RegionSnapshot, ServiceSnapshot, SnapshotInfoer};
pub use traits::CloudInfoer;
