mod checkpoint;
mod directory;
mod registry;
mod store;
mod tracker_state;

pub use checkpoint::CheckpointStore;
pub use directory::{DirectorySnapshot, UserDirectory};
pub use registry::UserRegistry;
pub use store::TrackerStore;
pub use tracker_state::{TrackerState, TrackerStats};
