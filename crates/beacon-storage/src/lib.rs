//! # beacon-storage
//!
//! The process-wide record collection.
//!
//! ```text
//! RecordStore
//! ├── RwLock<Arc<StoreSnapshot>>   content, swapped atomically on every write
//! ├── write gate                   serializes writers (create/update/replace)
//! └── DashMap<RecordId, counters>  usage counters, mutated independently
//! ```
//!
//! Readers clone the current snapshot `Arc` and never block on a
//! reconciliation in flight. Usage counters are kept outside the snapshot so
//! a bulk replace and a counter increment never overwrite each other.

pub mod counters;
pub mod snapshot;
pub mod store;

pub use counters::UsageCounters;
pub use snapshot::StoreSnapshot;
pub use store::{RecordStore, ReplaceOutcome};
