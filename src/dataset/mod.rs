pub mod diagnostics;
pub mod links;
pub mod listing;
pub mod loader;
pub mod snapshot;
pub mod store;

pub use listing::ComparableListing;
pub use loader::DatasetError;
pub use snapshot::{BuildingMatch, DatasetSnapshot, MatchMethod};
pub use store::DatasetStore;
