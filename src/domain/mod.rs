pub mod property;
pub mod reason;
pub mod unit;

pub use property::{ListingType, PropertyFacts, ResolvedProperty};
pub use reason::ReasonCode;
pub use unit::UnitType;
