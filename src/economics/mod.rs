pub mod aggregator;
pub mod correction;
pub mod percentile;
pub mod seasonality;
pub mod selector;

pub use aggregator::{EconomicsAggregator, EconomicsMetrics, EconomicsResult, EconomicsSources};
pub use correction::RevparCorrection;
pub use seasonality::{ProjectedListing, ProjectionMode, SeasonalityModel};
pub use selector::{MaidFallbackPolicy, SelectionReason, UnitSelection, UnitSelector};
