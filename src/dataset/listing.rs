// src/dataset/listing.rs
use crate::domain::UnitType;
use serde::Serialize;

const AIRDNA_OVERVIEW: &str = "https://app.airdna.co/data/ae/30858/140856/overview\
    ?lat=25.117795&lng=55.134474&zoom=14&tab=active-str-listings&listing_id=abnb_";

pub const ROOM_URL_TEMPLATE: &str = "https://www.airbnb.com/rooms/";

/// One comparable short-term rental as it appears in the dataset.
///
/// Numbers are stored as found; use the accessors for normalized values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableListing {
    pub airbnb_id: String,
    pub airbnb_url: String,
    pub building: String,
    pub unit_label: String,
    pub unit_type: Option<UnitType>,
    pub revenue: f64,
    pub occupancy: f64,
    pub adr: f64,
    pub days_available: u32,
}

impl ComparableListing {
    /// Annual revenue in currency units. Values below 100 are exported in
    /// millions and get scaled up.
    pub fn normalized_revenue(&self) -> f64 {
        let rev = self.revenue;
        if rev > 0.0 && rev < 100.0 {
            (rev * 1_000_000.0).round()
        } else {
            rev.round()
        }
    }

    /// Occupancy as a percentage; fractions (`<= 1.0`) are scaled.
    pub fn occupancy_percent(&self) -> f64 {
        if self.occupancy <= 1.0 {
            self.occupancy * 100.0
        } else {
            self.occupancy
        }
    }

    pub fn airdna_url(&self) -> String {
        airdna_url(&self.airbnb_id)
    }
}

pub fn airdna_url(airbnb_id: &str) -> String {
    format!("{AIRDNA_OVERVIEW}{airbnb_id}")
}
