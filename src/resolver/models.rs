use serde::Deserialize;
use serde_json::Value;

// JSON-LD listing block (schema.org Product / Accommodation)
//  ├── name
//  ├── description
//  ├── address            (string or PostalAddress object, kept as-is)
//  ├── numberOfBathroomsTotal
//  ├── offers
//  │    └── price
//  └── @graph[0]
//       ├── name
//       └── description
//
// Field types vary between sites, so scalars are kept as `Value` and read
// through the helpers below.

#[derive(Debug, Default, Deserialize)]
pub struct LdListing {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub address: Option<Value>,
    #[serde(rename = "numberOfBathroomsTotal")]
    pub bathrooms: Option<Value>,
    pub offers: Option<Value>,
    #[serde(rename = "@graph")]
    pub graph: Option<Vec<Value>>,
}

impl LdListing {
    /// Splits a parsed JSON-LD block into listing objects. Arrays are
    /// flattened; entries that are not objects are dropped.
    pub fn from_block(block: &Value) -> Vec<LdListing> {
        let items: Vec<&Value> = match block {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        items
            .into_iter()
            .filter(|v| v.is_object())
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }

    pub fn name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.graph_str("name"))
    }

    pub fn description(&self) -> Option<&str> {
        self.description
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.graph_str("description"))
    }

    pub fn bathrooms(&self) -> Option<u32> {
        self.bathrooms
            .as_ref()
            .and_then(value_to_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// `offers.price`, or the first priced offer when `offers` is a list.
    pub fn offer_price(&self) -> Option<u64> {
        match self.offers.as_ref()? {
            Value::Array(offers) => offers
                .iter()
                .find_map(|o| o.get("price").and_then(value_to_u64)),
            offer => offer.get("price").and_then(value_to_u64),
        }
    }

    fn graph_str(&self, key: &str) -> Option<&str> {
        self.graph.as_ref()?.first()?.get(key)?.as_str()
    }
}

/// Reads a number that may be encoded as a JSON number or as text such as
/// `"AED 120,000"`.
pub fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let digits: String = s
                .split('.')
                .next()
                .unwrap_or_default()
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
