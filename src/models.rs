use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory urgency attached to maintenance candidates and recommendations.
/// Never used for ordering.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Low", alias = "LOW")]
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

// The AI side sometimes answers 49.99 and sometimes "$40-60".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum EstimatedPrice {
    Amount(f64),
    Text(String),
}

impl fmt::Display for EstimatedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatedPrice::Amount(amount) => write!(f, "${:.2}", amount),
            EstimatedPrice::Text(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_accepts_capitalized_values() {
        let p: Priority = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(p, Priority::High);
        let p: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(p, Priority::Low);
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_estimated_price_number_or_text() {
        let price: EstimatedPrice = serde_json::from_str("49.5").unwrap();
        assert_eq!(price, EstimatedPrice::Amount(49.5));
        assert_eq!(price.to_string(), "$49.50");

        let price: EstimatedPrice = serde_json::from_str("\"$40-60\"").unwrap();
        assert_eq!(price, EstimatedPrice::Text("$40-60".to_string()));
    }
}
