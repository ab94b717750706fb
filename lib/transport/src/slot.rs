use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Switch,
    Numeric,
    Text,
}

/// Retained on `<prefix>/<key>/config` when a slot is created.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SlotConfig {
    pub unit: u8,
    pub label: String,
    pub kind: SlotKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization() {
        let config = SlotConfig {
            unit: 2,
            label: "PM2.5".to_string(),
            kind: SlotKind::Numeric,
            unit_label: Some("µg/m³".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "unit": 2,
                "label": "PM2.5",
                "kind": "numeric",
                "unit_label": "µg/m³"
            })
        );
    }

    #[test]
    fn test_switch_without_unit_label() {
        let config = SlotConfig {
            unit: 1,
            label: "Power".to_string(),
            kind: SlotKind::Switch,
            unit_label: None,
        };

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"unit":1,"label":"Power","kind":"switch"}"#);

        let parsed: SlotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
