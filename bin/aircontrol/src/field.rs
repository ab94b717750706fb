//! Static mapping between purifier status keys and gateway slots.

use serde_json::Value;
pub use transport::SlotKind as Kind;
use transport::SlotConfig;

#[derive(Debug, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: Kind,
    pub unit_label: Option<&'static str>,
    pub enabled: bool,
    /// Stable slot identity, always the 1-based position in [`FIELDS`].
    pub unit: u8,
}

const fn field(
    unit: u8,
    key: &'static str,
    label: &'static str,
    kind: Kind,
    unit_label: Option<&'static str>,
    enabled: bool,
) -> Field {
    Field {
        key,
        label,
        kind,
        unit_label,
        enabled,
        unit,
    }
}

pub static FIELDS: [Field; 23] = [
    field(1, "pwr", "Power", Kind::Switch, None, true),
    field(2, "pm25", "PM2.5", Kind::Numeric, Some("µg/m³"), true),
    field(3, "rh", "Relative humidity", Kind::Numeric, Some("%"), true),
    field(4, "rhset", "Target humidity", Kind::Numeric, Some("%"), true),
    field(5, "iaql", "Allergen index", Kind::Numeric, None, true),
    field(6, "temp", "Temperature", Kind::Numeric, Some("°C"), true),
    field(7, "mode", "Mode", Kind::Text, None, false),
    field(8, "om", "Fan speed", Kind::Text, None, false),
    field(9, "aqil", "Light brightness", Kind::Numeric, None, false),
    field(10, "aqit", "Air quality notification threshold", Kind::Numeric, None, false),
    field(11, "uil", "Buttons light", Kind::Switch, None, true),
    field(12, "ddp", "Used index", Kind::Text, None, false),
    field(13, "wl", "Water level", Kind::Numeric, None, false),
    field(14, "cl", "Child lock", Kind::Switch, None, false),
    field(15, "dt", "Timer", Kind::Numeric, None, false),
    field(16, "dtrs", "Timer remaining", Kind::Numeric, None, false),
    field(17, "fltt1", "HEPA filter type", Kind::Text, None, false),
    field(18, "fltt2", "Active carbon filter type", Kind::Text, None, false),
    field(19, "fltsts0", "Pre-filter and Wick", Kind::Numeric, Some("Hours"), true),
    field(20, "fltsts1", "HEPA filter", Kind::Numeric, Some("Hours"), true),
    field(21, "fltsts2", "Active carbon filter", Kind::Numeric, Some("Hours"), true),
    field(22, "wicksts", "Wick filter", Kind::Numeric, Some("Hours"), true),
    field(23, "err", "[ERROR] Message", Kind::Text, None, true),
];

pub fn lookup(key: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|field| field.key == key)
}

pub fn enabled() -> impl Iterator<Item = &'static Field> {
    FIELDS.iter().filter(|field| field.enabled)
}

impl Field {
    pub fn config(&self) -> SlotConfig {
        SlotConfig {
            unit: self.unit,
            label: self.label.to_string(),
            kind: self.kind,
            unit_label: self.unit_label.map(str::to_string),
        }
    }

    /// Converts a command value into the representation the device expects.
    ///
    /// Switches accept `on`/`off` and booleans and are sent as `"1"`/`"0"`;
    /// everything else is forwarded untouched.
    pub fn device_value(&self, value: Value) -> Value {
        if self.kind != Kind::Switch {
            return value;
        }

        match &value {
            Value::Bool(true) => Value::from("1"),
            Value::Bool(false) => Value::from("0"),
            Value::String(s) if s.eq_ignore_ascii_case("on") => Value::from("1"),
            Value::String(s) if s.eq_ignore_ascii_case("off") => Value::from("0"),
            _ => value,
        }
    }
}
