//! Text rendering helpers shared by the tool managers.
//!
//! Records are opaque JSON objects; fields are looked up by dotted path
//! (`manager.name`) and only emitted when present.

use crate::constants::report::{CURRENCY, RECORD_SEPARATOR, UNKNOWN};
use serde_json::Value;
use std::fmt::Display;

pub fn field<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, key| current.get(key))
        .filter(|value| !value.is_null())
}

/// Non-empty text at `path`. Numbers and booleans are rendered too.
pub fn text_at(record: &Value, path: &str) -> Option<String> {
    match field(record, path)? {
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => number.as_f64().map(format_number),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub fn number_at(record: &Value, path: &str) -> Option<f64> {
    field(record, path).and_then(Value::as_f64)
}

pub fn bool_at(record: &Value, path: &str) -> bool {
    field(record, path).and_then(Value::as_bool).unwrap_or(false)
}

pub fn array_at<'a>(record: &'a Value, path: &str) -> &'a [Value] {
    field(record, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Key/value pairs of an object field, values rendered as text, in key order.
pub fn entries_at(record: &Value, path: &str) -> Vec<(String, String)> {
    field(record, path)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(key, value)| {
                    let rendered = match value {
                        Value::String(text) => text.clone(),
                        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
                        other => other.to_string(),
                    };
                    (key.clone(), rendered)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// First non-empty text among `paths`, or `?`.
pub fn text_or_unknown(record: &Value, paths: &[&str]) -> String {
    paths
        .iter()
        .find_map(|path| text_at(record, path))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Integers print without a fractional part; other values use the shortest
/// round-tripping form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn money(value: f64) -> String {
    format!("{}{:.2}", CURRENCY, value)
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// `name` of a nested reference, else its `code`.
pub fn reference_name(record: &Value, path: &str) -> Option<String> {
    text_at(record, &format!("{}.name", path)).or_else(|| text_at(record, &format!("{}.code", path)))
}

pub fn join_records(records: impl IntoIterator<Item = String>) -> String {
    records.into_iter().collect::<Vec<_>>().join(RECORD_SEPARATOR)
}

/// Line accumulator; `optional` lines vanish when their value is absent.
#[derive(Debug, Default, Clone)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn labeled(&mut self, label: &str, value: impl Display) -> &mut Self {
        self.lines.push(format!("{}: {}", label, value));
        self
    }

    pub fn optional<T: Display>(&mut self, label: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.labeled(label, value);
        }
        self
    }

    pub fn text(&mut self, label: &str, record: &Value, path: &str) -> &mut Self {
        self.optional(label, text_at(record, path))
    }

    /// `label: Yes` only when the flag is true.
    pub fn flag(&mut self, label: &str, record: &Value, path: &str) -> &mut Self {
        if bool_at(record, path) {
            self.labeled(label, "Yes");
        }
        self
    }

    pub fn money(&mut self, label: &str, record: &Value, path: &str) -> &mut Self {
        self.optional(label, number_at(record, path).map(money))
    }

    pub fn extend(&mut self, other: Report) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_lookups_skip_nulls_and_empty_strings() {
        let record = json!({"manager": {"name": "", "code": "M1"}, "partner": null});
        assert_eq!(text_at(&record, "manager.name"), None);
        assert_eq!(reference_name(&record, "manager").as_deref(), Some("M1"));
        assert_eq!(reference_name(&record, "partner"), None);
        assert_eq!(text_or_unknown(&record, &["code"]), "?");
    }

    #[test]
    fn numbers_render_without_trailing_zeroes() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(text_at(&json!({"n": 12}), "n").as_deref(), Some("12"));
        assert_eq!(money(1200.0), "£1200.00");
        assert_eq!(money(99.999), "£100.00");
    }

    #[test]
    fn report_omits_absent_fields() {
        let record = json!({"code": "C1", "type": "SoleTrader", "isPrimary": false});
        let mut report = Report::new();
        report
            .labeled("Code", "C1")
            .text("Type", &record, "type")
            .text("Status", &record, "status")
            .flag("Primary", &record, "isPrimary")
            .money("Price", &record, "price");
        assert_eq!(report.finish(), "Code: C1\nType: SoleTrader");
    }

    #[test]
    fn object_entries_render_values_as_text() {
        let record = json!({"answers": {"Employees": "6+", "Entities": 2}});
        assert_eq!(
            entries_at(&record, "answers"),
            vec![
                ("Employees".to_string(), "6+".to_string()),
                ("Entities".to_string(), "2".to_string())
            ]
        );
        assert!(entries_at(&record, "missing").is_empty());
    }

    #[test]
    fn records_join_with_separator() {
        let joined = join_records(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(joined, "a\n\n---\n\nb");
    }
}
