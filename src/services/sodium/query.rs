use crate::utils::report::format_number;
use serde_json::Value;
use url::Url;

/// Ordered query string parameters.
///
/// Absent and null values are dropped. Arrays expand to one pair per element
/// under the same key, in element order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks `keys` out of a tool's arguments, in the order given.
    pub fn from_args(args: &Value, keys: &[&str]) -> Self {
        let mut params = Self::new();
        for key in keys {
            if let Some(value) = args.get(*key) {
                params.push(key, value);
            }
        }
        params
    }

    pub fn push(&mut self, key: &str, value: &Value) -> &mut Self {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(rendered) = render_scalar(item) {
                        self.pairs.push((key.to_string(), rendered));
                    }
                }
            }
            other => {
                if let Some(rendered) = render_scalar(other) {
                    self.pairs.push((key.to_string(), rendered));
                }
            }
        }
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.push(key, &value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(match (number.as_i64(), number.as_u64(), number.as_f64()) {
            (Some(int), _, _) => int.to_string(),
            (_, Some(uint), _) => uint.to_string(),
            (_, _, Some(float)) => format_number(float),
            _ => number.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;
    use serde_json::{json, Value};
    use url::Url;

    #[test]
    fn arrays_become_repeated_keys_in_order() {
        let args = json!({"search": "audit", "service": ["S3", "S1", "S2"], "limit": 10});
        let params = QueryParams::from_args(&args, &["search", "service", "limit"]);
        let mut url = Url::parse("https://api.example.com/tenants/t/service-packages").unwrap();
        params.apply(&mut url);
        assert_eq!(
            url.query(),
            Some("search=audit&service=S3&service=S1&service=S2&limit=10")
        );
    }

    #[test]
    fn whole_floats_render_as_integers() {
        let args = json!({"offset": 20.0, "limit": 5.0, "ratio": 2.5});
        let params = QueryParams::from_args(&args, &["offset", "limit", "ratio"]);
        let mut url = Url::parse("https://api.example.com/tenants/t/clients").unwrap();
        params.apply(&mut url);
        assert_eq!(url.query(), Some("offset=20&limit=5&ratio=2.5"));
    }

    #[test]
    fn absent_and_null_values_never_appear() {
        let args = json!({"offset": null, "isActive": false});
        let params = QueryParams::from_args(&args, &["offset", "limit", "isActive"]);
        assert_eq!(
            params.pairs(),
            &[("isActive".to_string(), "false".to_string())]
        );
    }

    #[test]
    fn strings_are_not_quoted_and_are_encoded() {
        let params = QueryParams::new().with("search", "Smith & Sons");
        let mut url = Url::parse("https://api.example.com/x").unwrap();
        params.apply(&mut url);
        assert_eq!(url.query(), Some("search=Smith+%26+Sons"));
    }

    #[test]
    fn empty_params_leave_the_url_untouched() {
        let mut url = Url::parse("https://api.example.com/x").unwrap();
        QueryParams::new().with("offset", Value::Null).apply(&mut url);
        assert_eq!(url.as_str(), "https://api.example.com/x");
    }
}
