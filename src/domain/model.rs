use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Wire format for window boundaries and the `--from`/`--to` arguments.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 訂單原始記錄。保留完整 JSON，欄位缺漏或型別錯誤一律視為不存在。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(pub Value);

impl Order {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The effective order body: a non-empty `order` object wins over the record itself.
    pub fn body(&self) -> &Value {
        match self.0.get("order") {
            Some(Value::Object(inner)) if !inner.is_empty() => &self.0["order"],
            _ => &self.0,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body().get(key).filter(|v| !v.is_null())
    }

    /// `false`, `""` and `0` mean no customer; any object, even `{}`, is one.
    pub fn has_customer(&self) -> bool {
        match self.field("customer") {
            None | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(_) => true,
        }
    }

    pub fn phone(&self) -> Option<&str> {
        self.field("phone")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
    }

    /// A missing or null sum counts as zero; a present one only when it is numerically 0.
    pub fn is_zero_sum(&self) -> bool {
        match self.field("sum") {
            None => true,
            Some(v) => v.as_f64() == Some(0.0),
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.field(key).map(display_value)
    }

    pub fn number(&self) -> Option<String> {
        self.text("number")
    }
}

/// Renders scalars without JSON quoting, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Organization {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Half-open `[start, end)` fetch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn start_wire(&self) -> String {
        self.start.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn end_wire(&self) -> String {
        self.end.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub total: usize,
    pub no_client: usize,
    pub no_phone: usize,
    pub zero_sum: usize,
    pub unique_phone_count: usize,
    pub invalid: Vec<String>,
    pub invalid_count: usize,
    pub duplicates: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_order_takes_precedence() {
        let order = Order::new(json!({
            "customer": null,
            "order": {"customer": {"id": "c1"}, "phone": "+380501234567", "sum": 12.5}
        }));
        assert!(order.has_customer());
        assert_eq!(order.phone(), Some("+380501234567"));
        assert!(!order.is_zero_sum());
    }

    #[test]
    fn test_empty_nested_order_falls_back_to_record() {
        let order = Order::new(json!({"order": {}, "customer": {}, "phone": "+380671234567"}));
        assert!(order.has_customer());
        assert_eq!(order.phone(), Some("+380671234567"));
    }

    #[test]
    fn test_malformed_fields_are_absent() {
        let order = Order::new(json!({"customer": {}, "phone": 380501234567u64, "sum": "ten"}));
        assert_eq!(order.phone(), None);
        assert!(!order.is_zero_sum());

        let scalar = Order::new(json!(42));
        assert!(!scalar.has_customer());
        assert_eq!(scalar.number(), None);
    }

    #[test]
    fn test_falsy_customer_is_absent() {
        for customer in [json!(false), json!(""), json!(0), json!(null)] {
            let order = Order::new(json!({"customer": customer.clone(), "phone": "+380501234567"}));
            assert!(!order.has_customer(), "customer {customer} should be absent");
        }
        for customer in [json!({}), json!(true), json!("c-1"), json!(7)] {
            let order = Order::new(json!({"customer": customer.clone()}));
            assert!(order.has_customer(), "customer {customer} should be present");
        }
    }

    #[test]
    fn test_zero_sum_requires_numeric_zero() {
        assert!(Order::new(json!({})).is_zero_sum());
        assert!(Order::new(json!({"sum": null})).is_zero_sum());
        assert!(Order::new(json!({"sum": 0})).is_zero_sum());
        assert!(Order::new(json!({"sum": -0.0})).is_zero_sum());
        assert!(!Order::new(json!({"sum": "0"})).is_zero_sum());
        assert!(!Order::new(json!({"sum": "150.00"})).is_zero_sum());
    }

    #[test]
    fn test_organization_display_name() {
        let named = Organization { id: "org-1".into(), name: Some("Kyiv".into()) };
        let unnamed = Organization { id: "org-2".into(), name: None };
        assert_eq!(named.display_name(), "Kyiv");
        assert_eq!(unnamed.display_name(), "org-2");
    }
}
