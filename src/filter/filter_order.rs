use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse an order spec of the form `{ "price": "desc", "name": "asc" }`.
    /// Unknown directions default to ascending; anything that is not an
    /// object sorts nothing.
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let Value::Object(obj) = order else {
            return Ok(vec![]);
        };
        Ok(obj
            .iter()
            .map(|(column, direction)| FilterOrderInfo {
                column: column.clone(),
                sort: SortDirection::parse(direction.as_str().unwrap_or("asc")),
            })
            .collect())
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_object_form() {
        let infos = FilterOrder::validate_and_parse(&json!({ "price": "desc" })).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].column, "price");
        assert_eq!(infos[0].sort, SortDirection::Desc);
    }

    #[test]
    fn unknown_direction_defaults_to_ascending() {
        let infos = FilterOrder::validate_and_parse(&json!({ "name": "sideways" })).unwrap();
        assert_eq!(infos[0].sort, SortDirection::Asc);
    }

    #[test]
    fn non_object_sorts_nothing() {
        assert!(FilterOrder::validate_and_parse(&json!(null)).unwrap().is_empty());
        assert!(FilterOrder::validate_and_parse(&json!(42)).unwrap().is_empty());
    }

    #[test]
    fn generates_order_by_clause() {
        let infos = FilterOrder::validate_and_parse(&json!({ "created_at": "desc" })).unwrap();
        assert_eq!(
            FilterOrder::generate(&infos).unwrap(),
            "ORDER BY \"created_at\" DESC"
        );
    }
}
