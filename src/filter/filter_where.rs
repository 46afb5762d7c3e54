use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    fn new() -> Self {
        Self {
            param_values: vec![],
            param_index: 0,
            conditions: vec![],
        }
    }

    /// Turn a JSON condition object into an SQL predicate plus its
    /// positional parameters. An empty object produces an empty clause.
    pub fn generate(where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new();
        filter_where.build(where_data)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause(
                "WHERE must be an object".to_string(),
            )),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        self.parse_where_data(where_data)?;

        let mut sql_conditions = vec![];
        let conditions = std::mem::take(&mut self.conditions);
        for condition in &conditions {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), self.param_values.clone()))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Object(obj) => {
                for (key, value) in obj {
                    Self::validate_column(key)?;
                    self.parse_field_condition(key, value)?;
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause(
                "Unsupported WHERE format".to_string(),
            )),
        }
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                self.conditions.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator,
                    data: op_val.clone(),
                });
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            });
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$between" => FilterOp::Between,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Ne => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NOT NULL", quoted_column))
                } else {
                    Ok(format!("{} <> {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Gt => Ok(format!("{} > {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Gte => Ok(format!("{} >= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lt => Ok(format!("{} < {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lte => Ok(format!("{} <= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::ILike => Ok(format!("{} ILIKE {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::In => {
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() {
                        // No allowed values means no rows can match
                        return Ok("1=0".to_string());
                    }
                    let params: Vec<String> =
                        values.iter().map(|v| self.param(v.clone())).collect();
                    Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Between => {
                if let Value::Array(values) = &condition.data {
                    if values.len() != 2 {
                        return Err(FilterError::InvalidOperatorData(
                            "$between requires exactly 2 values".to_string(),
                        ));
                    }
                    Ok(format!(
                        "{} BETWEEN {} AND {}",
                        quoted_column,
                        self.param(values[0].clone()),
                        self.param(values[1].clone())
                    ))
                } else {
                    Err(FilterError::InvalidOperatorData(
                        "$between requires array with 2 values".to_string(),
                    ))
                }
            }
        }
    }

    fn validate_column(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(format!(
                "Invalid column name format: {}",
                name
            )))
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn implicit_equality() {
        let (sql, params) = FilterWhere::generate(&json!({ "name": "chair" })).unwrap();
        assert_eq!(sql, "\"name\" = $1");
        assert_eq!(params, vec![json!("chair")]);
    }

    #[test]
    fn between_expands_to_two_params() {
        let (sql, params) =
            FilterWhere::generate(&json!({ "price": { "$between": [10, 50] } })).unwrap();
        assert_eq!(sql, "\"price\" BETWEEN $1 AND $2");
        assert_eq!(params, vec![json!(10), json!(50)]);
    }

    #[test]
    fn in_list_expands_each_value() {
        let (sql, params) =
            FilterWhere::generate(&json!({ "category_id": { "$in": ["a", "b"] } })).unwrap();
        assert_eq!(sql, "\"category_id\" IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, params) =
            FilterWhere::generate(&json!({ "category_id": { "$in": [] } })).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn multiple_fields_join_with_and() {
        let (sql, _) = FilterWhere::generate(
            &json!({ "category_id": "c1", "id": { "$ne": "p1" } }),
        )
        .unwrap();
        assert_eq!(sql, "\"category_id\" = $1 AND \"id\" <> $2");
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = FilterWhere::generate(&json!({ "price": { "$regex": ".*" } }));
        assert!(matches!(err, Err(FilterError::UnsupportedOperator(_))));
    }

    #[test]
    fn rejects_malformed_between() {
        let err = FilterWhere::generate(&json!({ "price": { "$between": [10] } }));
        assert!(matches!(err, Err(FilterError::InvalidOperatorData(_))));
    }

    #[test]
    fn rejects_injection_in_column_name() {
        let err = FilterWhere::generate(&json!({ "name\"; DROP TABLE users; --": 1 }));
        assert!(matches!(err, Err(FilterError::InvalidColumn(_))));
    }
}
