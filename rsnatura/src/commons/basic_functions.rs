use serde_json::Value;

/// Render an attribute value as a table cell.
///
/// Strings are written without quotes, missing values and nulls as an empty
/// cell, numbers and booleans in their JSON form.
pub fn attribute_to_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_to_cell() {
        assert_eq!(attribute_to_cell(None), "");
        assert_eq!(attribute_to_cell(Some(&Value::Null)), "");
        assert_eq!(attribute_to_cell(Some(&json!("Lough Derg"))), "Lough Derg");
        assert_eq!(attribute_to_cell(Some(&json!(1234.5))), "1234.5");
        assert_eq!(attribute_to_cell(Some(&json!(3))), "3");
    }
}
