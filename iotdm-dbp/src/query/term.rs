/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/


//! A single filter condition.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Comparison applied by a [Term].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    /// Equal to the value.
    #[default]
    Eq,
    /// Not equal to the value.
    Not,
    /// Greater than the value.
    Gt,
    /// Greater than or equal to the value.
    Gte,
    /// Less than the value.
    Lt,
    /// Less than or equal to the value.
    Lte,
    /// Text pattern where `%` matches any sequence of characters.
    Like,
    /// Equal to any of the values. The value is an array or a comma separated
    /// String.
    In,
    /// Equal to none of the values.
    Nin,
    /// The column has no value.
    IsNull,
    /// The column has a value.
    NotNull,
}

/// A filter condition on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Name of the filtered column.
    pub column: String,
    /// Comparison to apply.
    #[serde(default)]
    pub term_type: TermType,
    /// Value to compare with.
    #[serde(default)]
    pub value: Value,
}

impl Term {
    /// Return a new instance.
    pub fn new(column: &str, term_type: TermType, value: Value) -> Self {
        Self {
            column: column.to_owned(),
            term_type,
            value,
        }
    }

    /// Return the term value as a list of values for `in` and `nin`.
    pub fn values(&self) -> Vec<Value> {
        match &self.value {
            Value::Array(values) => values.to_owned(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_owned()))
                .collect(),
            Value::Null => vec![],
            other => vec![other.to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values() {
        let term = Term::new("level", TermType::In, json!([1, 2]));
        assert_eq!(term.values(), vec![json!(1), json!(2)]);
        let term = Term::new("targetType", TermType::In, json!("device, product"));
        assert_eq!(term.values(), vec![json!("device"), json!("product")]);
        let term = Term::new("targetType", TermType::In, Value::Null);
        assert!(term.values().is_empty());
    }
}
