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


//! Evaluation of filter terms and sorts against documents.

use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::query::Sort;
use iotdm_dbp::query::SortOrder;
use iotdm_dbp::query::Term;
use iotdm_dbp::query::TermType;
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluation of filter terms and sorts against documents.
pub struct DocumentMatcher {}

impl DocumentMatcher {
    /// Return `true` if the document satisfies every term.
    pub fn matches_all(document: &IndexDocument, terms: &[Term]) -> bool {
        terms.iter().all(|term| Self::matches(document, term))
    }

    /// Return `true` if the document satisfies the term.
    pub fn matches(document: &IndexDocument, term: &Term) -> bool {
        let value = document
            .get(&term.column)
            .filter(|value| !value.is_null());
        match term.term_type {
            TermType::IsNull => value.is_none(),
            TermType::NotNull => value.is_some(),
            TermType::Eq => value.is_some_and(|value| Self::equals(value, &term.value)),
            TermType::Not => !value.is_some_and(|value| Self::equals(value, &term.value)),
            TermType::Gt => Self::compare_to(value, &term.value, |o| o == Ordering::Greater),
            TermType::Gte => Self::compare_to(value, &term.value, |o| o != Ordering::Less),
            TermType::Lt => Self::compare_to(value, &term.value, |o| o == Ordering::Less),
            TermType::Lte => Self::compare_to(value, &term.value, |o| o != Ordering::Greater),
            TermType::Like => value
                .and_then(Value::as_str)
                .zip(term.value.as_str())
                .is_some_and(|(text, pattern)| Self::like(text, pattern)),
            TermType::In => value.is_some_and(|value| {
                term.values()
                    .iter()
                    .any(|candidate| Self::equals(value, candidate))
            }),
            TermType::Nin => !value.is_some_and(|value| {
                term.values()
                    .iter()
                    .any(|candidate| Self::equals(value, candidate))
            }),
        }
    }

    /// Return `true` if the document's time property is within the inclusive
    /// range. Documents without the property are only within an open range.
    pub fn within_time_range(
        document: &IndexDocument,
        time_property: &str,
        start_with_time: Option<i64>,
        end_with_time: Option<i64>,
    ) -> bool {
        if start_with_time.is_none() && end_with_time.is_none() {
            return true;
        }
        document
            .get(time_property)
            .and_then(Value::as_i64)
            .is_some_and(|ts| {
                start_with_time.is_none_or(|start| ts >= start)
                    && end_with_time.is_none_or(|end| ts <= end)
            })
    }

    /// Compare two documents by the sorts in order of declaration.
    ///
    /// Documents missing a sorted value are placed last.
    pub fn compare(a: &IndexDocument, b: &IndexDocument, sorts: &[Sort]) -> Ordering {
        for sort in sorts {
            let a = a.get(&sort.name).filter(|value| !value.is_null());
            let b = b.get(&sort.name).filter(|value| !value.is_null());
            let ordering = match (a, b) {
                (Some(a), Some(b)) => {
                    let ordering = Self::sort_order(a, b);
                    match sort.order {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Compare two values.
    ///
    /// Numbers compare numerically, also with Strings holding a number.
    /// Other values of the same kind compare naturally. Returns `None` when
    /// the values are not comparable.
    pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => Self::as_number(a)
                .zip(Self::as_number(b))
                .and_then(|(a, b)| a.partial_cmp(&b)),
        }
    }

    /// Total order of values for sorting.
    ///
    /// Values of different kinds order booleans, numbers, strings and then
    /// the rest. A string holding a number is still a string here.
    fn sort_order(a: &Value, b: &Value) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            }
        }
        match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a
                .as_f64()
                .unwrap_or_default()
                .total_cmp(&b.as_f64().unwrap_or_default()),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (a, b) if rank(a) == rank(b) => a.to_string().cmp(&b.to_string()),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }

    fn compare_to<F: Fn(Ordering) -> bool>(value: Option<&Value>, other: &Value, accept: F) -> bool {
        value
            .and_then(|value| Self::compare_values(value, other))
            .is_some_and(accept)
    }

    fn equals(value: &Value, other: &Value) -> bool {
        value == other || Self::compare_values(value, other) == Some(Ordering::Equal)
    }

    /// Return the numeric value of a number or a String holding a number.
    pub fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// SQL style pattern match where `%` matches any sequence of characters.
    fn like(text: &str, pattern: &str) -> bool {
        let parts = pattern.split('%').collect::<Vec<_>>();
        if parts.len() == 1 {
            return text == pattern;
        }
        let (first, rest) = (parts[0], &parts[1..]);
        let Some(mut remaining) = text.strip_prefix(first) else {
            return false;
        };
        let Some((last, middle)) = rest.split_last() else {
            return false;
        };
        for part in middle {
            match remaining.find(*part) {
                Some(pos) => remaining = &remaining[pos + part.len()..],
                None => return false,
            }
        }
        remaining.ends_with(*last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> IndexDocument {
        value.as_object().unwrap().to_owned()
    }

    #[test]
    fn test_comparisons() {
        let doc = document(json!({"level": 2, "targetId": "d1", "alarmTime": 1000}));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::Eq, json!(2))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::Eq, json!("2"))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::Gt, json!(1))));
        assert!(!DocumentMatcher::matches(&doc, &Term::new("level", TermType::Lt, json!(2))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::Lte, json!(2))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("targetId", TermType::Not, json!("d2"))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("missing", TermType::Not, json!("d2"))));
        assert!(!DocumentMatcher::matches(&doc, &Term::new("missing", TermType::Gt, json!(0))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("missing", TermType::IsNull, Value::Null)));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::NotNull, Value::Null)));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::In, json!("1,2,3"))));
        assert!(DocumentMatcher::matches(&doc, &Term::new("level", TermType::Nin, json!([1, 3]))));
    }

    #[test]
    fn test_like() {
        assert!(DocumentMatcher::like("temperature-high", "temp%"));
        assert!(DocumentMatcher::like("temperature-high", "%high"));
        assert!(DocumentMatcher::like("temperature-high", "%ure%hi%"));
        assert!(DocumentMatcher::like("temperature-high", "%"));
        assert!(DocumentMatcher::like("abc", "abc"));
        assert!(!DocumentMatcher::like("abc", "ab"));
        assert!(!DocumentMatcher::like("abc", "%d%"));
        assert!(!DocumentMatcher::like("ab", "ab%b"));
    }

    #[test]
    fn test_time_range() {
        let doc = document(json!({"alarmTime": 1000}));
        assert!(DocumentMatcher::within_time_range(&doc, "alarmTime", Some(1000), Some(1000)));
        assert!(!DocumentMatcher::within_time_range(&doc, "alarmTime", Some(1001), None));
        assert!(!DocumentMatcher::within_time_range(&doc, "timestamp", Some(0), None));
        assert!(DocumentMatcher::within_time_range(&doc, "timestamp", None, None));
    }

    #[test]
    fn test_compare_missing_last() {
        let a = document(json!({"level": 1}));
        let b = document(json!({}));
        let sorts = [Sort::new("level", SortOrder::Desc)];
        assert_eq!(DocumentMatcher::compare(&a, &b, &sorts), Ordering::Less);
        assert_eq!(DocumentMatcher::compare(&b, &a, &sorts), Ordering::Greater);
    }

    #[test]
    fn test_sort_mixed_kinds_is_total() {
        let mut documents = [json!("10"), json!(9.5), json!("9"), json!(2), json!("abc")]
            .into_iter()
            .map(|value| document(json!({ "value": value })))
            .collect::<Vec<_>>();
        let sorts = [Sort::new("value", SortOrder::Asc)];
        documents.sort_by(|a, b| DocumentMatcher::compare(a, b, &sorts));
        let sorted = documents
            .iter()
            .map(|document| document["value"].clone())
            .collect::<Vec<_>>();
        assert_eq!(
            sorted,
            vec![json!(2), json!(9.5), json!("10"), json!("9"), json!("abc")]
        );
    }
}
