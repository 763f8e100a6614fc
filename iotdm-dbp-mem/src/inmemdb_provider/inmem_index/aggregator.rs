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


//! Bucketing and metrics over documents.

use super::DocumentMatcher;
use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::query::Aggregation;
use iotdm_dbp::query::AggregationColumn;
use iotdm_dbp::query::AggregationData;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::GroupBy;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Key of one level of bucketing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum BucketKey {
    Int(i64),
    Text(String),
}

impl BucketKey {
    /// Derive the key of a document. Documents without a value for the
    /// grouped property are not part of any bucket.
    fn of(group_by: &GroupBy, document: &IndexDocument) -> Option<Self> {
        let value = document
            .get(group_by.get_property())
            .filter(|value| !value.is_null())?;
        match group_by {
            GroupBy::Property { .. } => Some(match value {
                Value::Number(number) if number.is_i64() => Self::Int(number.as_i64()?),
                Value::String(s) => Self::Text(s.to_owned()),
                other => Self::Text(other.to_string()),
            }),
            GroupBy::TimeInterval {
                interval_millis, ..
            } => {
                let ts = value.as_i64()?;
                let interval = std::cmp::max(1, *interval_millis);
                Some(Self::Int(ts.div_euclid(interval) * interval))
            }
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Int(value) => Value::from(value),
            Self::Text(value) => Value::from(value),
        }
    }
}

/// Bucketing and metrics over documents.
///
/// Buckets are ordered by key, ascending for property values and newest
/// first for time intervals.
pub struct Aggregator {}

impl Aggregator {
    /// Aggregate the documents according to the parameters.
    pub fn aggregate(
        documents: &[Arc<IndexDocument>],
        aggregation_param: &AggregationQueryParam,
    ) -> Vec<AggregationData> {
        let mut buckets: BTreeMap<Vec<BucketKey>, Vec<&IndexDocument>> = BTreeMap::new();
        for document in documents {
            let key = aggregation_param
                .group_by
                .iter()
                .map(|group_by| BucketKey::of(group_by, document))
                .collect::<Option<Vec<_>>>();
            if let Some(key) = key {
                buckets.entry(key).or_default().push(document.as_ref());
            }
        }
        if aggregation_param.group_by.is_empty() && buckets.is_empty() {
            // Metrics of an empty set
            buckets.insert(vec![], vec![]);
        }
        let mut buckets = buckets.into_iter().collect::<Vec<_>>();
        buckets.sort_by(|(a, _), (b, _)| Self::compare_keys(a, b, &aggregation_param.group_by));
        buckets
            .into_iter()
            .take(aggregation_param.limit)
            .map(|(key, documents)| {
                let mut aggregation_data = AggregationData::default();
                for (group_by, key) in aggregation_param.group_by.iter().zip(key) {
                    aggregation_data.put(group_by.get_alias(), key.into_value());
                }
                for column in &aggregation_param.agg_columns {
                    aggregation_data.put(column.get_alias(), Self::metric(column, &documents));
                }
                aggregation_data
            })
            .collect()
    }

    fn compare_keys(a: &[BucketKey], b: &[BucketKey], group_by: &[GroupBy]) -> Ordering {
        for ((a, b), group_by) in a.iter().zip(b).zip(group_by) {
            let ordering = match group_by {
                GroupBy::Property { .. } => a.cmp(b),
                GroupBy::TimeInterval { .. } => b.cmp(a),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn metric(column: &AggregationColumn, documents: &[&IndexDocument]) -> Value {
        let values = documents
            .iter()
            .filter_map(|document| document.get(&column.property))
            .filter(|value| !value.is_null());
        match column.aggregation {
            Aggregation::Count => Value::from(u64::try_from(values.count()).unwrap_or(u64::MAX)),
            Aggregation::DistinctCount => {
                let distinct = values.map(Value::to_string).collect::<HashSet<_>>();
                Value::from(u64::try_from(distinct.len()).unwrap_or(u64::MAX))
            }
            aggregation => {
                let numbers = values
                    .filter_map(DocumentMatcher::as_number)
                    .collect::<Vec<_>>();
                let sum = numbers.iter().sum::<f64>();
                match aggregation {
                    Aggregation::Sum => Value::from(sum),
                    _ if numbers.is_empty() => Value::Null,
                    Aggregation::Avg => Value::from(sum / numbers.len() as f64),
                    Aggregation::Max => Value::from(numbers.iter().copied().fold(f64::MIN, f64::max)),
                    _ => Value::from(numbers.iter().copied().fold(f64::MAX, f64::min)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn documents() -> Vec<Arc<IndexDocument>> {
        [
            json!({"id": "1", "targetType": "device", "level": 1, "alarmTime": 1_000}),
            json!({"id": "2", "targetType": "device", "level": 3, "alarmTime": 2_500}),
            json!({"id": "3", "targetType": "product", "level": 2, "alarmTime": 2_900}),
            json!({"id": "4", "level": 5, "alarmTime": 5_100}),
        ]
        .into_iter()
        .map(|value| Arc::new(value.as_object().unwrap().to_owned()))
        .collect()
    }

    #[test]
    fn test_group_by_property() {
        let param = AggregationQueryParam::new()
            .group_by_property("targetType", "type")
            .agg(Aggregation::Count, "id", "total")
            .agg(Aggregation::Max, "level", "maxLevel");
        let result = Aggregator::aggregate(&documents(), &param);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].get_str("type"), Some("device"));
        assert_eq!(result[0].get_i64("total"), Some(2));
        assert_eq!(result[0].get_i64("maxLevel"), Some(3));
        assert_eq!(result[1].get_str("type"), Some("product"));
        assert_eq!(result[1].get_i64("total"), Some(1));
    }

    #[test]
    fn test_group_by_time_newest_first_with_limit() {
        let param = AggregationQueryParam::new()
            .group_by_time("alarmTime", "time", 1_000)
            .agg(Aggregation::Sum, "level", "levels")
            .limit(2);
        let result = Aggregator::aggregate(&documents(), &param);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].get_i64("time"), Some(5_000));
        assert_eq!(result[0].get_f64("levels"), Some(5.0));
        assert_eq!(result[1].get_i64("time"), Some(2_000));
        assert_eq!(result[1].get_f64("levels"), Some(5.0));
    }

    #[test]
    fn test_without_group_by() {
        let param = AggregationQueryParam::new()
            .agg(Aggregation::Avg, "level", "avg")
            .agg(Aggregation::DistinctCount, "targetType", "types");
        let result = Aggregator::aggregate(&documents(), &param);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get_f64("avg"), Some(2.75));
        assert_eq!(result[0].get_i64("types"), Some(2));
        let result = Aggregator::aggregate(&[], &param);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get("avg"), Some(&Value::Null));
    }
}
