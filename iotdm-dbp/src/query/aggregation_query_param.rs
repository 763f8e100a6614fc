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


//! Aggregation request.

use super::QueryParam;
use serde::Deserialize;
use serde::Serialize;

/// Metric computed for each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Number of documents with a value for the property.
    Count,
    /// Sum of numeric values.
    Sum,
    /// Average of numeric values.
    Avg,
    /// Largest numeric value.
    Max,
    /// Smallest numeric value.
    Min,
    /// Number of distinct values.
    DistinctCount,
}

/// A metric to compute and the name to report it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationColumn {
    /// Source property.
    pub property: String,
    /// Name of the metric in the result. Defaults to the property name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Metric type.
    pub aggregation: Aggregation,
}

impl AggregationColumn {
    /// Name of the metric in the result.
    pub fn get_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.property)
    }
}

/// Bucketing of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GroupBy {
    /// One bucket per distinct property value.
    Property {
        /// Source property.
        property: String,
        /// Name of the bucket key in the result.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    /// One bucket per fixed time interval of an epoch millisecond property.
    TimeInterval {
        /// Source property.
        property: String,
        /// Name of the bucket key in the result.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        /// Bucket width.
        interval_millis: i64,
    },
}

impl GroupBy {
    /// Source property.
    pub fn get_property(&self) -> &str {
        match self {
            Self::Property { property, .. } | Self::TimeInterval { property, .. } => property,
        }
    }

    /// Name of the bucket key in the result. Defaults to the property name.
    pub fn get_alias(&self) -> &str {
        match self {
            Self::Property { property, alias } | Self::TimeInterval { property, alias, .. } => {
                alias.as_deref().unwrap_or(property)
            }
        }
    }
}

/// Aggregation request.
///
/// Documents are filtered by the embedded [QueryParam] (paging is ignored)
/// and the optional time range on [Self::time_property], grouped by
/// [Self::group_by] and summarized by [Self::agg_columns]. At most
/// [Self::limit] buckets are returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationQueryParam {
    /// Metrics to compute per bucket.
    #[serde(default)]
    pub agg_columns: Vec<AggregationColumn>,
    /// Bucketing, outermost first.
    #[serde(default)]
    pub group_by: Vec<GroupBy>,
    /// Filter.
    #[serde(default)]
    pub query_param: QueryParam,
    /// Epoch millisecond property used by the time range.
    #[serde(default = "AggregationQueryParam::default_time_property")]
    pub time_property: String,
    /// Inclusive lower bound of the time range in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_with_time: Option<i64>,
    /// Inclusive upper bound of the time range in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_with_time: Option<i64>,
    /// Maximum number of buckets.
    #[serde(default = "AggregationQueryParam::default_limit")]
    pub limit: usize,
}

impl Default for AggregationQueryParam {
    fn default() -> Self {
        Self {
            agg_columns: Vec::new(),
            group_by: Vec::new(),
            query_param: QueryParam::default(),
            time_property: Self::default_time_property(),
            start_with_time: None,
            end_with_time: None,
            limit: Self::default_limit(),
        }
    }
}

impl AggregationQueryParam {
    fn default_time_property() -> String {
        "timestamp".to_owned()
    }

    fn default_limit() -> usize {
        100
    }

    /// Return a new instance without metrics or grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this instance with an additional metric.
    pub fn agg(mut self, aggregation: Aggregation, property: &str, alias: &str) -> Self {
        self.agg_columns.push(AggregationColumn {
            property: property.to_owned(),
            alias: Some(alias.to_owned()),
            aggregation,
        });
        self
    }

    /// Return this instance with additional bucketing by property value.
    pub fn group_by_property(mut self, property: &str, alias: &str) -> Self {
        self.group_by.push(GroupBy::Property {
            property: property.to_owned(),
            alias: Some(alias.to_owned()),
        });
        self
    }

    /// Return this instance with additional bucketing by time interval.
    pub fn group_by_time(mut self, property: &str, alias: &str, interval_millis: i64) -> Self {
        self.group_by.push(GroupBy::TimeInterval {
            property: property.to_owned(),
            alias: Some(alias.to_owned()),
            interval_millis,
        });
        self
    }

    /// Return this instance with the filter set.
    pub fn filter(mut self, query_param: QueryParam) -> Self {
        self.query_param = query_param;
        self
    }

    /// Return this instance with the time range set on `time_property`.
    pub fn time_range(
        mut self,
        time_property: &str,
        start_with_time: Option<i64>,
        end_with_time: Option<i64>,
    ) -> Self {
        self.time_property = time_property.to_owned();
        self.start_with_time = start_with_time;
        self.end_with_time = end_with_time;
        self
    }

    /// Return this instance with the bucket limit set.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_group_by() {
        let param: AggregationQueryParam = serde_json::from_str(
            r#"{
                "aggColumns": [{"property": "id", "alias": "total", "aggregation": "count"}],
                "groupBy": [
                    {"type": "property", "property": "targetType"},
                    {"type": "time_interval", "property": "alarmTime", "alias": "day", "intervalMillis": 86400000}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(param.limit, 100);
        assert_eq!(param.time_property, "timestamp");
        assert_eq!(param.agg_columns[0].get_alias(), "total");
        assert_eq!(param.group_by[0].get_alias(), "targetType");
        assert_eq!(
            param.group_by[1],
            GroupBy::TimeInterval {
                property: "alarmTime".to_owned(),
                alias: Some("day".to_owned()),
                interval_millis: 86_400_000,
            }
        );
    }
}
