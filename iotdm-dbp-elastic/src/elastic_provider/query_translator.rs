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


//! Translation of query parameters into Elasticsearch query DSL.

use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::index::IndexMetadata;
use iotdm_dbp::index::PropertyType;
use iotdm_dbp::query::Aggregation;
use iotdm_dbp::query::AggregationData;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::GroupBy;
use iotdm_dbp::query::QueryParam;
use iotdm_dbp::query::Sort;
use iotdm_dbp::query::SortOrder;
use iotdm_dbp::query::Term;
use iotdm_dbp::query::TermType;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Translation of query parameters into Elasticsearch query DSL.
pub struct QueryTranslator {}

impl QueryTranslator {
    /// Return the mappings of the declared properties.
    pub fn mappings(metadata: &IndexMetadata) -> Value {
        let properties = metadata
            .get_properties()
            .iter()
            .map(|property| {
                let mapping_type = match property.get_property_type() {
                    PropertyType::String => json!({ "type": "keyword" }),
                    PropertyType::Int => json!({ "type": "integer" }),
                    PropertyType::DateTime => json!({ "type": "date", "format": "epoch_millis" }),
                };
                (property.get_name().to_owned(), mapping_type)
            })
            .collect::<Map<_, _>>();
        json!({ "properties": properties })
    }

    /// Return the search request for the documents in `[from, from + size)`.
    pub fn search_request(query_param: &QueryParam, from: usize, size: usize) -> Value {
        json!({
            "query": Self::query(&query_param.terms, None),
            "sort": Self::sort(&query_param.sorts),
            "from": from,
            "size": size,
            "track_total_hits": true,
        })
    }

    /// Return the search request for the batch of documents following
    /// `search_after` within a point in time.
    ///
    /// The shard document order breaks ties, so consecutive batches neither
    /// skip nor repeat documents.
    pub fn search_after_request(
        query_param: &QueryParam,
        pit_id: &str,
        keep_alive: &str,
        search_after: Option<&Value>,
        size: usize,
    ) -> Value {
        let mut sort = Self::sort(&query_param.sorts);
        sort.push(json!({ "_shard_doc": "asc" }));
        let mut request = json!({
            "query": Self::query(&query_param.terms, None),
            "sort": sort,
            "size": size,
            "pit": { "id": pit_id, "keep_alive": keep_alive },
            "track_total_hits": false,
        });
        if let Some(search_after) = search_after {
            request["search_after"] = search_after.to_owned();
        }
        request
    }

    /// Extract the possibly renewed point in time identifier and the sort
    /// values of the last hit from a search response.
    pub fn search_after_cursor(response: &Value) -> (Option<String>, Option<Value>) {
        let pit_id = response
            .get("pit_id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let search_after = response
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .and_then(|hits| hits.last())
            .and_then(|hit| hit.get("sort"))
            .cloned();
        (pit_id, search_after)
    }

    /// Return the count request for all matching documents.
    pub fn count_request(query_param: &QueryParam) -> Value {
        json!({ "query": Self::query(&query_param.terms, None) })
    }

    /// Extract the total number of hits and the document sources from a
    /// search response.
    pub fn search_hits(response: &Value) -> (u64, Vec<IndexDocument>) {
        let total = response
            .pointer("/hits/total/value")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        let documents: Vec<IndexDocument> = response
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| hit.get("_source").and_then(Value::as_object))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        (total, documents)
    }

    /// Conjunction of all terms and the optional inclusive time range.
    fn query(terms: &[Term], time_range: Option<(&str, Option<i64>, Option<i64>)>) -> Value {
        let mut filter = Vec::new();
        let mut must_not = Vec::new();
        for term in terms {
            let column = term.column.as_str();
            match term.term_type {
                TermType::Eq => filter.push(json!({ "term": { column: term.value } })),
                TermType::Not => must_not.push(json!({ "term": { column: term.value } })),
                TermType::Gt => filter.push(json!({ "range": { column: { "gt": term.value } } })),
                TermType::Gte => filter.push(json!({ "range": { column: { "gte": term.value } } })),
                TermType::Lt => filter.push(json!({ "range": { column: { "lt": term.value } } })),
                TermType::Lte => filter.push(json!({ "range": { column: { "lte": term.value } } })),
                TermType::Like => filter.push(json!({
                    "wildcard": { column: { "value": Self::wildcard(&Self::as_text(&term.value)) } }
                })),
                TermType::In => filter.push(json!({ "terms": { column: term.values() } })),
                TermType::Nin => must_not.push(json!({ "terms": { column: term.values() } })),
                TermType::IsNull => must_not.push(json!({ "exists": { "field": column } })),
                TermType::NotNull => filter.push(json!({ "exists": { "field": column } })),
            }
        }
        if let Some((time_property, start_with_time, end_with_time)) = time_range {
            let mut range = Map::new();
            if let Some(start_with_time) = start_with_time {
                range.insert("gte".to_owned(), Value::from(start_with_time));
            }
            if let Some(end_with_time) = end_with_time {
                range.insert("lte".to_owned(), Value::from(end_with_time));
            }
            if !range.is_empty() {
                filter.push(json!({ "range": { time_property: range } }));
            }
        }
        if filter.is_empty() && must_not.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({ "bool": { "filter": filter, "must_not": must_not } })
        }
    }

    /// Documents missing a sorted value are placed last.
    fn sort(sorts: &[Sort]) -> Vec<Value> {
        sorts
            .iter()
            .map(|sort| {
                let order = match sort.order {
                    SortOrder::Asc => "asc",
                    SortOrder::Desc => "desc",
                };
                json!({
                    sort.name.as_str(): {
                        "order": order,
                        "missing": "_last",
                        "unmapped_type": "keyword",
                    }
                })
            })
            .collect()
    }

    fn as_text(value: &Value) -> String {
        match value {
            Value::String(text) => text.to_owned(),
            other => other.to_string(),
        }
    }

    /// Turn a `%` pattern into a wildcard pattern, escaping wildcard
    /// characters of the original pattern.
    fn wildcard(pattern: &str) -> String {
        let mut ret = String::with_capacity(pattern.len());
        for c in pattern.chars() {
            match c {
                '%' => ret.push('*'),
                '*' | '?' | '\\' => {
                    ret.push('\\');
                    ret.push(c);
                }
                c => ret.push(c),
            }
        }
        ret
    }

    /// Return the search request that aggregates matching documents.
    ///
    /// Each group-by adds one level of nested bucketing. Metrics are computed
    /// in the innermost level.
    pub fn aggregation_request(param: &AggregationQueryParam) -> Value {
        let metrics = param
            .agg_columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let metric_type = match column.aggregation {
                    Aggregation::Count => "value_count",
                    Aggregation::Sum => "sum",
                    Aggregation::Avg => "avg",
                    Aggregation::Max => "max",
                    Aggregation::Min => "min",
                    Aggregation::DistinctCount => "cardinality",
                };
                (
                    Self::metric_name(i),
                    json!({ metric_type: { "field": column.property } }),
                )
            })
            .collect::<Map<_, _>>();
        let aggs = param
            .group_by
            .iter()
            .enumerate()
            .rev()
            .fold(metrics, |inner, (level, group_by)| {
                let mut bucketing = match group_by {
                    GroupBy::Property { property, .. } => json!({
                        "terms": {
                            "field": property,
                            "size": param.limit,
                            "order": { "_key": "asc" },
                        }
                    }),
                    GroupBy::TimeInterval {
                        property,
                        interval_millis,
                        ..
                    } => json!({
                        "date_histogram": {
                            "field": property,
                            "fixed_interval": format!("{}ms", std::cmp::max(1, *interval_millis)),
                            "min_doc_count": 1,
                            "order": { "_key": "desc" },
                        }
                    }),
                };
                if !inner.is_empty()
                    && let Some(bucketing) = bucketing.as_object_mut()
                {
                    bucketing.insert("aggs".to_owned(), Value::Object(inner));
                }
                let mut outer = Map::new();
                outer.insert(Self::group_name(level), bucketing);
                outer
            });
        let time_range = (
            param.time_property.as_str(),
            param.start_with_time,
            param.end_with_time,
        );
        json!({
            "query": Self::query(&param.query_param.terms, Some(time_range)),
            "size": 0,
            "aggs": aggs,
        })
    }

    /// Flatten the nested buckets of an aggregation response into rows.
    pub fn aggregation_rows(
        param: &AggregationQueryParam,
        response: &Value,
    ) -> Result<Vec<AggregationData>, PlatformError> {
        let empty = Value::Object(Map::new());
        let aggregations = response.get("aggregations").unwrap_or(&empty);
        let mut rows = Vec::new();
        Self::collect_rows(param, 0, aggregations, AggregationData::default(), &mut rows)?;
        rows.truncate(param.limit);
        Ok(rows)
    }

    fn collect_rows(
        param: &AggregationQueryParam,
        level: usize,
        aggregations: &Value,
        row: AggregationData,
        rows: &mut Vec<AggregationData>,
    ) -> Result<(), PlatformError> {
        let Some(group_by) = param.group_by.get(level) else {
            let mut row = row;
            for (i, column) in param.agg_columns.iter().enumerate() {
                let value = aggregations
                    .get(Self::metric_name(i))
                    .and_then(|metric| metric.get("value"))
                    .cloned()
                    .unwrap_or_default();
                let value = match column.aggregation {
                    Aggregation::Count | Aggregation::DistinctCount => {
                        Value::from(value.as_f64().map_or(0, |count| count as u64))
                    }
                    Aggregation::Sum => Value::from(value.as_f64().unwrap_or_default()),
                    _ => value,
                };
                row.put(column.get_alias(), value);
            }
            rows.push(row);
            return Ok(());
        };
        let Some(buckets) = aggregations.get(Self::group_name(level)) else {
            // Missing index
            return Ok(());
        };
        let buckets = buckets
            .get("buckets")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                PlatformErrorKind::IndexOperationFailed
                    .error_with_msg(format!("Aggregation '{}' has no buckets.", group_by.get_alias()))
            })?;
        for bucket in buckets {
            let mut row = row.clone();
            row.put(
                group_by.get_alias(),
                bucket.get("key").cloned().unwrap_or_default(),
            );
            Self::collect_rows(param, level + 1, bucket, row, rows)?;
        }
        Ok(())
    }

    fn group_name(level: usize) -> String {
        format!("group_{level}")
    }

    fn metric_name(i: usize) -> String {
        format!("metric_{i}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mappings() {
        let metadata = IndexMetadata::new("alarm_history")
            .add_property("id", PropertyType::String)
            .add_property("level", PropertyType::Int)
            .add_property("alarmTime", PropertyType::DateTime);
        assert_eq!(
            QueryTranslator::mappings(&metadata),
            json!({
                "properties": {
                    "id": { "type": "keyword" },
                    "level": { "type": "integer" },
                    "alarmTime": { "type": "date", "format": "epoch_millis" },
                }
            })
        );
    }

    #[test]
    fn test_search_request() {
        let query_param = QueryParam::new()
            .where_eq("targetId", "d1")
            .and("level", TermType::Gte, 2)
            .and("targetType", TermType::Nin, "product,user")
            .and("alarmInfo", TermType::Like, "%over*heat%")
            .and("creatorId", TermType::IsNull, Value::Null)
            .order_by("alarmTime", SortOrder::Desc)
            .page(2, 10);
        let request = QueryTranslator::search_request(&query_param, query_param.first_index(), 10);
        assert_eq!(
            request,
            json!({
                "query": { "bool": {
                    "filter": [
                        { "term": { "targetId": "d1" } },
                        { "range": { "level": { "gte": 2 } } },
                        { "wildcard": { "alarmInfo": { "value": "*over\\*heat*" } } },
                    ],
                    "must_not": [
                        { "terms": { "targetType": ["product", "user"] } },
                        { "exists": { "field": "creatorId" } },
                    ],
                } },
                "sort": [
                    { "alarmTime": { "order": "desc", "missing": "_last", "unmapped_type": "keyword" } },
                ],
                "from": 20,
                "size": 10,
                "track_total_hits": true,
            })
        );
        assert_eq!(
            QueryTranslator::count_request(&QueryParam::new()),
            json!({ "query": { "match_all": {} } })
        );
    }

    #[test]
    fn test_search_after_request() {
        let query_param = QueryParam::new()
            .where_eq("targetId", "d1")
            .order_by("alarmTime", SortOrder::Desc);
        let first = QueryTranslator::search_after_request(&query_param, "pit-1", "1m", None, 500);
        assert_eq!(first["pit"], json!({ "id": "pit-1", "keep_alive": "1m" }));
        assert_eq!(first["size"], json!(500));
        assert!(first.get("from").is_none());
        assert!(first.get("search_after").is_none());
        let sort = first["sort"].as_array().unwrap();
        assert_eq!(sort.len(), 2);
        assert_eq!(sort[1], json!({ "_shard_doc": "asc" }));
        let unsorted =
            QueryTranslator::search_after_request(&QueryParam::new(), "pit-1", "1m", None, 500);
        assert_eq!(unsorted["sort"], json!([{ "_shard_doc": "asc" }]));
        let response = json!({
            "pit_id": "pit-2",
            "hits": { "hits": [
                { "_source": { "id": "a1" }, "sort": [1_700_000_000_001_i64, 7] },
                { "_source": { "id": "a2" }, "sort": [1_700_000_000_000_i64, 9] }
            ]}
        });
        let (pit_id, search_after) = QueryTranslator::search_after_cursor(&response);
        assert_eq!(pit_id.as_deref(), Some("pit-2"));
        let next = QueryTranslator::search_after_request(
            &query_param,
            "pit-2",
            "1m",
            search_after.as_ref(),
            500,
        );
        assert_eq!(next["search_after"], json!([1_700_000_000_000_i64, 9]));
    }

    #[test]
    fn test_search_hits() {
        let response = json!({
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    { "_id": "a1", "_source": { "id": "a1", "level": 2 } },
                    { "_id": "a2", "_source": { "id": "a2", "level": 3 } },
                ]
            }
        });
        let (total, documents) = QueryTranslator::search_hits(&response);
        assert_eq!(total, 42);
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].get("level"), Some(&json!(3)));
    }

    #[test]
    fn test_nested_aggregation() {
        let param = AggregationQueryParam::new()
            .group_by_property("targetType", "type")
            .group_by_time("alarmTime", "time", 60_000)
            .agg(Aggregation::Count, "id", "total")
            .agg(Aggregation::Avg, "level", "avgLevel")
            .time_range("alarmTime", Some(0), None)
            .limit(3);
        let request = QueryTranslator::aggregation_request(&param);
        assert_eq!(
            request,
            json!({
                "query": { "bool": {
                    "filter": [ { "range": { "alarmTime": { "gte": 0 } } } ],
                    "must_not": [],
                } },
                "size": 0,
                "aggs": { "group_0": {
                    "terms": { "field": "targetType", "size": 3, "order": { "_key": "asc" } },
                    "aggs": { "group_1": {
                        "date_histogram": {
                            "field": "alarmTime",
                            "fixed_interval": "60000ms",
                            "min_doc_count": 1,
                            "order": { "_key": "desc" },
                        },
                        "aggs": {
                            "metric_0": { "value_count": { "field": "id" } },
                            "metric_1": { "avg": { "field": "level" } },
                        },
                    } },
                } },
            })
        );
        let response = json!({
            "aggregations": { "group_0": { "buckets": [
                { "key": "device", "doc_count": 3, "group_1": { "buckets": [
                    { "key": 120_000, "doc_count": 1, "metric_0": { "value": 1 }, "metric_1": { "value": 4.0 } },
                    { "key": 60_000, "doc_count": 2, "metric_0": { "value": 2 }, "metric_1": { "value": 1.5 } },
                ] } },
                { "key": "product", "doc_count": 2, "group_1": { "buckets": [
                    { "key": 0, "doc_count": 2, "metric_0": { "value": 2 }, "metric_1": { "value": null } },
                    { "key": 60_000, "doc_count": 1, "metric_0": { "value": 1 }, "metric_1": { "value": 2.0 } },
                ] } },
            ] } }
        });
        let rows = QueryTranslator::aggregation_rows(&param, &response).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get_str("type"), Some("device"));
        assert_eq!(rows[0].get_i64("time"), Some(120_000));
        assert_eq!(rows[0].get_i64("total"), Some(1));
        assert_eq!(rows[1].get_f64("avgLevel"), Some(1.5));
        assert_eq!(rows[2].get_str("type"), Some("product"));
        assert_eq!(rows[2].get("avgLevel"), Some(&Value::Null));
    }

    #[test]
    fn test_ungrouped_aggregation_of_missing_index() {
        let param = AggregationQueryParam::new()
            .agg(Aggregation::Count, "id", "total")
            .agg(Aggregation::Max, "level", "maxLevel");
        let rows = QueryTranslator::aggregation_rows(&param, &json!({})).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("total"), Some(0));
        assert_eq!(rows[0].get("maxLevel"), Some(&Value::Null));
    }
}
