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


//! Ephemeral in-memory search index.

mod aggregator;
mod document_matcher;

use self::aggregator::Aggregator;
use self::document_matcher::DocumentMatcher;
use crossbeam_skiplist::SkipMap;
use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::query::AggregationData;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::PagerResult;
use iotdm_dbp::query::QueryParam;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Ephemeral in-memory search index.
///
/// Documents are kept in insertion order. A document with a non-empty `id`
/// replaces the earlier document with the same `id`.
#[derive(Default)]
pub struct InMemIndex {
    documents: SkipMap<u64, Arc<IndexDocument>>,
    sequence_by_id: SkipMap<String, u64>,
    next_sequence: AtomicU64,
    replace_lock: Mutex<()>,
}

impl InMemIndex {
    /// Persist a document.
    pub fn document_save(&self, document: IndexDocument) {
        let id = document
            .get("id")
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        let Some(id) = id else {
            let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
            self.documents.insert(sequence, Arc::new(document));
            return;
        };
        // Lookup and replacement of an identified document must not interleave
        let _guard = self
            .replace_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        if let Some(previous) = self.sequence_by_id.get(&id) {
            self.documents.remove(previous.value());
        }
        self.sequence_by_id.insert(id, sequence);
        self.documents.insert(sequence, Arc::new(document));
    }

    /// Return all matching documents in requested order.
    pub fn documents_matching(&self, query_param: &QueryParam) -> Vec<Arc<IndexDocument>> {
        let mut matching = self
            .documents
            .iter()
            .filter(|entry| DocumentMatcher::matches_all(entry.value(), &query_param.terms))
            .map(|entry| Arc::clone(entry.value()))
            .collect::<Vec<_>>();
        if !query_param.sorts.is_empty() {
            // Stable sort keeps insertion order between equal documents
            matching.sort_by(|a, b| DocumentMatcher::compare(a, b, &query_param.sorts));
        }
        matching
    }

    /// Return the requested page of matching documents.
    pub fn documents_page(&self, query_param: &QueryParam) -> PagerResult<IndexDocument> {
        let matching = self.documents_matching(query_param);
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let data = matching
            .into_iter()
            .skip(query_param.first_index())
            .take(query_param.page_size)
            .map(|document| document.as_ref().to_owned())
            .collect();
        PagerResult::new(
            query_param.page_index,
            query_param.page_size,
            total,
            data,
        )
    }

    /// Return the number of matching documents.
    pub fn documents_count(&self, query_param: &QueryParam) -> u64 {
        let count = self
            .documents
            .iter()
            .filter(|entry| DocumentMatcher::matches_all(entry.value(), &query_param.terms))
            .count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    /// Aggregate matching documents into buckets.
    pub fn documents_aggregate(
        &self,
        aggregation_param: &AggregationQueryParam,
    ) -> Vec<AggregationData> {
        let matching = self
            .documents_matching(&aggregation_param.query_param)
            .into_iter()
            .filter(|document| {
                DocumentMatcher::within_time_range(
                    document,
                    &aggregation_param.time_property,
                    aggregation_param.start_with_time,
                    aggregation_param.end_with_time,
                )
            })
            .collect::<Vec<_>>();
        Aggregator::aggregate(&matching, aggregation_param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotdm_dbp::query::SortOrder;
    use iotdm_dbp::query::TermType;
    use serde_json::json;

    fn document(value: serde_json::Value) -> IndexDocument {
        value.as_object().unwrap().to_owned()
    }

    #[test]
    fn test_same_id_replaces_document() {
        let index = InMemIndex::default();
        index.document_save(document(json!({"id": "a", "level": 1})));
        index.document_save(document(json!({"id": "b", "level": 1})));
        index.document_save(document(json!({"id": "a", "level": 3})));
        index.document_save(document(json!({"level": 5})));
        assert_eq!(index.documents_count(&QueryParam::new()), 3);
        let levels = index
            .documents_matching(&QueryParam::new())
            .iter()
            .map(|document| document["level"].as_i64().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![1, 3, 5]);
    }

    #[test]
    fn test_empty_id_is_no_identity() {
        let index = InMemIndex::default();
        index.document_save(document(json!({"id": "", "level": 1})));
        index.document_save(document(json!({"id": "", "level": 2})));
        assert_eq!(index.documents_count(&QueryParam::new()), 2);
    }

    #[test]
    fn test_concurrent_same_id_saves_keep_one_document() {
        let index = Arc::new(InMemIndex::default());
        for _round in 0..50 {
            let handles = (0..8)
                .map(|level| {
                    let index = Arc::clone(&index);
                    std::thread::spawn(move || {
                        index.document_save(document(json!({"id": "a1", "level": level})));
                    })
                })
                .collect::<Vec<_>>();
            for handle in handles {
                handle.join().unwrap();
            }
            let query_param = QueryParam::new().and("id", TermType::Eq, "a1");
            assert_eq!(index.documents_count(&query_param), 1);
        }
    }

    #[test]
    fn test_page_and_sort() {
        let index = InMemIndex::default();
        for level in 0..7 {
            index.document_save(document(json!({"id": format!("r{level}"), "level": level})));
        }
        let query_param = QueryParam::new()
            .and("level", TermType::Gte, 1)
            .order_by("level", SortOrder::Desc)
            .page(1, 4);
        let page = index.documents_page(&query_param);
        assert_eq!(page.total, 6);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0]["level"], json!(2));
        assert_eq!(page.data[1]["level"], json!(1));
        assert_eq!(
            index.documents_count(&query_param),
            u64::try_from(index.documents_matching(&query_param).len()).unwrap()
        );
    }
}
