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


//! Elasticsearch implementation of [DatabaseProvider].

mod elastic_client;
mod elastic_facades;
mod query_translator;

use self::elastic_client::ElasticClient;
use self::elastic_facades::ElasticProviderFacades;
use self::query_translator::QueryTranslator;
use futures::StreamExt;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::dbp::DatabaseProvider;
use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::index::IndexMetadata;
use iotdm_dbp::index::PropertyType;
use iotdm_dbp::query::QueryParam;
use serde_json::Value;
use std::sync::Arc;

/// Elasticsearch [DatabaseProvider] implementation.
pub struct ElasticSearchProvider {
    /// Connection to Elasticsearch.
    client: ElasticClient,
    /// Prefix of all index names.
    index_prefix: String,
}

impl ElasticSearchProvider {
    /// Index of the product catalog.
    const PRODUCT_INDEX: &'static str = "device_product";
    /// Index of live device registry entries.
    const REGISTRY_INDEX: &'static str = "device_registry";
    /// Number of documents fetched per request when streaming results.
    const QUERY_BATCH_SIZE: usize = 500;
    /// Time a point in time is kept between consecutive batches.
    const POINT_IN_TIME_KEEP_ALIVE: &'static str = "1m";

    /// Return a new instance.
    ///
    /// The product catalog and device registry indices are created if they
    /// don't exist.
    pub async fn new(
        endpoints: &[String],
        username: &str,
        password: &str,
        index_prefix: &str,
    ) -> Result<Arc<Self>, PlatformError> {
        let client = ElasticClient::new(endpoints, username, password)?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Using Elasticsearch db provider with endpoints {endpoints:?} and index prefix '{index_prefix}'."
            );
        }
        Arc::new(Self {
            client,
            index_prefix: index_prefix.to_owned(),
        })
        .init()
        .await
    }

    /// Initialize
    async fn init(self: Arc<Self>) -> Result<Arc<Self>, PlatformError> {
        let product_metadata = IndexMetadata::new(Self::PRODUCT_INDEX)
            .add_property("id", PropertyType::String)
            .add_property("name", PropertyType::String)
            .add_property("description", PropertyType::String)
            .add_property("classifiedId", PropertyType::String);
        let registry_metadata = IndexMetadata::new(Self::REGISTRY_INDEX)
            .add_property("productId", PropertyType::String);
        for metadata in [product_metadata, registry_metadata] {
            self.index_ensure(&metadata).await.map_err(|e| {
                PlatformErrorKind::BackendOperationFailed.error_with_msg(format!(
                    "Failed to prepare index '{}': {e}",
                    metadata.get_index()
                ))
            })?;
        }
        Ok(self)
    }

    /// Get [DatabaseProvider] instance.
    pub fn as_database_provider(self: &Arc<Self>) -> DatabaseProvider {
        DatabaseProvider::new(Arc::new(ElasticProviderFacades::new(self)))
    }

    /// Return the backend name of an index.
    fn index_name(&self, index: &str) -> String {
        format!("{}{index}", self.index_prefix)
    }

    /// Create the index or add any new property mappings.
    async fn index_ensure(&self, metadata: &IndexMetadata) -> Result<(), PlatformError> {
        let index = self.index_name(metadata.get_index());
        let mappings = QueryTranslator::mappings(metadata);
        if self.client.index_exists(&index).await? {
            self.client.index_mapping_put(&index, &mappings).await
        } else {
            self.client.index_create(&index, &mappings).await
        }
    }

    /// Return the total number of matches and the requested page window of
    /// documents.
    async fn documents_search(
        &self,
        index: &str,
        query_param: &QueryParam,
        from: usize,
        size: usize,
    ) -> Result<(u64, Vec<IndexDocument>), PlatformError> {
        let request = QueryTranslator::search_request(query_param, from, size);
        let response = self.client.search(&self.index_name(index), &request).await?;
        Ok(QueryTranslator::search_hits(&response))
    }

    /// Fetch the batch of matching documents following the cursor.
    ///
    /// The point in time is opened on the first batch and released after the
    /// last batch or on failure.
    async fn documents_batch(
        &self,
        index: &str,
        query_param: &QueryParam,
        cursor: StreamCursor,
    ) -> Result<(Vec<IndexDocument>, StreamCursor), PlatformError> {
        let (pit_id, search_after) = match cursor {
            StreamCursor::Start => (
                self.client
                    .point_in_time_open(&self.index_name(index), Self::POINT_IN_TIME_KEEP_ALIVE)
                    .await?,
                None,
            ),
            StreamCursor::Next {
                pit_id,
                search_after,
            } => (pit_id, Some(search_after)),
            StreamCursor::Done => return Ok((vec![], StreamCursor::Done)),
        };
        let request = QueryTranslator::search_after_request(
            query_param,
            &pit_id,
            Self::POINT_IN_TIME_KEEP_ALIVE,
            search_after.as_ref(),
            Self::QUERY_BATCH_SIZE,
        );
        let response = match self.client.point_in_time_search(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.point_in_time_release(&pit_id).await;
                return Err(e);
            }
        };
        let (_total, documents) = QueryTranslator::search_hits(&response);
        let (renewed_pit_id, search_after) = QueryTranslator::search_after_cursor(&response);
        let pit_id = renewed_pit_id.unwrap_or(pit_id);
        let cursor = match search_after {
            Some(search_after) if documents.len() == Self::QUERY_BATCH_SIZE => {
                StreamCursor::Next {
                    pit_id,
                    search_after,
                }
            }
            _ => {
                self.point_in_time_release(&pit_id).await;
                StreamCursor::Done
            }
        };
        Ok((documents, cursor))
    }

    /// Release the point in time. It expires on its own if this fails.
    async fn point_in_time_release(&self, pit_id: &str) {
        if let Err(e) = self.client.point_in_time_close(pit_id).await {
            log::debug!("Failed to release point in time: {e}");
        }
    }

    /// Lazily stream all matching documents in batches.
    ///
    /// Paging of the [QueryParam] is ignored.
    fn documents_stream(
        self: &Arc<Self>,
        index: &str,
        query_param: QueryParam,
    ) -> BoxStream<'static, Result<IndexDocument, PlatformError>> {
        let elastic_provider = Arc::clone(self);
        let index = index.to_owned();
        futures::stream::unfold(StreamCursor::Start, move |cursor| {
            let elastic_provider = Arc::clone(&elastic_provider);
            let index = index.clone();
            let query_param = query_param.clone();
            async move {
                if matches!(cursor, StreamCursor::Done) {
                    return None;
                }
                Some(
                    match elastic_provider
                        .documents_batch(&index, &query_param, cursor)
                        .await
                    {
                        Ok((documents, next)) => {
                            (documents.into_iter().map(Ok).collect::<Vec<_>>(), next)
                        }
                        Err(e) => (vec![Err(e)], StreamCursor::Done),
                    },
                )
            }
        })
        .flat_map(futures::stream::iter)
        .boxed()
    }
}

/// Position of a result stream.
enum StreamCursor {
    /// No batch fetched yet.
    Start,
    /// More batches may follow the last hit's sort values.
    Next { pit_id: String, search_after: Value },
    /// All batches fetched.
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name_is_prefixed() {
        let elastic_provider = ElasticSearchProvider {
            client: ElasticClient::new(&["http://localhost:9200".to_owned()], "", "").unwrap(),
            index_prefix: "staging_".to_owned(),
        };
        assert_eq!(
            elastic_provider.index_name("alarm_history"),
            "staging_alarm_history"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails() {
        let e = ElasticSearchProvider::new(&["http://127.0.0.1:1".to_owned()], "", "", "")
            .await
            .err()
            .unwrap();
        assert_eq!(e.kind(), &PlatformErrorKind::BackendOperationFailed);
    }
}
