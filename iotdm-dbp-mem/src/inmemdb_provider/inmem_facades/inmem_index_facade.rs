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


//! Ephemeral in-memory implementation of [IndexFacade].

use crate::InMemoryDatabaseProvider;
use futures::StreamExt;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::dbp::facades::IndexFacade;
use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::index::IndexMetadata;
use iotdm_dbp::query::AggregationData;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::PagerResult;
use iotdm_dbp::query::QueryParam;
use std::sync::Arc;

/// Ephemeral in-memory implementation of [IndexFacade].
pub struct InMemIndexFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemIndexFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl IndexFacade for InMemIndexFacade {
    async fn index_put(&self, metadata: IndexMetadata) -> Result<(), PlatformError> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Declaring index '{}' with {} properties.",
                metadata.get_index(),
                metadata.get_properties().len()
            );
        }
        self.inmem_provider
            .index_metadata
            .insert(metadata.get_index().to_owned(), metadata);
        Ok(())
    }

    async fn documents_save(
        &self,
        index: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<(), PlatformError> {
        let inmem_index = self.inmem_provider.index_by_name(index);
        for document in documents {
            inmem_index.document_save(document);
        }
        Ok(())
    }

    fn documents_query(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> BoxStream<'static, Result<IndexDocument, PlatformError>> {
        let inmem_provider = Arc::clone(&self.inmem_provider);
        let index = index.to_owned();
        let query_param = query_param.to_owned();
        futures::stream::once(async move {
            inmem_provider
                .index_by_name_if_exists(&index)
                .map(|inmem_index| inmem_index.documents_matching(&query_param))
                .unwrap_or_default()
        })
        .flat_map(|documents| {
            futures::stream::iter(
                documents
                    .into_iter()
                    .map(|document| Ok(document.as_ref().to_owned())),
            )
        })
        .boxed()
    }

    async fn documents_query_page(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> Result<PagerResult<IndexDocument>, PlatformError> {
        Ok(self
            .inmem_provider
            .index_by_name_if_exists(index)
            .map(|inmem_index| inmem_index.documents_page(query_param))
            .unwrap_or_else(|| {
                PagerResult::new(query_param.page_index, query_param.page_size, 0, vec![])
            }))
    }

    async fn documents_count(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> Result<u64, PlatformError> {
        Ok(self
            .inmem_provider
            .index_by_name_if_exists(index)
            .map(|inmem_index| inmem_index.documents_count(query_param))
            .unwrap_or_default())
    }

    fn documents_aggregate(
        &self,
        index: &str,
        aggregation_param: &AggregationQueryParam,
    ) -> BoxStream<'static, Result<AggregationData, PlatformError>> {
        let inmem_provider = Arc::clone(&self.inmem_provider);
        let index = index.to_owned();
        let aggregation_param = aggregation_param.to_owned();
        futures::stream::once(async move {
            inmem_provider
                .index_by_name_if_exists(&index)
                .unwrap_or_default()
                .documents_aggregate(&aggregation_param)
        })
        .flat_map(|buckets| futures::stream::iter(buckets.into_iter().map(Ok)))
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use iotdm_dbp::index::PropertyType;
    use serde_json::json;

    pub fn initialize_env_logger() {
        env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init()
            .map_err(|e| {
                log::trace!("Env logger for testing was probably already initialized: {e:?}")
            })
            .ok();
    }

    #[tokio::test]
    async fn test_index_put_is_idempotent() {
        initialize_env_logger();
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let facade = InMemIndexFacade::new(&inmem_provider);
        let metadata = IndexMetadata::new("test").add_property("id", PropertyType::String);
        facade.index_put(metadata.clone()).await.unwrap();
        facade
            .documents_save("test", vec![json!({"id": "a"}).as_object().unwrap().to_owned()])
            .await
            .unwrap();
        facade.index_put(metadata.clone()).await.unwrap();
        assert_eq!(inmem_provider.index_metadata("test"), Some(metadata));
        assert_eq!(
            facade.documents_count("test", &QueryParam::new()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_unknown_index_is_empty() {
        initialize_env_logger();
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let facade = InMemIndexFacade::new(&inmem_provider);
        let query_param = QueryParam::new().page(2, 10);
        assert_eq!(facade.documents_count("none", &query_param).await.unwrap(), 0);
        let page = facade
            .documents_query_page("none", &query_param)
            .await
            .unwrap();
        assert_eq!((page.page_index, page.page_size, page.total), (2, 10, 0));
        let documents = facade
            .documents_query("none", &query_param)
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_query_is_lazy_and_restartable() {
        initialize_env_logger();
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let facade = InMemIndexFacade::new(&inmem_provider);
        let query_param = QueryParam::new().where_eq("targetId", "d1");
        let pending = facade.documents_query("test", &query_param);
        facade
            .documents_save(
                "test",
                vec![
                    json!({"id": "a", "targetId": "d1"}).as_object().unwrap().to_owned(),
                    json!({"id": "b", "targetId": "d2"}).as_object().unwrap().to_owned(),
                ],
            )
            .await
            .unwrap();
        assert_eq!(pending.try_collect::<Vec<_>>().await.unwrap().len(), 1);
        facade
            .documents_save(
                "test",
                vec![json!({"id": "c", "targetId": "d1"}).as_object().unwrap().to_owned()],
            )
            .await
            .unwrap();
        let again = facade
            .documents_query("test", &query_param)
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(again.len(), 2);
    }
}
