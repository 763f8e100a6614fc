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


//! Elasticsearch implementation of [IndexFacade].

use crate::ElasticSearchProvider;
use crate::elastic_provider::QueryTranslator;
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

/// Elasticsearch implementation of [IndexFacade].
pub struct ElasticIndexFacade {
    elastic_provider: Arc<ElasticSearchProvider>,
}

impl ElasticIndexFacade {
    /// Return a new instance.
    pub fn new(elastic_provider: &Arc<ElasticSearchProvider>) -> Self {
        Self {
            elastic_provider: Arc::clone(elastic_provider),
        }
    }
}

#[async_trait::async_trait]
impl IndexFacade for ElasticIndexFacade {
    async fn index_put(&self, metadata: IndexMetadata) -> Result<(), PlatformError> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Declaring index '{}' with {} properties.",
                metadata.get_index(),
                metadata.get_properties().len()
            );
        }
        self.elastic_provider.index_ensure(&metadata).await
    }

    async fn documents_save(
        &self,
        index: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<(), PlatformError> {
        self.elastic_provider
            .client
            .bulk_index(&self.elastic_provider.index_name(index), &documents)
            .await
    }

    fn documents_query(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> BoxStream<'static, Result<IndexDocument, PlatformError>> {
        self.elastic_provider
            .documents_stream(index, query_param.to_owned())
    }

    async fn documents_query_page(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> Result<PagerResult<IndexDocument>, PlatformError> {
        let (total, documents) = self
            .elastic_provider
            .documents_search(
                index,
                query_param,
                query_param.first_index(),
                query_param.page_size,
            )
            .await?;
        Ok(PagerResult::new(
            query_param.page_index,
            query_param.page_size,
            total,
            documents,
        ))
    }

    async fn documents_count(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> Result<u64, PlatformError> {
        self.elastic_provider
            .client
            .count(
                &self.elastic_provider.index_name(index),
                &QueryTranslator::count_request(query_param),
            )
            .await
    }

    fn documents_aggregate(
        &self,
        index: &str,
        aggregation_param: &AggregationQueryParam,
    ) -> BoxStream<'static, Result<AggregationData, PlatformError>> {
        let elastic_provider = Arc::clone(&self.elastic_provider);
        let index = elastic_provider.index_name(index);
        let aggregation_param = aggregation_param.to_owned();
        futures::stream::once(async move {
            let request = QueryTranslator::aggregation_request(&aggregation_param);
            let response = elastic_provider.client.search(&index, &request).await?;
            QueryTranslator::aggregation_rows(&aggregation_param, &response)
        })
        .flat_map(|result| {
            futures::stream::iter(match result {
                Ok(rows) => rows.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
        })
        .boxed()
    }
}
