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


//! Elasticsearch implementation of [ProductFacade].

use super::as_backend_error;
use crate::ElasticSearchProvider;
use futures::StreamExt;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::dbp::facades::ProductFacade;
use iotdm_dbp::device::DeviceProduct;
use iotdm_dbp::query::QueryParam;
use iotdm_dbp::query::SortOrder;
use serde_json::Value;
use std::sync::Arc;

/// Elasticsearch implementation of [ProductFacade].
///
/// Products are stored as documents identified by product id.
pub struct ElasticProductFacade {
    elastic_provider: Arc<ElasticSearchProvider>,
}

impl ElasticProductFacade {
    /// Return a new instance.
    pub fn new(elastic_provider: &Arc<ElasticSearchProvider>) -> Self {
        Self {
            elastic_provider: Arc::clone(elastic_provider),
        }
    }

    fn product_from_source(source: Value) -> Result<DeviceProduct, PlatformError> {
        serde_json::from_value(source).map_err(|e| {
            PlatformErrorKind::BackendOperationFailed
                .error_with_msg(format!("Unable to parse stored product: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl ProductFacade for ElasticProductFacade {
    fn products_all(&self) -> BoxStream<'static, Result<DeviceProduct, PlatformError>> {
        let query_param = QueryParam::new().order_by("id", SortOrder::Asc);
        self.elastic_provider
            .documents_stream(ElasticSearchProvider::PRODUCT_INDEX, query_param)
            .map_err(as_backend_error)
            .and_then(|document| async move { Self::product_from_source(Value::Object(document)) })
            .boxed()
    }

    async fn product_by_id(&self, product_id: &str) -> Result<Option<DeviceProduct>, PlatformError> {
        self.elastic_provider
            .client
            .document_get(
                &self
                    .elastic_provider
                    .index_name(ElasticSearchProvider::PRODUCT_INDEX),
                product_id,
            )
            .await
            .map_err(as_backend_error)?
            .map(Self::product_from_source)
            .transpose()
    }

    async fn product_upsert(&self, product: DeviceProduct) -> Result<(), PlatformError> {
        let source = serde_json::to_value(&product).map_err(|e| {
            PlatformErrorKind::BackendOperationFailed
                .error_with_msg(format!("Unable to serialize product: {e}"))
        })?;
        log::debug!("Storing product '{}'.", product.get_id());
        self.elastic_provider
            .client
            .document_put(
                &self
                    .elastic_provider
                    .index_name(ElasticSearchProvider::PRODUCT_INDEX),
                product.get_id(),
                &source,
            )
            .await
            .map_err(as_backend_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_source() {
        let product = ElasticProductFacade::product_from_source(
            json!({"id": "p1", "name": "Boiler", "description": "Basement", "classifiedId": "heating"}),
        )
        .unwrap();
        assert_eq!(
            product,
            DeviceProduct::new("p1", "Boiler")
                .with_description("Basement")
                .with_classified_id("heating")
        );
        assert_eq!(product.get_description(), Some("Basement"));
        assert_eq!(product.get_classified_id(), Some("heating"));
        let e = ElasticProductFacade::product_from_source(json!({"id": "p1"}))
            .err()
            .unwrap();
        assert_eq!(e.kind(), &PlatformErrorKind::BackendOperationFailed);
    }
}
