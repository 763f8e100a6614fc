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


//! Elasticsearch implementation of [DeviceRegistryFacade].

use super::as_backend_error;
use crate::ElasticSearchProvider;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::dbp::facades::DeviceRegistryFacade;
use iotdm_dbp::device::DeviceMetadata;
use iotdm_dbp::device::ProductOperator;
use iotdm_dbp::device::RegisteredProductOperator;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;

/// Elasticsearch implementation of [DeviceRegistryFacade].
///
/// Each registered product is one document holding the device metadata.
pub struct ElasticDeviceRegistryFacade {
    elastic_provider: Arc<ElasticSearchProvider>,
}

impl ElasticDeviceRegistryFacade {
    /// Return a new instance.
    pub fn new(elastic_provider: &Arc<ElasticSearchProvider>) -> Self {
        Self {
            elastic_provider: Arc::clone(elastic_provider),
        }
    }

    fn index_name(&self) -> String {
        self.elastic_provider
            .index_name(ElasticSearchProvider::REGISTRY_INDEX)
    }

    fn operator_from_source(
        product_id: &str,
        mut source: Value,
    ) -> Result<RegisteredProductOperator, PlatformError> {
        let metadata = source
            .get_mut("metadata")
            .map(Value::take)
            .unwrap_or_default();
        serde_json::from_value::<Option<DeviceMetadata>>(metadata)
            .map(|metadata| {
                RegisteredProductOperator::new(product_id, metadata.unwrap_or_default())
            })
            .map_err(|e| {
                PlatformErrorKind::BackendOperationFailed.error_with_msg(format!(
                    "Unable to parse registry entry of '{product_id}': {e}"
                ))
            })
    }
}

#[async_trait::async_trait]
impl DeviceRegistryFacade for ElasticDeviceRegistryFacade {
    async fn product_operator(
        &self,
        product_id: &str,
    ) -> Result<Option<Arc<dyn ProductOperator>>, PlatformError> {
        let source = self
            .elastic_provider
            .client
            .document_get(&self.index_name(), product_id)
            .await
            .map_err(as_backend_error)?;
        let Some(source) = source else {
            return Ok(None);
        };
        let operator: Arc<dyn ProductOperator> =
            Arc::new(Self::operator_from_source(product_id, source)?);
        Ok(Some(operator))
    }

    async fn product_register(
        &self,
        product_id: &str,
        metadata: DeviceMetadata,
    ) -> Result<(), PlatformError> {
        log::debug!("Registering product '{product_id}'.");
        let metadata = serde_json::to_value(&metadata).map_err(|e| {
            PlatformErrorKind::BackendOperationFailed
                .error_with_msg(format!("Unable to serialize device metadata: {e}"))
        })?;
        self.elastic_provider
            .client
            .document_put(
                &self.index_name(),
                product_id,
                &json!({ "productId": product_id, "metadata": metadata }),
            )
            .await
            .map_err(as_backend_error)
    }

    async fn product_unregister(&self, product_id: &str) -> Result<bool, PlatformError> {
        log::debug!("Unregistering product '{product_id}'.");
        self.elastic_provider
            .client
            .document_delete(&self.index_name(), product_id)
            .await
            .map_err(as_backend_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotdm_dbp::device::PropertyMetadata;

    #[tokio::test]
    async fn test_operator_from_source() {
        let source = json!({
            "productId": "p1",
            "metadata": {
                "properties": [{"id": "temp", "name": "Temperature", "valueType": "double"}],
                "events": []
            }
        });
        let operator = ElasticDeviceRegistryFacade::operator_from_source("p1", source).unwrap();
        assert_eq!(operator.product_id(), "p1");
        let metadata = operator.metadata().await.unwrap();
        assert_eq!(
            metadata.get_properties(),
            &[PropertyMetadata::new("temp", "Temperature", "double")]
        );
        assert_eq!(metadata.get_properties()[0].get_value_type(), "double");
        let operator =
            ElasticDeviceRegistryFacade::operator_from_source("p2", json!({"productId": "p2"}))
                .unwrap();
        assert!(operator.metadata().await.unwrap().get_events().is_empty());
    }
}
