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


//! Ephemeral in-memory implementation of [DeviceRegistryFacade].

use crate::InMemoryDatabaseProvider;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::dbp::facades::DeviceRegistryFacade;
use iotdm_dbp::device::DeviceMetadata;
use iotdm_dbp::device::ProductOperator;
use iotdm_dbp::device::RegisteredProductOperator;
use std::sync::Arc;

/// Ephemeral in-memory implementation of [DeviceRegistryFacade].
pub struct InMemDeviceRegistryFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemDeviceRegistryFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl DeviceRegistryFacade for InMemDeviceRegistryFacade {
    async fn product_operator(
        &self,
        product_id: &str,
    ) -> Result<Option<Arc<dyn ProductOperator>>, PlatformError> {
        Ok(self
            .inmem_provider
            .registry
            .get(product_id)
            .map(|entry| Arc::clone(entry.value()) as Arc<dyn ProductOperator>))
    }

    async fn product_register(
        &self,
        product_id: &str,
        metadata: DeviceMetadata,
    ) -> Result<(), PlatformError> {
        log::debug!("Registering product '{product_id}'.");
        self.inmem_provider.registry.insert(
            product_id.to_owned(),
            Arc::new(RegisteredProductOperator::new(product_id, metadata)),
        );
        Ok(())
    }

    async fn product_unregister(&self, product_id: &str) -> Result<bool, PlatformError> {
        log::debug!("Unregistering product '{product_id}'.");
        Ok(self.inmem_provider.registry.remove(product_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotdm_dbp::device::EventMetadata;

    #[tokio::test]
    async fn test_register_and_unregister() {
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let facade = InMemDeviceRegistryFacade::new(&inmem_provider);
        assert!(facade.product_operator("p1").await.unwrap().is_none());
        let metadata = DeviceMetadata::new(vec![], vec![EventMetadata::new("fire", "Fire")]);
        facade
            .product_register("p1", metadata.clone())
            .await
            .unwrap();
        let operator = facade.product_operator("p1").await.unwrap().unwrap();
        assert_eq!(operator.product_id(), "p1");
        assert_eq!(operator.metadata().await.unwrap(), metadata);
        assert!(facade.product_unregister("p1").await.unwrap());
        assert!(!facade.product_unregister("p1").await.unwrap());
        assert!(facade.product_operator("p1").await.unwrap().is_none());
    }
}
