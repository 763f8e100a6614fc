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


//! Ephemeral in-memory implementation of [ProductFacade].

use crate::InMemoryDatabaseProvider;
use futures::StreamExt;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::dbp::facades::ProductFacade;
use iotdm_dbp::device::DeviceProduct;
use std::sync::Arc;

/// Ephemeral in-memory implementation of [ProductFacade].
pub struct InMemProductFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemProductFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl ProductFacade for InMemProductFacade {
    fn products_all(&self) -> BoxStream<'static, Result<DeviceProduct, PlatformError>> {
        let inmem_provider = Arc::clone(&self.inmem_provider);
        futures::stream::once(async move {
            inmem_provider
                .products
                .iter()
                .map(|entry| Ok(entry.value().to_owned()))
                .collect::<Vec<_>>()
        })
        .flat_map(futures::stream::iter)
        .boxed()
    }

    async fn product_by_id(
        &self,
        product_id: &str,
    ) -> Result<Option<DeviceProduct>, PlatformError> {
        Ok(self
            .inmem_provider
            .products
            .get(product_id)
            .map(|entry| entry.value().to_owned()))
    }

    async fn product_upsert(&self, product: DeviceProduct) -> Result<(), PlatformError> {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Upserting product '{}'.", product.get_id());
        }
        self.inmem_provider
            .products
            .insert(product.get_id().to_owned(), product);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_products_all_is_restartable() {
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let facade = InMemProductFacade::new(&inmem_provider);
        let products = facade.products_all();
        // Not polled yet, so the upsert below is visible.
        facade
            .product_upsert(DeviceProduct::new("p1", "Thermometer"))
            .await
            .unwrap();
        let first = products.try_collect::<Vec<_>>().await.unwrap();
        assert_eq!(first.len(), 1);
        facade
            .product_upsert(DeviceProduct::new("p2", "Hygrometer"))
            .await
            .unwrap();
        let second = facade.products_all().try_collect::<Vec<_>>().await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(
            facade.product_by_id("p2").await.unwrap().unwrap().get_name(),
            "Hygrometer"
        );
        assert!(facade.product_by_id("p3").await.unwrap().is_none());
    }
}
