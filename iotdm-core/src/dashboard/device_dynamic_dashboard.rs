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


//! Dashboard of registered products.

use super::Dashboard;
use super::DashboardObject;
use super::Definition;
use super::DeviceDashboardObject;
use futures::StreamExt;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::dbp::DatabaseProvider;
use iotdm_dbp::dbp::facades::DatabaseProviderFacades;
use iotdm_dbp::device::DeviceProduct;
use std::sync::Arc;

/** Dashboard with one object per product that is both stored in the product
catalog and registered in the live device registry.

Products without a live registry entry are silently left out. Nothing is
cached: every call consults both the catalog and the registry.
*/
pub struct DeviceDynamicDashboard {
    dbp: Arc<DatabaseProvider>,
}

impl DeviceDynamicDashboard {
    /// Identifier of this dashboard.
    pub const DASHBOARD_ID: &'static str = "device";

    /// Return a new instance.
    pub fn new(dbp: &Arc<DatabaseProvider>) -> Arc<Self> {
        Arc::new(Self {
            dbp: Arc::clone(dbp),
        })
    }

    /// Join a stored product with its live registry entry.
    async fn convert_object(
        dbp: &DatabaseProvider,
        product: DeviceProduct,
    ) -> Result<Option<Arc<dyn DashboardObject>>, PlatformError> {
        let operator = dbp
            .device_registry_facade()
            .product_operator(product.get_id())
            .await?;
        if operator.is_none() && log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "Product '{}' is not registered and has no dashboard object.",
                product.get_id()
            );
        }
        Ok(operator.map(|operator| {
            Arc::new(DeviceDashboardObject::of(&product, operator)) as Arc<dyn DashboardObject>
        }))
    }
}

#[async_trait::async_trait]
impl Dashboard for DeviceDynamicDashboard {
    fn definition(&self) -> Definition {
        Definition::new(Self::DASHBOARD_ID, "Device")
    }

    fn get_objects(&self) -> BoxStream<'static, Result<Arc<dyn DashboardObject>, PlatformError>> {
        let dbp = Arc::clone(&self.dbp);
        self.dbp
            .product_facade()
            .products_all()
            .try_filter_map(move |product| {
                let dbp = Arc::clone(&dbp);
                async move { Self::convert_object(&dbp, product).await }
            })
            .boxed()
    }

    async fn get_object(&self, id: &str) -> Result<Option<Arc<dyn DashboardObject>>, PlatformError> {
        match self.dbp.product_facade().product_by_id(id).await? {
            Some(product) => Self::convert_object(&self.dbp, product).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotdm_dbp::common::PlatformErrorKind;
    use iotdm_dbp::dbp::facades::DeviceRegistryFacade;
    use iotdm_dbp::dbp::facades::IndexFacade;
    use iotdm_dbp::dbp::facades::ProductFacade;
    use iotdm_dbp::device::DeviceMetadata;
    use iotdm_dbp::device::ProductOperator;
    use iotdm_dbp_mem::InMemoryDatabaseProvider;

    async fn dashboard_with_products() -> (Arc<DatabaseProvider>, Arc<DeviceDynamicDashboard>) {
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let dbp = Arc::new(inmem_provider.as_database_provider());
        for (id, name) in [("p1", "Boiler"), ("p2", "Valve"), ("p3", "Pump")] {
            dbp.product_facade()
                .product_upsert(DeviceProduct::new(id, name))
                .await
                .unwrap();
        }
        for id in ["p1", "p3", "p4"] {
            dbp.device_registry_facade()
                .product_register(id, DeviceMetadata::default())
                .await
                .unwrap();
        }
        let dashboard = DeviceDynamicDashboard::new(&dbp);
        (dbp, dashboard)
    }

    async fn object_ids(dashboard: &DeviceDynamicDashboard) -> Vec<String> {
        let mut ids = dashboard
            .get_objects()
            .map_ok(|object| object.definition().get_id().to_owned())
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_objects_require_catalog_and_registry() {
        let (dbp, dashboard) = dashboard_with_products().await;
        assert_eq!(object_ids(&dashboard).await, vec!["p1", "p3"]);
        // Re-issuing the call re-queries both collaborators
        dbp.device_registry_facade()
            .product_register("p2", DeviceMetadata::default())
            .await
            .unwrap();
        dbp.device_registry_facade()
            .product_unregister("p3")
            .await
            .unwrap();
        assert_eq!(object_ids(&dashboard).await, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_get_object_collapses_absence() {
        let (_dbp, dashboard) = dashboard_with_products().await;
        let object = dashboard.get_object("p1").await.unwrap().unwrap();
        assert_eq!(object.definition(), &Definition::new("p1", "Boiler"));
        // In the catalog, but not registered
        assert!(dashboard.get_object("p2").await.unwrap().is_none());
        // Registered, but not in the catalog
        assert!(dashboard.get_object("p4").await.unwrap().is_none());
        // Neither
        assert!(dashboard.get_object("p5").await.unwrap().is_none());
        assert_eq!(dashboard.definition().get_id(), "device");
    }

    /// Registry that is always unavailable.
    struct UnavailableRegistry {}

    #[async_trait::async_trait]
    impl DeviceRegistryFacade for UnavailableRegistry {
        async fn product_operator(
            &self,
            _product_id: &str,
        ) -> Result<Option<Arc<dyn ProductOperator>>, PlatformError> {
            Err(PlatformErrorKind::BackendOperationFailed.error_with_msg("registry down"))
        }
        async fn product_register(
            &self,
            _product_id: &str,
            _metadata: DeviceMetadata,
        ) -> Result<(), PlatformError> {
            Err(PlatformErrorKind::BackendOperationFailed.error())
        }
        async fn product_unregister(&self, _product_id: &str) -> Result<bool, PlatformError> {
            Err(PlatformErrorKind::BackendOperationFailed.error())
        }
    }

    struct UnavailableRegistryFacades {
        inner: DatabaseProvider,
        registry: UnavailableRegistry,
    }

    impl DatabaseProviderFacades for UnavailableRegistryFacades {
        fn device_registry_facade(&self) -> &dyn DeviceRegistryFacade {
            &self.registry
        }
        fn index_facade(&self) -> &dyn IndexFacade {
            self.inner.index_facade()
        }
        fn product_facade(&self) -> &dyn ProductFacade {
            self.inner.product_facade()
        }
    }

    #[tokio::test]
    async fn test_registry_failure_propagates() {
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let inner = inmem_provider.as_database_provider();
        inner
            .product_facade()
            .product_upsert(DeviceProduct::new("p1", "Boiler"))
            .await
            .unwrap();
        let dbp = Arc::new(DatabaseProvider::new(Arc::new(UnavailableRegistryFacades {
            inner,
            registry: UnavailableRegistry {},
        })));
        let dashboard = DeviceDynamicDashboard::new(&dbp);
        let e = dashboard.get_object("p1").await.err().unwrap();
        assert_eq!(e.kind(), &PlatformErrorKind::BackendOperationFailed);
        let e = dashboard
            .get_objects()
            .try_collect::<Vec<_>>()
            .await
            .err()
            .unwrap();
        assert_eq!(e.kind(), &PlatformErrorKind::BackendOperationFailed);
        // Absent from the catalog never reaches the registry
        assert!(dashboard.get_object("p2").await.unwrap().is_none());
    }
}
