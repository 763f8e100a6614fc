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


//! Composition root of the device management services.

use crate::alarm::AlarmHistoryService;
use crate::alarm::SearchIndexAlarmHistoryService;
use crate::conf::AppConfig;
use crate::dashboard::Dashboard;
use crate::dashboard::DeviceDynamicDashboard;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::dbp::DatabaseProvider;
use iotdm_dbp::dbp::facades::DatabaseProviderFacades;
use iotdm_dbp::dbp::facades::DeviceRegistryFacade;
use iotdm_dbp::dbp::facades::ProductFacade;
use iotdm_dbp_elastic::ElasticSearchProvider;
use iotdm_dbp_mem::InMemoryDatabaseProvider;
use std::sync::Arc;
use std::time::Duration;

/** Device management services wired to their collaborators.

Both services are independent, stateless facades over the shared
[DatabaseProvider].
*/
pub struct DeviceManagement {
    /// The database provider
    dbp: Arc<DatabaseProvider>,
    /// Alarm history persistence and queries.
    alarm_history_service: Arc<dyn AlarmHistoryService>,
    /// Dashboard of registered products.
    device_dashboard: Arc<dyn Dashboard>,
}

impl DeviceManagement {
    /// Return a new instance using the configured backend.
    ///
    /// Fails if the backend could not be reached or the alarm history schema
    /// could not be declared in time.
    pub async fn new(app_config: &Arc<AppConfig>) -> Result<Arc<Self>, PlatformError> {
        // Setup persistence from config.
        let dbp = match app_config.backend.implementation() {
            "elasticsearch" => {
                let elastic_provider = ElasticSearchProvider::new(
                    &app_config.backend.endpoints(),
                    app_config.backend.username(),
                    app_config.backend.password(),
                    app_config.backend.index_prefix(),
                )
                .await?;
                Arc::new(elastic_provider.as_database_provider())
            }
            "mem" => {
                let inmem_provider = InMemoryDatabaseProvider::new().await;
                Arc::new(inmem_provider.as_database_provider())
            }
            unknown_provider => {
                return Err(PlatformErrorKind::Unspecified
                    .error_with_msg(format!("Unknown database provider type '{unknown_provider}'.")));
            }
        };
        Self::with_database_provider(&dbp, app_config.alarm.schema_init_timeout()).await
    }

    /// Return a new instance using the provided backend.
    pub async fn with_database_provider(
        dbp: &Arc<DatabaseProvider>,
        schema_init_timeout: Duration,
    ) -> Result<Arc<Self>, PlatformError> {
        let alarm_history_service = SearchIndexAlarmHistoryService::new(dbp, schema_init_timeout);
        alarm_history_service.init().await.map_err(|e| {
            log::error!("Alarm history could not be initialized: {e}");
            e
        })?;
        let device_dashboard = DeviceDynamicDashboard::new(dbp);
        log::info!("Device management services have been created.");
        Ok(Arc::new(Self {
            dbp: Arc::clone(dbp),
            alarm_history_service,
            device_dashboard,
        }))
    }

    /// See [AlarmHistoryService].
    pub fn alarm_history_service(&self) -> &Arc<dyn AlarmHistoryService> {
        &self.alarm_history_service
    }

    /// See [DeviceDynamicDashboard].
    pub fn device_dashboard(&self) -> &Arc<dyn Dashboard> {
        &self.device_dashboard
    }

    /// Maintenance of the product catalog.
    pub fn product_facade(&self) -> &dyn ProductFacade {
        self.dbp.product_facade()
    }

    /// Maintenance of the live device registry.
    pub fn device_registry_facade(&self) -> &dyn DeviceRegistryFacade {
        self.dbp.device_registry_facade()
    }
}
