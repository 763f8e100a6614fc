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


//! Elasticsearch specific database code.

mod elastic_device_registry_facade;
mod elastic_index_facade;
mod elastic_product_facade;

pub use self::elastic_device_registry_facade::*;
pub use self::elastic_index_facade::*;
pub use self::elastic_product_facade::*;
use super::ElasticSearchProvider;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::dbp::facades::*;
use std::sync::Arc;

/// Elasticsearch specific database code.
pub struct ElasticProviderFacades {
    device_registry_facade: ElasticDeviceRegistryFacade,
    index_facade: ElasticIndexFacade,
    product_facade: ElasticProductFacade,
}

impl ElasticProviderFacades {
    /// Return a new instance.
    pub fn new(elastic_provider: &Arc<ElasticSearchProvider>) -> Self {
        Self {
            device_registry_facade: ElasticDeviceRegistryFacade::new(elastic_provider),
            index_facade: ElasticIndexFacade::new(elastic_provider),
            product_facade: ElasticProductFacade::new(elastic_provider),
        }
    }
}

impl DatabaseProviderFacades for ElasticProviderFacades {
    fn device_registry_facade(&self) -> &dyn DeviceRegistryFacade {
        &self.device_registry_facade
    }

    fn index_facade(&self) -> &dyn IndexFacade {
        &self.index_facade
    }

    fn product_facade(&self) -> &dyn ProductFacade {
        &self.product_facade
    }
}

/// Catalog and registry failures are reported as backend failures.
fn as_backend_error(e: PlatformError) -> PlatformError {
    PlatformErrorKind::BackendOperationFailed.error_with_msg(e.msg().unwrap_or_default())
}
