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


//! Ephemeral in-memory specific database code.

mod inmem_device_registry_facade;
mod inmem_index_facade;
mod inmem_product_facade;

pub use self::inmem_device_registry_facade::*;
pub use self::inmem_index_facade::*;
pub use self::inmem_product_facade::*;
use super::InMemoryDatabaseProvider;
use iotdm_dbp::dbp::facades::*;
use std::sync::Arc;

/// Ephemeral in-memory specific database code.
pub struct InMemProviderFacades {
    device_registry_facade: InMemDeviceRegistryFacade,
    index_facade: InMemIndexFacade,
    product_facade: InMemProductFacade,
}

impl InMemProviderFacades {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            device_registry_facade: InMemDeviceRegistryFacade::new(inmem_provider),
            index_facade: InMemIndexFacade::new(inmem_provider),
            product_facade: InMemProductFacade::new(inmem_provider),
        }
    }
}

impl DatabaseProviderFacades for InMemProviderFacades {
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
