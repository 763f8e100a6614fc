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


//! Database facade for operations related to the live device registry.

use crate::common::PlatformError;
use crate::device::DeviceMetadata;
use crate::device::ProductOperator;
use std::sync::Arc;

/// Database facade for operations related to the live device registry.
#[async_trait::async_trait]
pub trait DeviceRegistryFacade: Send + Sync {
    /// Get the live handle of a registered product.
    ///
    /// Returns `None` when no product with the identifier is registered.
    async fn product_operator(
        &self,
        product_id: &str,
    ) -> Result<Option<Arc<dyn ProductOperator>>, PlatformError>;

    /// Register (or re-register) a product with its runtime metadata.
    async fn product_register(
        &self,
        product_id: &str,
        metadata: DeviceMetadata,
    ) -> Result<(), PlatformError>;

    /// Remove a product from the registry.
    ///
    /// Returns `true` if the product was registered.
    async fn product_unregister(&self, product_id: &str) -> Result<bool, PlatformError>;
}
