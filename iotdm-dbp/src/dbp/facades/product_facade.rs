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


//! Database facade for operations related to the product catalog.

use crate::common::PlatformError;
use crate::device::DeviceProduct;
use futures::stream::BoxStream;

/// Database facade for operations related to the product catalog.
#[async_trait::async_trait]
pub trait ProductFacade: Send + Sync {
    /// Lazily enumerate all stored products.
    ///
    /// Nothing is fetched until the stream is polled and each invocation
    /// queries the store anew.
    fn products_all(&self) -> BoxStream<'static, Result<DeviceProduct, PlatformError>>;

    /// Get a stored product by its identifier.
    async fn product_by_id(&self, product_id: &str)
    -> Result<Option<DeviceProduct>, PlatformError>;

    /// Insert or replace a product.
    async fn product_upsert(&self, product: DeviceProduct) -> Result<(), PlatformError>;
}
