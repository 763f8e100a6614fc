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


//! Live handle of a registered product.

use super::DeviceMetadata;
use crate::common::PlatformError;

/// Live, addressable handle for a product's runtime behavior.
///
/// Obtained from the device registry by product identifier.
#[async_trait::async_trait]
pub trait ProductOperator: Send + Sync {
    /// Identifier of the product this operator handles.
    fn product_id(&self) -> &str;

    /// The product's current runtime metadata.
    async fn metadata(&self) -> Result<DeviceMetadata, PlatformError>;
}

/// [ProductOperator] backed by metadata captured at registration time.
pub struct RegisteredProductOperator {
    product_id: String,
    metadata: DeviceMetadata,
}

impl RegisteredProductOperator {
    /// Return a new instance.
    pub fn new(product_id: &str, metadata: DeviceMetadata) -> Self {
        Self {
            product_id: product_id.to_owned(),
            metadata,
        }
    }
}

#[async_trait::async_trait]
impl ProductOperator for RegisteredProductOperator {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    async fn metadata(&self) -> Result<DeviceMetadata, PlatformError> {
        Ok(self.metadata.clone())
    }
}
