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


//! Database facades.

mod device_registry_facade;
mod index_facade;
mod product_facade;

pub use self::device_registry_facade::*;
pub use self::index_facade::*;
pub use self::product_facade::*;

/// Provide access to database facades.
pub trait DatabaseProviderFacades: Send + Sync {
    /// See [DeviceRegistryFacade].
    fn device_registry_facade(&self) -> &dyn DeviceRegistryFacade;

    /// See [IndexFacade].
    fn index_facade(&self) -> &dyn IndexFacade;

    /// See [ProductFacade].
    fn product_facade(&self) -> &dyn ProductFacade;
}
