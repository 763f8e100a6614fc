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


//! Dashboards exposing read-models of platform objects.

mod dashboard_object;
mod definition;
mod device_dashboard_object;
mod device_dynamic_dashboard;

pub use self::dashboard_object::DashboardObject;
pub use self::definition::Definition;
pub use self::definition::MeasurementDefinition;
pub use self::definition::MeasurementKind;
pub use self::device_dashboard_object::DeviceDashboardObject;
pub use self::device_dynamic_dashboard::DeviceDynamicDashboard;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use std::sync::Arc;

/// A dashboard of objects.
#[async_trait::async_trait]
pub trait Dashboard: Send + Sync {
    /// Identity of the dashboard.
    fn definition(&self) -> Definition;

    /// Lazily stream all objects of this dashboard.
    ///
    /// Every invocation queries anew.
    fn get_objects(&self) -> BoxStream<'static, Result<Arc<dyn DashboardObject>, PlatformError>>;

    /// Return the object with the identifier if it exists.
    async fn get_object(&self, id: &str) -> Result<Option<Arc<dyn DashboardObject>>, PlatformError>;
}
