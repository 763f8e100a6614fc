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


//! Dashboard object contract.

use super::Definition;
use super::MeasurementDefinition;
use iotdm_dbp::common::PlatformError;

/// A read-model object presented by a dashboard.
#[async_trait::async_trait]
pub trait DashboardObject: Send + Sync {
    /// Identity of the object.
    fn definition(&self) -> &Definition;

    /// All measurements currently provided by the object.
    async fn measurements(&self) -> Result<Vec<MeasurementDefinition>, PlatformError>;

    /// Return the measurement with the identifier if it exists.
    async fn measurement(&self, id: &str) -> Result<Option<MeasurementDefinition>, PlatformError> {
        Ok(self
            .measurements()
            .await?
            .into_iter()
            .find(|measurement| measurement.get_id() == id))
    }
}
