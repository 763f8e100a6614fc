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


//! Dashboard object of a registered product.

use super::DashboardObject;
use super::Definition;
use super::MeasurementDefinition;
use super::MeasurementKind;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::device::DeviceProduct;
use iotdm_dbp::device::ProductOperator;
use std::sync::Arc;

/// Dashboard object combining a stored product with its live registry handle.
///
/// Measurements are derived from the live metadata each time they are
/// requested.
pub struct DeviceDashboardObject {
    definition: Definition,
    operator: Arc<dyn ProductOperator>,
}

impl DeviceDashboardObject {
    /// Identifier of the measurement covering all properties.
    pub const PROPERTIES_MEASUREMENT: &'static str = "properties";

    /// Return a new instance.
    pub fn of(product: &DeviceProduct, operator: Arc<dyn ProductOperator>) -> Self {
        Self {
            definition: Definition::new(product.get_id(), product.get_name()),
            operator,
        }
    }

    /// The live registry handle of the product.
    pub fn operator(&self) -> &Arc<dyn ProductOperator> {
        &self.operator
    }
}

#[async_trait::async_trait]
impl DashboardObject for DeviceDashboardObject {
    fn definition(&self) -> &Definition {
        &self.definition
    }

    async fn measurements(&self) -> Result<Vec<MeasurementDefinition>, PlatformError> {
        let metadata = self.operator.metadata().await?;
        let mut measurements = vec![MeasurementDefinition::new(
            Self::PROPERTIES_MEASUREMENT,
            "Properties",
            MeasurementKind::Properties,
        )];
        measurements.extend(metadata.get_properties().iter().map(|property| {
            MeasurementDefinition::new(
                property.get_id(),
                property.get_name(),
                MeasurementKind::Property,
            )
        }));
        measurements.extend(metadata.get_events().iter().map(|event| {
            MeasurementDefinition::new(event.get_id(), event.get_name(), MeasurementKind::Event)
        }));
        Ok(measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotdm_dbp::device::DeviceMetadata;
    use iotdm_dbp::device::EventMetadata;
    use iotdm_dbp::device::PropertyMetadata;
    use iotdm_dbp::device::RegisteredProductOperator;

    #[tokio::test]
    async fn test_measurements_follow_metadata() {
        let operator = Arc::new(RegisteredProductOperator::new(
            "p1",
            DeviceMetadata::new(
                vec![PropertyMetadata::new("temperature", "Temperature", "float")],
                vec![EventMetadata::new("overheat", "Overheat")],
            ),
        ));
        let object = DeviceDashboardObject::of(&DeviceProduct::new("p1", "Boiler"), operator);
        assert_eq!(object.definition(), &Definition::new("p1", "Boiler"));
        let measurements = object.measurements().await.unwrap();
        assert_eq!(
            measurements
                .iter()
                .map(|m| (m.get_id(), m.get_kind()))
                .collect::<Vec<_>>(),
            vec![
                ("properties", MeasurementKind::Properties),
                ("temperature", MeasurementKind::Property),
                ("overheat", MeasurementKind::Event),
            ]
        );
        assert_eq!(
            object.measurement("overheat").await.unwrap().map(|m| m.get_kind()),
            Some(MeasurementKind::Event)
        );
        assert!(object.measurement("pressure").await.unwrap().is_none());
    }
}
