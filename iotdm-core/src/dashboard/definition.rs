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


//! Identities of dashboards, objects and measurements.

use serde::Deserialize;
use serde::Serialize;

/// Identity of a dashboard or dashboard object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    id: String,
    name: String,
}

impl Definition {
    /// Return a new instance.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Identifier.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

/// What a measurement observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// All properties of a device.
    Properties,
    /// A single device property.
    Property,
    /// A device event.
    Event,
}

/// A measurement provided by a dashboard object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementDefinition {
    id: String,
    name: String,
    kind: MeasurementKind,
}

impl MeasurementDefinition {
    /// Return a new instance.
    pub fn new(id: &str, name: &str, kind: MeasurementKind) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            kind,
        }
    }

    /// Identifier, unique within the object.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// What is observed.
    pub fn get_kind(&self) -> MeasurementKind {
        self.kind
    }
}
