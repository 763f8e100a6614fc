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


//! Runtime metadata of a registered product.

use serde::Deserialize;
use serde::Serialize;

/// Property and event definitions of a product known by the device registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    #[serde(default)]
    properties: Vec<PropertyMetadata>,
    #[serde(default)]
    events: Vec<EventMetadata>,
}

impl DeviceMetadata {
    /// Return a new instance.
    pub fn new(properties: Vec<PropertyMetadata>, events: Vec<EventMetadata>) -> Self {
        Self { properties, events }
    }

    /// Property definitions.
    pub fn get_properties(&self) -> &[PropertyMetadata] {
        &self.properties
    }

    /// Event definitions.
    pub fn get_events(&self) -> &[EventMetadata] {
        &self.events
    }
}

/// Definition of a device property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    id: String,
    name: String,
    /// Value type name. E.g. "int" or "string".
    value_type: String,
}

impl PropertyMetadata {
    /// Return a new instance.
    pub fn new(id: &str, name: &str, value_type: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            value_type: value_type.to_owned(),
        }
    }

    /// Property identifier.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Value type name.
    pub fn get_value_type(&self) -> &str {
        &self.value_type
    }
}

/// Definition of a device event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    id: String,
    name: String,
}

impl EventMetadata {
    /// Return a new instance.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Event identifier.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
