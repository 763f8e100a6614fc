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


//! Stored product definition.

use serde::Deserialize;
use serde::Serialize;

/// A product (device template) as held by the product catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProduct {
    /// Unique product identifier.
    id: String,
    /// Display name.
    name: String,
    /// Optional free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Optional classification of the product. E.g. "gateway".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classified_id: Option<String>,
}

impl DeviceProduct {
    /// Return a new instance.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: None,
            classified_id: None,
        }
    }

    /// Return this instance with the description set.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Return this instance with the classification set.
    pub fn with_classified_id(mut self, classified_id: &str) -> Self {
        self.classified_id = Some(classified_id.to_owned());
        self
    }

    /// Return this instance with a different identifier.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_owned();
        self
    }

    /// Unique product identifier.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Optional free text description.
    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Optional classification of the product.
    pub fn get_classified_id(&self) -> Option<&str> {
        self.classified_id.as_deref()
    }
}
