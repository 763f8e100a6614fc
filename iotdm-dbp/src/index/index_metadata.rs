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


//! Search index schema declaration.

use super::PropertyType;
use serde::Deserialize;
use serde::Serialize;

/// Schema of a named search index.
///
/// Properties keep their declaration order. Declaring a property a second
/// time replaces the earlier declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    index: String,
    properties: Vec<IndexPropertyMetadata>,
}

impl IndexMetadata {
    /// Return a new instance without any properties.
    pub fn new(index: &str) -> Self {
        Self {
            index: index.to_owned(),
            properties: Vec::new(),
        }
    }

    /// Return this instance with the property added.
    pub fn add_property(mut self, name: &str, property_type: PropertyType) -> Self {
        if let Some(existing) = self.properties.iter_mut().find(|p| p.name == name) {
            existing.property_type = property_type;
        } else {
            self.properties.push(IndexPropertyMetadata {
                name: name.to_owned(),
                property_type,
            });
        }
        self
    }

    /// Name of the index.
    pub fn get_index(&self) -> &str {
        &self.index
    }

    /// Declared properties in declaration order.
    pub fn get_properties(&self) -> &[IndexPropertyMetadata] {
        &self.properties
    }

    /// Return the declared type of the property.
    pub fn get_property_type(&self, name: &str) -> Option<PropertyType> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.property_type)
    }
}

/// A single declared property of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPropertyMetadata {
    name: String,
    property_type: PropertyType,
}

impl IndexPropertyMetadata {
    /// Property name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Property data type.
    pub fn get_property_type(&self) -> PropertyType {
        self.property_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeclared_property_keeps_position() {
        let metadata = IndexMetadata::new("test")
            .add_property("a", PropertyType::String)
            .add_property("b", PropertyType::Int)
            .add_property("a", PropertyType::DateTime);
        assert_eq!(metadata.get_properties().len(), 2);
        assert_eq!(metadata.get_properties()[0].get_name(), "a");
        assert_eq!(
            metadata.get_property_type("a"),
            Some(PropertyType::DateTime)
        );
        assert_eq!(metadata.get_property_type("c"), None);
    }
}
