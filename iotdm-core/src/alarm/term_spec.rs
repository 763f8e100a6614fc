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


//! Structured alarm trigger condition.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

/** Structured filter/condition tree of an alarm configuration.

Search index backends store this in flattened form as JSON text. When
deserialized, both the flattened text and the nested structure are accepted,
so reading a stored record restores the structure.
*/
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TermSpec(Value);

impl TermSpec {
    /// Return a new instance.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Return the nested structure.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Return the JSON text representation used for storage.
    pub fn to_flattened(&self) -> String {
        self.0.to_string()
    }

    /// Restore an instance from its JSON text representation.
    pub fn from_flattened(flattened: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(flattened).map(Self)
    }
}

impl From<Value> for TermSpec {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for TermSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Representation {
            Flattened(String),
            Structured(Value),
        }
        match Representation::deserialize(deserializer)? {
            Representation::Flattened(flattened) => {
                Self::from_flattened(&flattened).map_err(serde::de::Error::custom)
            }
            Representation::Structured(value) => Ok(Self(value)),
        }
    }
}
