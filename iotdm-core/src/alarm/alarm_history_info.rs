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


//! Alarm history record.

use super::TermSpec;
use serde::Deserialize;
use serde::Serialize;

/// A fired alarm as kept in the alarm history.
///
/// Records are append-only history and never updated after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlarmHistoryInfo {
    /// Record identifier.
    pub id: String,
    /// Identifier of the alarm configuration that fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_config_id: Option<String>,
    /// Name of the alarm configuration that fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_config_name: Option<String>,
    /// Identifier of the alarm record tracking the alarm state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_record_id: Option<String>,
    /// Severity level.
    pub level: i32,
    /// Alarm description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Time the alarm fired in epoch milliseconds.
    pub alarm_time: i64,
    /// Type of the alarmed entity. E.g. "device" or "product".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Name of the alarmed entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Identifier of the alarmed entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Type of the alarm origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Name of the alarm origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// Identifier of the alarm origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Free-form alarm information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_info: Option<String>,
    /// Identifier of the creator of the alarm configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    /// Trigger condition of the alarm configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_spec: Option<TermSpec>,
    /// Description of the trigger condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_desc: Option<String>,
    /// Description of the values that actually triggered the alarm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_desc: Option<String>,
    /// Origin of the alarm configuration. E.g. "scene".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_config_source: Option<String>,
}

impl AlarmHistoryInfo {
    /// Property name of the trigger condition.
    pub const TERM_SPEC: &'static str = "termSpec";

    /// Return a new instance.
    pub fn new(id: &str, level: i32, alarm_time: i64) -> Self {
        Self {
            id: id.to_owned(),
            level,
            alarm_time,
            ..Self::default()
        }
    }

    /// Return this instance with the alarmed entity set.
    pub fn with_target(mut self, target_type: &str, target_id: &str, target_name: &str) -> Self {
        self.target_type = Some(target_type.to_owned());
        self.target_id = Some(target_id.to_owned());
        self.target_name = Some(target_name.to_owned());
        self
    }

    /// Return this instance with the alarm origin set.
    pub fn with_source(mut self, source_type: &str, source_id: &str, source_name: &str) -> Self {
        self.source_type = Some(source_type.to_owned());
        self.source_id = Some(source_id.to_owned());
        self.source_name = Some(source_name.to_owned());
        self
    }

    /// Return this instance with the alarm configuration set.
    pub fn with_alarm_config(mut self, alarm_config_id: &str, alarm_config_name: &str) -> Self {
        self.alarm_config_id = Some(alarm_config_id.to_owned());
        self.alarm_config_name = Some(alarm_config_name.to_owned());
        self
    }

    /// Return this instance with the trigger condition set.
    pub fn with_term_spec(mut self, term_spec: TermSpec) -> Self {
        self.term_spec = Some(term_spec);
        self
    }
}
