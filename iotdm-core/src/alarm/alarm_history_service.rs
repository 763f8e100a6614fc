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


//! Alarm history service contract.

use super::AlarmHistoryInfo;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::query::AggregationData;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::PagerResult;
use iotdm_dbp::query::QueryParam;

/// Persistence, queries and aggregation of alarm history.
///
/// Backend failures are propagated without retries.
#[async_trait::async_trait]
pub trait AlarmHistoryService: Send + Sync {
    /// Declare the storage schema.
    ///
    /// Must complete once before first use. Repeated calls re-declare the same
    /// schema. A failure should be treated as fatal to startup.
    async fn init(&self) -> Result<(), PlatformError>;

    /// Persist a single record.
    async fn save(&self, history_info: AlarmHistoryInfo) -> Result<(), PlatformError>;

    /// Persist multiple records. Not atomic.
    async fn save_all(&self, history_infos: Vec<AlarmHistoryInfo>) -> Result<(), PlatformError>;

    /// Lazily stream all records matching the filter.
    fn query(
        &self,
        query_param: &QueryParam,
    ) -> BoxStream<'static, Result<AlarmHistoryInfo, PlatformError>>;

    /// Return one page of matching records and the total number of matches.
    async fn query_pager(
        &self,
        query_param: &QueryParam,
    ) -> Result<PagerResult<AlarmHistoryInfo>, PlatformError>;

    /// Return the number of matching records.
    async fn count(&self, query_param: &QueryParam) -> Result<u64, PlatformError>;

    /// Lazily stream aggregation buckets computed by the backend.
    fn aggregation(
        &self,
        aggregation_param: &AggregationQueryParam,
    ) -> BoxStream<'static, Result<AggregationData, PlatformError>>;
}
