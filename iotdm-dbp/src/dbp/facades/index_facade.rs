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


//! Database facade for operations on search indices.

use crate::common::PlatformError;
use crate::index::IndexDocument;
use crate::index::IndexMetadata;
use crate::query::AggregationData;
use crate::query::AggregationQueryParam;
use crate::query::PagerResult;
use crate::query::QueryParam;
use futures::stream::BoxStream;

/// Database facade for operations on search indices.
///
/// Failures are reported as
/// [PlatformErrorKind::IndexOperationFailed](crate::common::PlatformErrorKind::IndexOperationFailed).
#[async_trait::async_trait]
pub trait IndexFacade: Send + Sync {
    /// Declare the schema of an index.
    ///
    /// Declaring the same schema again has no further effect. Existing
    /// documents are retained.
    async fn index_put(&self, metadata: IndexMetadata) -> Result<(), PlatformError>;

    /// Persist documents.
    ///
    /// A document with an `id` replaces any earlier document with the same
    /// `id`. Saving multiple documents is not atomic.
    async fn documents_save(
        &self,
        index: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<(), PlatformError>;

    /// Lazily stream all documents matching the filter.
    ///
    /// Paging of the [QueryParam] is ignored. Order is backend defined unless
    /// sorts are requested.
    fn documents_query(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> BoxStream<'static, Result<IndexDocument, PlatformError>>;

    /// Return the requested page of matching documents and the total number of
    /// matches.
    async fn documents_query_page(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> Result<PagerResult<IndexDocument>, PlatformError>;

    /// Return the number of matching documents.
    async fn documents_count(
        &self,
        index: &str,
        query_param: &QueryParam,
    ) -> Result<u64, PlatformError>;

    /// Lazily stream aggregation buckets.
    fn documents_aggregate(
        &self,
        index: &str,
        aggregation_param: &AggregationQueryParam,
    ) -> BoxStream<'static, Result<AggregationData, PlatformError>>;
}
