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


//! Ephemeral in-memory implementation of [DatabaseProvider].

mod inmem_facades;
mod inmem_index;

use self::inmem_facades::InMemProviderFacades;
use self::inmem_index::InMemIndex;
use crossbeam_skiplist::SkipMap;
use iotdm_dbp::dbp::DatabaseProvider;
use iotdm_dbp::device::DeviceProduct;
use iotdm_dbp::device::RegisteredProductOperator;
use iotdm_dbp::index::IndexMetadata;
use std::sync::Arc;

/// Ephemeral in-memory implementation of [DatabaseProvider].
pub struct InMemoryDatabaseProvider {
    products: SkipMap<String, DeviceProduct>,
    registry: SkipMap<String, Arc<RegisteredProductOperator>>,
    index_metadata: SkipMap<String, IndexMetadata>,
    indices: SkipMap<String, Arc<InMemIndex>>,
}

impl InMemoryDatabaseProvider {
    /// Return a new instance.
    pub async fn new() -> Arc<Self> {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Using in-mem db provider.");
        }
        Arc::new(Self {
            products: SkipMap::default(),
            registry: SkipMap::default(),
            index_metadata: SkipMap::default(),
            indices: SkipMap::default(),
        })
    }

    /// Get [DatabaseProvider] instance.
    pub fn as_database_provider(self: &Arc<Self>) -> DatabaseProvider {
        DatabaseProvider::new(Arc::new(InMemProviderFacades::new(self)))
    }

    /// Return the declared schema of an index.
    pub fn index_metadata(&self, index: &str) -> Option<IndexMetadata> {
        self.index_metadata
            .get(index)
            .map(|entry| entry.value().to_owned())
    }

    /// Get an index, creating it on first use.
    fn index_by_name(&self, index: &str) -> Arc<InMemIndex> {
        Arc::clone(
            self.indices
                .get_or_insert_with(index.to_owned(), Arc::default)
                .value(),
        )
    }

    /// Get an index if any documents have been saved to it.
    fn index_by_name_if_exists(&self, index: &str) -> Option<Arc<InMemIndex>> {
        self.indices
            .get(index)
            .map(|entry| Arc::clone(entry.value()))
    }
}
