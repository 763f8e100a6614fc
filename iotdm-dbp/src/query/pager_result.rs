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


//! A single page of results.

use serde::Deserialize;
use serde::Serialize;

/// A page of results and the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerResult<T> {
    /// Zero-based page index.
    pub page_index: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Total number of matching items regardless of paging.
    pub total: u64,
    /// Items on this page.
    pub data: Vec<T>,
}

impl<T> PagerResult<T> {
    /// Return a new instance.
    pub fn new(page_index: usize, page_size: usize, total: u64, data: Vec<T>) -> Self {
        Self {
            page_index,
            page_size,
            total,
            data,
        }
    }

    /// Return a new instance where the fallible `mapper` has been applied to
    /// each item.
    pub fn try_map<U, E, F>(self, mapper: F) -> Result<PagerResult<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(PagerResult {
            page_index: self.page_index,
            page_size: self.page_size,
            total: self.total,
            data: self
                .data
                .into_iter()
                .map(mapper)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
