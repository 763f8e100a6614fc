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


//! Filter criteria with sorting and paging.

use super::Sort;
use super::SortOrder;
use super::Term;
use super::TermType;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Filter criteria for querying a search index.
///
/// All terms must match (conjunction). Sorting is applied in order of
/// declaration. Paging is only honored by paged queries; plain queries and
/// counts always consider every matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParam {
    /// Terms that all must match.
    #[serde(default)]
    pub terms: Vec<Term>,
    /// Requested ordering of results.
    #[serde(default)]
    pub sorts: Vec<Sort>,
    /// Zero-based page index.
    #[serde(default)]
    pub page_index: usize,
    /// Maximum number of documents in a page.
    #[serde(default = "QueryParam::default_page_size")]
    pub page_size: usize,
}

impl Default for QueryParam {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            sorts: Vec::new(),
            page_index: 0,
            page_size: Self::default_page_size(),
        }
    }
}

impl QueryParam {
    const DEFAULT_PAGE_SIZE: usize = 25;

    fn default_page_size() -> usize {
        Self::DEFAULT_PAGE_SIZE
    }

    /// Return a new instance matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this instance with an additional term.
    pub fn and<V: Into<Value>>(mut self, column: &str, term_type: TermType, value: V) -> Self {
        self.terms.push(Term::new(column, term_type, value.into()));
        self
    }

    /// Return this instance with an additional equality term.
    pub fn where_eq<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.and(column, TermType::Eq, value)
    }

    /// Return this instance with an additional sort.
    pub fn order_by(mut self, name: &str, order: SortOrder) -> Self {
        self.sorts.push(Sort::new(name, order));
        self
    }

    /// Return this instance with the page selected.
    pub fn page(mut self, page_index: usize, page_size: usize) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Offset of the first document of the selected page.
    pub fn first_index(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let query_param: QueryParam =
            serde_json::from_str(r#"{"terms":[{"column":"targetId","value":"d1"}]}"#).unwrap();
        assert_eq!(query_param.page_size, 25);
        assert_eq!(query_param.page_index, 0);
        assert_eq!(query_param.terms[0].term_type, TermType::Eq);
        assert_eq!(
            query_param,
            QueryParam::new().where_eq("targetId", "d1")
        );
    }

    #[test]
    fn test_first_index() {
        assert_eq!(QueryParam::new().page(3, 10).first_index(), 30);
        assert_eq!(QueryParam::new().page(usize::MAX, 10).first_index(), usize::MAX);
    }
}
