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


#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod dbp;
pub mod common {
    //! Objects shared by all providers.

    mod platform_error;

    pub use self::platform_error::PlatformError;
    pub use self::platform_error::PlatformErrorKind;
}
pub mod device {
    //! Product catalog and device registry objects.

    mod device_metadata;
    mod device_product;
    mod product_operator;

    pub use self::device_metadata::DeviceMetadata;
    pub use self::device_metadata::EventMetadata;
    pub use self::device_metadata::PropertyMetadata;
    pub use self::device_product::DeviceProduct;
    pub use self::product_operator::ProductOperator;
    pub use self::product_operator::RegisteredProductOperator;
}
pub mod index {
    //! Search index schema and documents.

    mod index_metadata;
    mod property_type;

    pub use self::index_metadata::IndexMetadata;
    pub use self::index_metadata::IndexPropertyMetadata;
    pub use self::property_type::PropertyType;

    /// A document stored in a search index.
    ///
    /// Field names are the JSON property names of the indexed record.
    pub type IndexDocument = serde_json::Map<String, serde_json::Value>;
}
pub mod query {
    //! Filter, paging and aggregation parameters.

    mod aggregation_data;
    mod aggregation_query_param;
    mod pager_result;
    mod query_param;
    mod sort;
    mod term;

    pub use self::aggregation_data::AggregationData;
    pub use self::aggregation_query_param::Aggregation;
    pub use self::aggregation_query_param::AggregationColumn;
    pub use self::aggregation_query_param::AggregationQueryParam;
    pub use self::aggregation_query_param::GroupBy;
    pub use self::pager_result::PagerResult;
    pub use self::query_param::QueryParam;
    pub use self::sort::Sort;
    pub use self::sort::SortOrder;
    pub use self::term::Term;
    pub use self::term::TermType;
}
