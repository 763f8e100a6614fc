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


//! Alarm history kept in a search index.

use super::AlarmHistoryInfo;
use super::AlarmHistoryService;
use crate::util::LogScopeDuration;
use futures::StreamExt;
use futures::stream::BoxStream;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::dbp::DatabaseProvider;
use iotdm_dbp::dbp::facades::DatabaseProviderFacades;
use iotdm_dbp::index::IndexDocument;
use iotdm_dbp::index::IndexMetadata;
use iotdm_dbp::index::PropertyType;
use iotdm_dbp::query::AggregationData;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::PagerResult;
use iotdm_dbp::query::QueryParam;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/** [AlarmHistoryService] backed by a single search index.

This is the only component accessing the index and owns its schema. The
trigger condition (`termSpec`) is stored as JSON text since the index schema
declares it as a plain String.
*/
pub struct SearchIndexAlarmHistoryService {
    dbp: Arc<DatabaseProvider>,
    schema_init_timeout: Duration,
}

impl SearchIndexAlarmHistoryService {
    /// Name of the alarm history index.
    pub const ALARM_HISTORY_INDEX: &'static str = "alarm_history";

    /// Return a new instance.
    ///
    /// [AlarmHistoryService::init] will fail if the schema was not declared
    /// within `schema_init_timeout`.
    pub fn new(dbp: &Arc<DatabaseProvider>, schema_init_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            dbp: Arc::clone(dbp),
            schema_init_timeout,
        })
    }

    /// Schema of the alarm history index.
    pub fn index_metadata() -> IndexMetadata {
        IndexMetadata::new(Self::ALARM_HISTORY_INDEX)
            .add_property("id", PropertyType::String)
            .add_property("alarmConfigId", PropertyType::String)
            .add_property("alarmConfigName", PropertyType::String)
            .add_property("alarmRecordId", PropertyType::String)
            .add_property("level", PropertyType::Int)
            .add_property("description", PropertyType::String)
            .add_property("alarmTime", PropertyType::DateTime)
            .add_property("targetType", PropertyType::String)
            .add_property("targetName", PropertyType::String)
            .add_property("targetId", PropertyType::String)
            .add_property("sourceType", PropertyType::String)
            .add_property("sourceName", PropertyType::String)
            .add_property("sourceId", PropertyType::String)
            .add_property("alarmInfo", PropertyType::String)
            .add_property("creatorId", PropertyType::String)
            .add_property(AlarmHistoryInfo::TERM_SPEC, PropertyType::String)
            .add_property("triggerDesc", PropertyType::String)
            .add_property("actualDesc", PropertyType::String)
            .add_property("alarmConfigSource", PropertyType::String)
    }

    /// Convert a record to its stored form.
    ///
    /// All properties pass through unchanged, except the trigger condition
    /// that is flattened to JSON text when present.
    fn create_data(history_info: &AlarmHistoryInfo) -> Result<IndexDocument, PlatformError> {
        let mut document = match serde_json::to_value(history_info) {
            Ok(Value::Object(document)) => document,
            Ok(other) => {
                return Err(PlatformErrorKind::Unspecified
                    .error_with_msg(format!("Record was not serialized as an object: {other}")));
            }
            Err(e) => {
                return Err(PlatformErrorKind::Unspecified
                    .error_with_msg(format!("Failed to serialize record: {e}")));
            }
        };
        document.remove(AlarmHistoryInfo::TERM_SPEC);
        if let Some(term_spec) = &history_info.term_spec {
            document.insert(
                AlarmHistoryInfo::TERM_SPEC.to_owned(),
                Value::String(term_spec.to_flattened()),
            );
        }
        Ok(document)
    }

    /// Restore a record from its stored form.
    fn from_data(document: IndexDocument) -> Result<AlarmHistoryInfo, PlatformError> {
        serde_json::from_value(Value::Object(document)).map_err(|e| {
            PlatformErrorKind::IndexOperationFailed
                .error_with_msg(format!("Unable to parse stored alarm history: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl AlarmHistoryService for SearchIndexAlarmHistoryService {
    async fn init(&self) -> Result<(), PlatformError> {
        let _lsd = LogScopeDuration::new(
            log::Level::Debug,
            module_path!(),
            "alarm history schema init",
            0,
        );
        tokio::time::timeout(
            self.schema_init_timeout,
            self.dbp.index_facade().index_put(Self::index_metadata()),
        )
        .await
        .map_err(|_elapsed| {
            PlatformErrorKind::Timeout.error_with_msg(format!(
                "Declaring index '{}' did not complete within {} ms.",
                Self::ALARM_HISTORY_INDEX,
                self.schema_init_timeout.as_millis()
            ))
        })?
    }

    async fn save(&self, history_info: AlarmHistoryInfo) -> Result<(), PlatformError> {
        let document = Self::create_data(&history_info)?;
        self.dbp
            .index_facade()
            .documents_save(Self::ALARM_HISTORY_INDEX, vec![document])
            .await
    }

    async fn save_all(&self, history_infos: Vec<AlarmHistoryInfo>) -> Result<(), PlatformError> {
        if history_infos.is_empty() {
            return Ok(());
        }
        let documents = history_infos
            .iter()
            .map(Self::create_data)
            .collect::<Result<Vec<_>, _>>()?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Saving {} alarm history records.", documents.len());
        }
        self.dbp
            .index_facade()
            .documents_save(Self::ALARM_HISTORY_INDEX, documents)
            .await
    }

    fn query(
        &self,
        query_param: &QueryParam,
    ) -> BoxStream<'static, Result<AlarmHistoryInfo, PlatformError>> {
        self.dbp
            .index_facade()
            .documents_query(Self::ALARM_HISTORY_INDEX, query_param)
            .map(|res| res.and_then(Self::from_data))
            .boxed()
    }

    async fn query_pager(
        &self,
        query_param: &QueryParam,
    ) -> Result<PagerResult<AlarmHistoryInfo>, PlatformError> {
        self.dbp
            .index_facade()
            .documents_query_page(Self::ALARM_HISTORY_INDEX, query_param)
            .await?
            .try_map(Self::from_data)
    }

    async fn count(&self, query_param: &QueryParam) -> Result<u64, PlatformError> {
        self.dbp
            .index_facade()
            .documents_count(Self::ALARM_HISTORY_INDEX, query_param)
            .await
    }

    fn aggregation(
        &self,
        aggregation_param: &AggregationQueryParam,
    ) -> BoxStream<'static, Result<AggregationData, PlatformError>> {
        self.dbp
            .index_facade()
            .documents_aggregate(Self::ALARM_HISTORY_INDEX, aggregation_param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::TermSpec;
    use futures::TryStreamExt;
    use iotdm_dbp::dbp::facades::IndexFacade;
    use iotdm_dbp::query::Aggregation;
    use iotdm_dbp::query::SortOrder;
    use iotdm_dbp::query::TermType;
    use iotdm_dbp_mem::InMemoryDatabaseProvider;
    use serde_json::json;

    pub fn initialize_env_logger() {
        env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init()
            .map_err(|e| {
                log::trace!("Env logger for testing was probably already initialized: {e:?}")
            })
            .ok();
    }

    async fn service() -> (Arc<InMemoryDatabaseProvider>, Arc<SearchIndexAlarmHistoryService>) {
        initialize_env_logger();
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let dbp = Arc::new(inmem_provider.as_database_provider());
        let service = SearchIndexAlarmHistoryService::new(&dbp, Duration::from_secs(10));
        service.init().await.unwrap();
        (inmem_provider, service)
    }

    fn example_record() -> AlarmHistoryInfo {
        AlarmHistoryInfo::new("a1", 2, 1_700_000_000_000)
            .with_target("device", "d1", "Boiler sensor")
            .with_term_spec(TermSpec::new(json!({"x": 1})))
    }

    #[tokio::test]
    async fn test_save_and_query_example() {
        let (_inmem_provider, service) = service().await;
        service.save(example_record()).await.unwrap();
        let records = service
            .query(&QueryParam::new().where_eq("targetId", "d1"))
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a1");
        assert_eq!(records[0].level, 2);
        assert_eq!(
            records[0].term_spec.as_ref().map(TermSpec::as_value),
            Some(&json!({"x": 1}))
        );
        assert_eq!(records[0], example_record());
    }

    #[tokio::test]
    async fn test_records_without_id_are_appended() {
        let (_inmem_provider, service) = service().await;
        let record = AlarmHistoryInfo::new("", 1, 1_700_000_000_000)
            .with_source("scene", "s1", "Night shift")
            .with_alarm_config("c1", "Overheating");
        service.save(record.clone()).await.unwrap();
        service.save(record).await.unwrap();
        let query_param = QueryParam::new().where_eq("alarmConfigId", "c1");
        assert_eq!(service.count(&query_param).await.unwrap(), 2);
        let records = service
            .query(&query_param)
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(records[1].source_id.as_deref(), Some("s1"));
        assert_eq!(records[1].alarm_config_name.as_deref(), Some("Overheating"));
    }

    #[tokio::test]
    async fn test_term_spec_is_stored_flattened() {
        let (inmem_provider, service) = service().await;
        let term_spec = json!({"terms": [{"column": "temperature", "termType": "gt", "value": 42}]});
        service
            .save(example_record().with_term_spec(TermSpec::new(term_spec.clone())))
            .await
            .unwrap();
        service
            .save(AlarmHistoryInfo::new("a2", 1, 1_700_000_000_001))
            .await
            .unwrap();
        let stored = inmem_provider
            .as_database_provider()
            .index_facade()
            .documents_query(
                SearchIndexAlarmHistoryService::ALARM_HISTORY_INDEX,
                &QueryParam::new().order_by("id", SortOrder::Asc),
            )
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        let flattened = stored[0][AlarmHistoryInfo::TERM_SPEC].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(flattened).unwrap(), term_spec);
        assert!(!stored[1].contains_key(AlarmHistoryInfo::TERM_SPEC));
        let restored = service
            .query(&QueryParam::new().where_eq("id", "a2"))
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert!(restored[0].term_spec.is_none());
    }

    #[tokio::test]
    async fn test_count_matches_query() {
        let (_inmem_provider, service) = service().await;
        service
            .save_all(
                (0..10)
                    .map(|i| {
                        AlarmHistoryInfo::new(&format!("r{i}"), i % 3, 1_000 * i64::from(i))
                            .with_target("device", &format!("d{}", i % 2), "")
                    })
                    .collect(),
            )
            .await
            .unwrap();
        for query_param in [
            QueryParam::new(),
            QueryParam::new().where_eq("targetId", "d0"),
            QueryParam::new().and("level", TermType::Gte, 1),
            QueryParam::new().and("targetId", TermType::Like, "d%").page(1, 2),
            QueryParam::new().where_eq("targetId", "none"),
        ] {
            let queried = service
                .query(&query_param)
                .try_collect::<Vec<_>>()
                .await
                .unwrap();
            let count = service.count(&query_param).await.unwrap();
            assert_eq!(count, u64::try_from(queried.len()).unwrap());
        }
        let page = service
            .query_pager(
                &QueryParam::new()
                    .where_eq("targetId", "d0")
                    .order_by("alarmTime", SortOrder::Desc)
                    .page(0, 3),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(
            page.data.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["r8", "r6", "r4"]
        );
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (inmem_provider, service) = service().await;
        let once = inmem_provider
            .index_metadata(SearchIndexAlarmHistoryService::ALARM_HISTORY_INDEX)
            .unwrap();
        service.init().await.unwrap();
        let twice = inmem_provider
            .index_metadata(SearchIndexAlarmHistoryService::ALARM_HISTORY_INDEX)
            .unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, SearchIndexAlarmHistoryService::index_metadata());
        assert_eq!(
            once.get_property_type(AlarmHistoryInfo::TERM_SPEC),
            Some(PropertyType::String)
        );
        assert_eq!(once.get_property_type("level"), Some(PropertyType::Int));
        assert_eq!(
            once.get_property_type("alarmTime"),
            Some(PropertyType::DateTime)
        );
    }

    #[tokio::test]
    async fn test_aggregation_by_target_type() {
        let (_inmem_provider, service) = service().await;
        service
            .save_all(vec![
                AlarmHistoryInfo::new("1", 1, 10).with_target("device", "d1", ""),
                AlarmHistoryInfo::new("2", 3, 20).with_target("device", "d2", ""),
                AlarmHistoryInfo::new("3", 2, 30).with_target("product", "p1", ""),
            ])
            .await
            .unwrap();
        let buckets = service
            .aggregation(
                &AggregationQueryParam::new()
                    .group_by_property("targetType", "type")
                    .agg(Aggregation::Count, "id", "total")
                    .time_range("alarmTime", Some(15), None),
            )
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].get_str("type"), Some("device"));
        assert_eq!(buckets[0].get_i64("total"), Some(1));
        assert_eq!(buckets[1].get_str("type"), Some("product"));
        assert_eq!(buckets[1].get_i64("total"), Some(1));
    }

    /// Index facade that never completes declaring a schema.
    struct StalledIndexFacade {}

    #[async_trait::async_trait]
    impl IndexFacade for StalledIndexFacade {
        async fn index_put(&self, _metadata: IndexMetadata) -> Result<(), PlatformError> {
            futures::future::pending().await
        }
        async fn documents_save(
            &self,
            _index: &str,
            _documents: Vec<IndexDocument>,
        ) -> Result<(), PlatformError> {
            Err(PlatformErrorKind::IndexOperationFailed.error())
        }
        fn documents_query(
            &self,
            _index: &str,
            _query_param: &QueryParam,
        ) -> BoxStream<'static, Result<IndexDocument, PlatformError>> {
            futures::stream::once(async {
                Err(PlatformErrorKind::IndexOperationFailed.error())
            })
            .boxed()
        }
        async fn documents_query_page(
            &self,
            _index: &str,
            _query_param: &QueryParam,
        ) -> Result<PagerResult<IndexDocument>, PlatformError> {
            Err(PlatformErrorKind::IndexOperationFailed.error())
        }
        async fn documents_count(
            &self,
            _index: &str,
            _query_param: &QueryParam,
        ) -> Result<u64, PlatformError> {
            Err(PlatformErrorKind::IndexOperationFailed.error())
        }
        fn documents_aggregate(
            &self,
            _index: &str,
            _aggregation_param: &AggregationQueryParam,
        ) -> BoxStream<'static, Result<AggregationData, PlatformError>> {
            futures::stream::empty().boxed()
        }
    }

    struct StalledProviderFacades {
        inner: DatabaseProvider,
        index_facade: StalledIndexFacade,
    }

    impl DatabaseProviderFacades for StalledProviderFacades {
        fn device_registry_facade(&self) -> &dyn iotdm_dbp::dbp::facades::DeviceRegistryFacade {
            self.inner.device_registry_facade()
        }
        fn index_facade(&self) -> &dyn IndexFacade {
            &self.index_facade
        }
        fn product_facade(&self) -> &dyn iotdm_dbp::dbp::facades::ProductFacade {
            self.inner.product_facade()
        }
    }

    #[tokio::test]
    async fn test_init_timeout_and_failure_propagation() {
        initialize_env_logger();
        let inmem_provider = InMemoryDatabaseProvider::new().await;
        let dbp = Arc::new(DatabaseProvider::new(Arc::new(StalledProviderFacades {
            inner: inmem_provider.as_database_provider(),
            index_facade: StalledIndexFacade {},
        })));
        let service = SearchIndexAlarmHistoryService::new(&dbp, Duration::from_millis(50));
        let e = service.init().await.unwrap_err();
        assert_eq!(e.kind(), &PlatformErrorKind::Timeout);
        let e = service.save(example_record()).await.unwrap_err();
        assert_eq!(e.kind(), &PlatformErrorKind::IndexOperationFailed);
        let e = service.count(&QueryParam::new()).await.unwrap_err();
        assert_eq!(e.kind(), &PlatformErrorKind::IndexOperationFailed);
        let e = service
            .query(&QueryParam::new())
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert_eq!(e.kind(), &PlatformErrorKind::IndexOperationFailed);
    }
}
