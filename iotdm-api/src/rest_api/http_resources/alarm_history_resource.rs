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


//! API resources for the alarm history.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::post;
use actix_web::web::Bytes;
use actix_web::web::Data;
use actix_web::web::Json;
use futures::StreamExt;
use futures::TryStreamExt;
use iotdm_core::alarm::AlarmHistoryInfo;
use iotdm_core::util::LogScopeDuration;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::query::AggregationQueryParam;
use iotdm_dbp::query::QueryParam;

/// Append one alarm history record.
#[utoipa::path(
    tag = "alarm",
    request_body(
        content = Object,
        description = "Alarm history record. A `termSpec` is stored as text and returned structured.",
        content_type = "application/json",
    ),
    responses(
        (status = 204, description = "Successfully saved the record."),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/alarm/history")]
pub async fn alarm_history_save(
    app_state: Data<AppState>,
    history_info: Json<AlarmHistoryInfo>,
) -> Result<HttpResponse, Error> {
    app_state
        .dm
        .alarm_history_service()
        .save(history_info.into_inner())
        .await
        .map_err(ApiErrorMapper::from_platform_error)
        .map(|_| HttpResponse::build(StatusCode::NO_CONTENT).finish())
}

/// Append multiple alarm history records.
///
/// Saving is not atomic. On failure some records might have been saved.
#[utoipa::path(
    tag = "alarm",
    request_body(
        content = Object,
        description = "JSON array of alarm history records.",
        content_type = "application/json",
    ),
    responses(
        (status = 204, description = "Successfully saved all records."),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/alarm/history/_batch")]
pub async fn alarm_history_save_batch(
    app_state: Data<AppState>,
    history_infos: Json<Vec<AlarmHistoryInfo>>,
) -> Result<HttpResponse, Error> {
    let _log_scope_duration = LogScopeDuration::new(
        log::Level::Debug,
        module_path!(),
        "alarm_history_save_batch",
        100,
    );
    app_state
        .dm
        .alarm_history_service()
        .save_all(history_infos.into_inner())
        .await
        .map_err(ApiErrorMapper::from_platform_error)
        .map(|_| HttpResponse::build(StatusCode::NO_CONTENT).finish())
}

/// Return all alarm history records matching the filter.
///
/// Paging parameters are ignored.
#[utoipa::path(
    tag = "alarm",
    request_body(
        content = Object,
        description = "Query with `terms` and `sorts`.",
        content_type = "application/json",
    ),
    responses(
        (
            status = 200,
            description = "Return a JSON array of matching records.",
            content_type = "application/json",
        ),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/alarm/history/_query")]
pub async fn alarm_history_query(
    app_state: Data<AppState>,
    query_param: Json<QueryParam>,
) -> Result<HttpResponse, Error> {
    let mut history_infos = app_state.dm.alarm_history_service().query(&query_param);
    // Backend failures before the first record still yield an error status
    let first = history_infos
        .try_next()
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    let elements = futures::stream::iter(first.map(Ok))
        .chain(history_infos)
        .enumerate()
        .map(|(i, res)| {
            let json = res.and_then(|history_info| {
                serde_json::to_vec(&history_info).map_err(|e| {
                    PlatformErrorKind::Unspecified
                        .error_with_msg(format!("Failed to serialize record: {e}"))
                })
            });
            match json {
                Ok(json) => {
                    let separator: &[u8] = if i == 0 { b"" } else { b"," };
                    Ok(Bytes::from([separator, json.as_slice()].concat()))
                }
                Err(e) => {
                    log::warn!("Aborting alarm history response: {e}");
                    Err(e)
                }
            }
        });
    let body = futures::stream::once(async { Ok(Bytes::from_static(b"[")) })
        .chain(elements)
        .chain(futures::stream::once(async { Ok(Bytes::from_static(b"]")) }));
    Ok(HttpResponse::build(StatusCode::OK)
        .content_type(ContentType::json())
        .streaming::<_, PlatformError>(body))
}

/// Return one page of alarm history records matching the filter and the
/// total number of matches.
#[utoipa::path(
    tag = "alarm",
    request_body(
        content = Object,
        description = "Query with `terms`, `sorts`, zero-based `pageIndex` and `pageSize`.",
        content_type = "application/json",
    ),
    responses(
        (
            status = 200,
            description = "Return the page with `pageIndex`, `pageSize`, `total` and `data`.",
            content_type = "application/json",
        ),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/alarm/history/_query/_page")]
pub async fn alarm_history_query_page(
    app_state: Data<AppState>,
    query_param: Json<QueryParam>,
) -> Result<HttpResponse, Error> {
    let pager_result = app_state
        .dm
        .alarm_history_service()
        .query_pager(&query_param)
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    Ok(HttpResponse::build(StatusCode::OK).json(pager_result))
}

/// Return the number of alarm history records matching the filter.
#[utoipa::path(
    tag = "alarm",
    request_body(
        content = Object,
        description = "Query with `terms`.",
        content_type = "application/json",
    ),
    responses(
        (
            status = 200,
            description = "Return the number of matching records.",
            content_type = "application/json",
        ),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/alarm/history/_count")]
pub async fn alarm_history_count(
    app_state: Data<AppState>,
    query_param: Json<QueryParam>,
) -> Result<HttpResponse, Error> {
    let count = app_state
        .dm
        .alarm_history_service()
        .count(&query_param)
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    Ok(HttpResponse::build(StatusCode::OK).json(count))
}

/// Aggregate matching alarm history records into buckets.
#[utoipa::path(
    tag = "alarm",
    request_body(
        content = Object,
        description = "Aggregation with `aggColumns`, `groupBy`, `queryParam`, time range and `limit`.",
        content_type = "application/json",
    ),
    responses(
        (
            status = 200,
            description = "Return a JSON array with one object per bucket.",
            content_type = "application/json",
        ),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/alarm/history/_aggregation")]
pub async fn alarm_history_aggregation(
    app_state: Data<AppState>,
    aggregation_param: Json<AggregationQueryParam>,
) -> Result<HttpResponse, Error> {
    let buckets = app_state
        .dm
        .alarm_history_service()
        .aggregation(&aggregation_param)
        .try_collect::<Vec<_>>()
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    Ok(HttpResponse::build(StatusCode::OK).json(buckets))
}
