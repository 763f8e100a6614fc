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


//! API resources for dashboard objects.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::get;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::web::Path;
use futures::TryStreamExt;
use iotdm_core::PlatformError;
use iotdm_core::dashboard::Dashboard;
use iotdm_core::dashboard::DashboardObject;
use iotdm_core::dashboard::MeasurementDefinition;
use iotdm_core::util::LogScopeDuration;
use serde::Serialize;
use std::sync::Arc;

/// Dashboard object with the measurements it currently provides.
#[derive(Debug, Serialize)]
struct DashboardObjectResponse {
    id: String,
    name: String,
    measurements: Vec<MeasurementDefinition>,
}

impl DashboardObjectResponse {
    async fn of(dashboard_object: &Arc<dyn DashboardObject>) -> Result<Self, PlatformError> {
        let definition = dashboard_object.definition();
        Ok(Self {
            id: definition.get_id().to_owned(),
            name: definition.get_name().to_owned(),
            measurements: dashboard_object.measurements().await?,
        })
    }
}

/// Return the dashboard if it is served by this API.
fn dashboard_by_id<'a>(app_state: &'a AppState, dashboard_id: &str) -> Option<&'a Arc<dyn Dashboard>> {
    Some(app_state.dm.device_dashboard())
        .filter(|dashboard| dashboard.definition().get_id() == dashboard_id)
}

/// List all objects of a dashboard.
///
/// The device dashboard lists every catalog product that currently has a
/// live registry entry.
#[utoipa::path(
    tag = "dashboard",
    params(
        ("dashboard_id", description = "Dashboard identifier. E.g. `device`."),
    ),
    responses(
        (
            status = 200,
            description = "Return all dashboard objects.",
            content_type = "application/json",
        ),
        (status = 404, description = "No such dashboard."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[get("/dashboards/{dashboard_id}/objects")]
pub async fn dashboard_objects(
    app_state: Data<AppState>,
    path: Path<String>,
) -> Result<HttpResponse, Error> {
    let _log_scope_duration =
        LogScopeDuration::new(log::Level::Trace, module_path!(), "dashboard_objects", 0);
    let dashboard_id = path.into_inner();
    let Some(dashboard) = dashboard_by_id(&app_state, &dashboard_id) else {
        return Ok(HttpResponse::build(StatusCode::NOT_FOUND).finish());
    };
    let dashboard_objects = dashboard
        .get_objects()
        .try_collect::<Vec<_>>()
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    let mut response = Vec::with_capacity(dashboard_objects.len());
    for dashboard_object in &dashboard_objects {
        response.push(
            DashboardObjectResponse::of(dashboard_object)
                .await
                .map_err(ApiErrorMapper::from_platform_error)?,
        );
    }
    Ok(HttpResponse::build(StatusCode::OK).json(response))
}

/// Retrieve a single dashboard object by its identifier.
#[utoipa::path(
    tag = "dashboard",
    params(
        ("dashboard_id", description = "Dashboard identifier. E.g. `device`."),
        ("object_id", description = "Object identifier. E.g. the product identifier."),
    ),
    responses(
        (
            status = 200,
            description = "Return the dashboard object.",
            content_type = "application/json",
        ),
        (
            status = 404,
            description = "No such dashboard or the object is not available.",
        ),
        (status = 500, description = "Internal server error."),
    ),
)]
#[get("/dashboards/{dashboard_id}/objects/{object_id}")]
pub async fn dashboard_object_by_id(
    app_state: Data<AppState>,
    path: Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (dashboard_id, object_id) = path.into_inner();
    let Some(dashboard) = dashboard_by_id(&app_state, &dashboard_id) else {
        return Ok(HttpResponse::build(StatusCode::NOT_FOUND).finish());
    };
    let dashboard_object_opt = dashboard
        .get_object(&object_id)
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    if let Some(dashboard_object) = dashboard_object_opt {
        let response = DashboardObjectResponse::of(&dashboard_object)
            .await
            .map_err(ApiErrorMapper::from_platform_error)?;
        Ok(HttpResponse::build(StatusCode::OK).json(response))
    } else {
        Ok(HttpResponse::build(StatusCode::NOT_FOUND).finish())
    }
}
