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


//! API resources for live device registry maintenance.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::delete;
use actix_web::http::StatusCode;
use actix_web::put;
use actix_web::web::Data;
use actix_web::web::Json;
use actix_web::web::Path;
use iotdm_dbp::device::DeviceMetadata;

/// Register a live operator for a product.
///
/// Replaces any earlier registration of the same product.
#[utoipa::path(
    tag = "registry",
    params(
        ("product_id", description = "Product identifier."),
    ),
    request_body(
        content = Object,
        description = "Device metadata with `properties` and `events` definitions.",
        content_type = "application/json",
    ),
    responses(
        (status = 204, description = "Successfully registered the product."),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[put("/registry/products/{product_id}")]
pub async fn registry_product_register(
    app_state: Data<AppState>,
    path: Path<String>,
    metadata: Json<DeviceMetadata>,
) -> Result<HttpResponse, Error> {
    let product_id = path.into_inner();
    app_state
        .dm
        .device_registry_facade()
        .product_register(&product_id, metadata.into_inner())
        .await
        .map_err(ApiErrorMapper::from_platform_error)
        .map(|_| HttpResponse::build(StatusCode::NO_CONTENT).finish())
}

/// Remove the live operator of a product.
#[utoipa::path(
    tag = "registry",
    params(
        ("product_id", description = "Product identifier."),
    ),
    responses(
        (status = 204, description = "Successfully unregistered the product."),
        (status = 404, description = "The product was not registered."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[delete("/registry/products/{product_id}")]
pub async fn registry_product_unregister(
    app_state: Data<AppState>,
    path: Path<String>,
) -> Result<HttpResponse, Error> {
    let product_id = path.into_inner();
    let existed = app_state
        .dm
        .device_registry_facade()
        .product_unregister(&product_id)
        .await
        .map_err(ApiErrorMapper::from_platform_error)?;
    if existed {
        Ok(HttpResponse::build(StatusCode::NO_CONTENT).finish())
    } else {
        Ok(HttpResponse::build(StatusCode::NOT_FOUND).finish())
    }
}
