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


//! API resource for product catalog maintenance.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::put;
use actix_web::web::Data;
use actix_web::web::Json;
use actix_web::web::Path;
use iotdm_dbp::device::DeviceProduct;

/// Create or replace a product in the catalog.
///
/// The product identifier of the path takes precedence over any identifier
/// in the request body.
#[utoipa::path(
    tag = "catalog",
    params(
        ("product_id", description = "Product identifier."),
    ),
    request_body(
        content = Object,
        description = "Product with `name` and optional `description` and `classifiedId`.",
        content_type = "application/json",
    ),
    responses(
        (status = 204, description = "Successfully stored the product."),
        (status = 400, description = "Bad Request."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[put("/products/{product_id}")]
pub async fn product_upsert(
    app_state: Data<AppState>,
    path: Path<String>,
    product: Json<DeviceProduct>,
) -> Result<HttpResponse, Error> {
    let product_id = path.into_inner();
    app_state
        .dm
        .product_facade()
        .product_upsert(product.into_inner().with_id(&product_id))
        .await
        .map_err(ApiErrorMapper::from_platform_error)
        .map(|_| HttpResponse::build(StatusCode::NO_CONTENT).finish())
}
