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


//! REST API server and resources.

mod http_resources {
    //! API resources

    pub mod alarm_history_resource;
    pub mod dashboard_resource;
    pub mod product_resource;
    pub mod registry_resource;
}
mod common {
    //! Common RESP API resources and utils.

    mod api_error_mapper;

    pub use api_error_mapper::*;
}

use self::common::ApiErrorMapper;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::Scope;
use actix_web::get;
use actix_web::http::header::ContentType;
use actix_web::web;
use iotdm_core::AppConfig;
use iotdm_core::DeviceManagement;
use iotdm_core::PlatformErrorKind;
use std::sync::Arc;
use utoipa::OpenApi;

/// Number of parallel requests the can be served for each worker.
const CONNECTIONS_PER_WORKER: usize = 256;
/// Largest accepted JSON request body.
const MAX_JSON_PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Shared state between requests.
#[derive(Clone)]
struct AppState {
    dm: Arc<DeviceManagement>,
}

/// Run HTTP server.
pub async fn run_http_server(
    app_config: &Arc<AppConfig>,
    dm: &Arc<DeviceManagement>,
) -> Result<(), Box<dyn core::error::Error>> {
    let workers = app_config.api.workers();
    let max_connections = CONNECTIONS_PER_WORKER * workers;
    log::info!(
        "API described by http://{}:{}/openapi.json allows {max_connections} concurrent connections.",
        &app_config.api.bind_address(),
        &app_config.api.bind_port(),
    );
    let app_state: AppState = AppState { dm: Arc::clone(dm) };
    let app_data = web::Data::<AppState>::new(app_state);
    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .app_data(json_config())
            .service(web::redirect("/openapi", "/api/v1/openapi.json"))
            .service(web::redirect("/openapi.json", "/api/v1/openapi.json"))
            .service(api_scope())
    })
    .workers(workers)
    .max_connections(max_connections)
    .bind_auto_h2c((app_config.api.bind_address(), app_config.api.bind_port()))?
    .disable_signals()
    .shutdown_timeout(5) // Default 30
    .run()
    .await?;
    Ok(())
}

/// All resources of the versioned API.
fn api_scope() -> Scope {
    web::scope("/api/v1")
        .service(get_openapi)
        .service(http_resources::dashboard_resource::dashboard_objects)
        .service(http_resources::dashboard_resource::dashboard_object_by_id)
        .service(http_resources::product_resource::product_upsert)
        .service(http_resources::registry_resource::registry_product_register)
        .service(http_resources::registry_resource::registry_product_unregister)
        .service(http_resources::alarm_history_resource::alarm_history_save)
        .service(http_resources::alarm_history_resource::alarm_history_save_batch)
        .service(http_resources::alarm_history_resource::alarm_history_query)
        .service(http_resources::alarm_history_resource::alarm_history_query_page)
        .service(http_resources::alarm_history_resource::alarm_history_count)
        .service(http_resources::alarm_history_resource::alarm_history_aggregation)
}

/// Undecodable JSON request bodies are malformed requests.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_PAYLOAD_SIZE)
        .error_handler(|e, _http_request| {
            ApiErrorMapper::from_platform_error(
                PlatformErrorKind::MalformedRequest.error_with_msg(e.to_string()),
            )
        })
}

/// Serve Open API documentation.
#[get("/openapi.json")]
async fn get_openapi() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(openapi_as_string())
}

/// Get the OpenAPI definition as a pretty JSON String.
pub fn openapi_as_string() -> String {
    #[derive(OpenApi)]
    #[openapi(paths(
        http_resources::dashboard_resource::dashboard_objects,
        http_resources::dashboard_resource::dashboard_object_by_id,
        http_resources::product_resource::product_upsert,
        http_resources::registry_resource::registry_product_register,
        http_resources::registry_resource::registry_product_unregister,
        http_resources::alarm_history_resource::alarm_history_save,
        http_resources::alarm_history_resource::alarm_history_save_batch,
        http_resources::alarm_history_resource::alarm_history_query,
        http_resources::alarm_history_resource::alarm_history_query_page,
        http_resources::alarm_history_resource::alarm_history_count,
        http_resources::alarm_history_resource::alarm_history_aggregation,
    ))]
    struct ApiDoc;
    ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|e| log::error!("Failed to serialize OpenAPI document: {e}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::test::call_and_read_body_json;
    use actix_web::test::call_service;
    use actix_web::test::init_service;
    use serde_json::Value;
    use serde_json::json;

    async fn device_management() -> Arc<DeviceManagement> {
        DeviceManagement::new(&Arc::new(AppConfig::with_defaults()))
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_dashboard_object_after_registration() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(AppState {
                    dm: device_management().await,
                }))
                .app_data(json_config())
                .service(api_scope()),
        )
        .await;
        let req = TestRequest::put()
            .uri("/api/v1/products/p1")
            .set_json(json!({"id": "ignored", "name": "Boiler"}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let req = TestRequest::get()
            .uri("/api/v1/dashboards/device/objects/p1")
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = TestRequest::put()
            .uri("/api/v1/registry/products/p1")
            .set_json(json!({
                "properties": [{"id": "temp", "name": "Temperature", "valueType": "double"}]
            }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let req = TestRequest::get()
            .uri("/api/v1/dashboards/device/objects")
            .to_request();
        let objects: Value = call_and_read_body_json(&app, req).await;
        assert_eq!(objects[0]["id"], json!("p1"));
        assert_eq!(objects[0]["name"], json!("Boiler"));
        assert_eq!(objects[0]["measurements"].as_array().map(Vec::len), Some(2));
        let req = TestRequest::delete()
            .uri("/api/v1/registry/products/p1")
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let req = TestRequest::delete()
            .uri("/api/v1/registry/products/p1")
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_alarm_history_save_and_count() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(AppState {
                    dm: device_management().await,
                }))
                .app_data(json_config())
                .service(api_scope()),
        )
        .await;
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history")
            .set_json(json!({
                "id": "a1", "level": 2, "targetType": "device", "targetId": "d1",
                "termSpec": {"x": 1}
            }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history/_count")
            .set_json(json!({"terms": [{"column": "targetId", "value": "d1"}]}))
            .to_request();
        let count: u64 = call_and_read_body_json(&app, req).await;
        assert_eq!(count, 1);
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history/_query")
            .set_json(json!({}))
            .to_request();
        let records: Value = call_and_read_body_json(&app, req).await;
        assert_eq!(records[0]["termSpec"], json!({"x": 1}));
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history")
            .insert_header(ContentType::json())
            .set_payload("not json")
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_alarm_history_query_returns_array() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(AppState {
                    dm: device_management().await,
                }))
                .app_data(json_config())
                .service(api_scope()),
        )
        .await;
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history/_query")
            .set_json(json!({}))
            .to_request();
        let records: Value = call_and_read_body_json(&app, req).await;
        assert_eq!(records, json!([]));
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history/_batch")
            .set_json(json!([
                {"id": "a1", "level": 1, "alarmTime": 30},
                {"id": "a2", "level": 2, "alarmTime": 10},
                {"id": "a3", "level": 3, "alarmTime": 20}
            ]))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let req = TestRequest::post()
            .uri("/api/v1/alarm/history/_query")
            .set_json(json!({"sorts": [{"name": "alarmTime", "order": "asc"}]}))
            .to_request();
        let records: Value = call_and_read_body_json(&app, req).await;
        let ids = records
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["id"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a2", "a3", "a1"]);
    }

    #[test]
    fn test_openapi_lists_paths() {
        let openapi: Value = serde_json::from_str(&openapi_as_string()).unwrap();
        assert!(openapi["paths"]["/alarm/history/_query/_page"].is_object());
        assert!(openapi["paths"]["/dashboards/{dashboard_id}/objects/{object_id}"].is_object());
    }
}
