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


//! Mapper of app errors to Actix-web [Error].

use actix_web::Error;
use actix_web::error;
use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;

/// Mapper of app errors to Actix-web [Error].
pub struct ApiErrorMapper {}

impl ApiErrorMapper {
    /// Return REST API [Error] from [PlatformError].
    pub fn from_platform_error<E: AsRef<PlatformError>>(e: E) -> Error {
        let e = e.as_ref();
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Will respond with error. kind: {} msg: {e:?}", e.kind());
        }
        match e.kind() {
            PlatformErrorKind::MalformedRequest => {
                // HTTP 400
                error::ErrorBadRequest(e.to_string())
            }
            PlatformErrorKind::Timeout => {
                // HTTP 503
                error::ErrorServiceUnavailable(e.to_string())
            }
            _other => {
                // HTTP 500
                error::ErrorInternalServerError(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let status_of = |kind: PlatformErrorKind| {
            ApiErrorMapper::from_platform_error(kind.error_with_msg("test"))
                .as_response_error()
                .status_code()
        };
        assert_eq!(
            status_of(PlatformErrorKind::MalformedRequest),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PlatformErrorKind::Timeout),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(PlatformErrorKind::IndexOperationFailed),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PlatformErrorKind::BackendOperationFailed),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
