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


//! Device management errors.

use std::error::Error;
use std::fmt;

/// Cause of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// General failure. See message for details.
    Unspecified,
    /// The product catalog or device registry failed to serve a request.
    BackendOperationFailed,
    /// The search index backend was unavailable or rejected the request.
    IndexOperationFailed,
    /// An operation with a bounded wait did not complete in time.
    Timeout,
    /// The request could not be understood. E.g. an undecodable body.
    MalformedRequest,
}

impl PlatformErrorKind {
    /// Create a new instance with an error message.
    pub fn error_with_msg<S: AsRef<str>>(self, msg: S) -> PlatformError {
        PlatformError {
            kind: self,
            msg: Some(msg.as_ref().to_string()),
        }
    }

    /// Create a new instance without an error message.
    pub fn error(self) -> PlatformError {
        PlatformError {
            kind: self,
            msg: None,
        }
    }
}

impl fmt::Display for PlatformErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/** Device management error.

Create a new instance via [PlatformErrorKind].
*/
#[derive(Debug, Clone)]
pub struct PlatformError {
    kind: PlatformErrorKind,
    msg: Option<String>,
}

impl PlatformError {
    /// Return the type of error.
    pub fn kind(&self) -> &PlatformErrorKind {
        &self.kind
    }

    /// Return the error message, if any.
    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(msg) = &self.msg {
            write!(f, "{} {}", self.kind, msg)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl AsRef<PlatformError> for PlatformError {
    fn as_ref(&self) -> &PlatformError {
        self
    }
}

impl Error for PlatformError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_and_without_message() {
        let e = PlatformErrorKind::IndexOperationFailed.error_with_msg("connection refused");
        assert_eq!(e.to_string(), "IndexOperationFailed connection refused");
        assert_eq!(e.msg(), Some("connection refused"));
        let e = PlatformErrorKind::Timeout.error();
        assert_eq!(e.to_string(), "Timeout");
        assert_eq!(e.kind(), &PlatformErrorKind::Timeout);
    }
}
