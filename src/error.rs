// Import necessary crates and modules
use thiserror::Error;

/// Enumeration of the failures a gradebook service request can end in.
///
/// Every handler in this library reports failure through this single enum, and the
/// request pipeline translates the variant into the HTTP status code placed on the
/// response. No partially built body survives a failure; the caller only sees the code.
///
/// Variants:
/// - `Unauthorized`: the tool-proxy authorization check rejected the request.
/// - `BadRequest`: malformed payload, missing required field, unsupported media type,
///   or a resource reference that did not resolve.
/// - `NotFound`: the path was understood but the underlying entity is absent. Used
///   selectively; most absence cases report `BadRequest` for wire compatibility.
/// - `MethodNotAllowed`: the HTTP method is not in the resource's declared set, or is
///   explicitly disabled for it.
/// - `Internal`: a persistence or grade-update collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("tool proxy authorization failed")]
    Unauthorized,
    #[error("bad request")]
    BadRequest,
    #[error("not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal gradebook failure")]
    Internal,
}

impl ServiceError {
    /// Returns the HTTP status code this failure maps to.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 401,
            ServiceError::BadRequest => 400,
            ServiceError::NotFound => 404,
            ServiceError::MethodNotAllowed => 405,
            ServiceError::Internal => 500,
        }
    }
}

// Type alias for handler results.
// This alias simplifies the type signatures throughout the resource handlers and
// encapsulates the outcome of a request step, which is either a value or a
// `ServiceError` carrying the status code to report.
pub type ServiceResult<T> = Result<T, ServiceError>;
