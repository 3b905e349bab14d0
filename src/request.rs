// Import necessary crates and modules
use std::collections::HashMap;

/// Enumeration representing the types of HTTP request methods.
///
/// This enum is used throughout the library to specify the HTTP method of an inbound
/// request. The body of a request travels separately on `ServiceRequest`, since this
/// side of the wire receives requests rather than sending them.
///
/// Note: Using an enum for HTTP methods allows for type-safe and clear representation of
/// different request types, improving code readability and maintainability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Get
    }
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Parses an HTTP method name as supplied by the host dispatcher.
    pub fn parse(method: &str) -> Option<HttpMethod> {
        match method.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "PUT" => Some(HttpMethod::Put),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    /// True for methods whose effective media type comes from content negotiation
    /// (the `Accept` header) rather than from the declared body content type.
    pub fn is_read(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

/// Structure holding one inbound request as handed over by the host dispatcher.
///
/// The host owns the socket and the raw HTTP parsing; this library only sees the
/// pieces listed here and never opens connections of its own.
///
/// Fields:
/// - `method`: HTTP method of the request.
/// - `path`: Request path below the service root, e.g. `/2/lineitems/17/lineitem`.
/// - `query`: Decoded query string parameters.
/// - `accept`: Negotiated acceptable media type, if the client sent one.
/// - `content_type`: Declared body media type, if the client sent one.
/// - `body`: Raw request body.
/// - `proxy_hint`: Optional tool-proxy identifier hint forwarded to the
///   authorization collaborator.
#[derive(Debug, Clone, Default)]
pub struct ServiceRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: HashMap<String, String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
    pub proxy_hint: Option<String>,
}

impl ServiceRequest {
    /// Determines the effective media type of the request.
    ///
    /// Read methods negotiate via the `Accept` header; write methods declare the type
    /// of the body they carry. An absent header yields `None`, which every resource
    /// treats as "use the canonical type".
    pub fn effective_media_type(&self) -> Option<&str> {
        if self.method.is_read() {
            self.accept.as_deref()
        } else {
            self.content_type.as_deref()
        }
    }
}

/// Structure holding the outcome of a dispatched request.
///
/// Fields:
/// - `code`: HTTP status code to report.
/// - `content_type`: Media type of `body`, when a body is present.
/// - `body`: Serialized response body, empty on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceResponse {
    pub code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl ServiceResponse {
    /// Builds a bodyless response with the given status code.
    pub fn with_code(code: u16) -> ServiceResponse {
        ServiceResponse {
            code,
            content_type: None,
            body: String::new(),
        }
    }

    /// Builds a `200 OK` response carrying a serialized body.
    pub fn ok(content_type: Option<&str>, body: String) -> ServiceResponse {
        ServiceResponse {
            code: 200,
            content_type: content_type.map(String::from),
            body,
        }
    }
}
