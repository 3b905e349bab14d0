// Import necessary crates and modules
use std::collections::HashMap;

use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::ToolProxyId;
use crate::request::{ServiceRequest, ServiceResponse};
use crate::service::GradebookService;
use crate::template::UriTemplate;

// Media types served by the five resources, wire-exact.
pub const MEDIA_TYPE_LINE_ITEM: &str = "application/vnd.ims.lis.v2.lineitem+json";
pub const MEDIA_TYPE_LINE_ITEM_CONTAINER: &str =
    "application/vnd.ims.lis.v2.lineitemcontainer+json";
pub const MEDIA_TYPE_RESULT: &str = "application/vnd.ims.lis.v2.result+json";
pub const MEDIA_TYPE_SCORE: &str = "application/vnd.ims.lis.v1.score+json";
pub const MEDIA_TYPE_SCORE_CONTAINER: &str = "application/vnd.ims.lis.v1.scorecontainer+json";

/// Contract implemented by every REST resource of the gradebook service.
///
/// A resource binds an identifier, a URI template, the set of HTTP methods it serves,
/// an ordered list of accepted media types (the first entry is the canonical or
/// container type, later entries the singular item type) and a substitution variable
/// name for launch-time parameter expansion.
///
/// `execute` receives the parameters already extracted from the template, plus the
/// authenticated tool proxy, and runs the resource-specific preconditions and verb
/// handlers. The shared head of the request pipeline lives in `handle`.
pub trait Resource {
    /// Stable identifier of the resource.
    fn id(&self) -> &'static str;

    /// URI template the resource is mounted at.
    fn template(&self) -> &UriTemplate;

    /// Substitution variable resolved to this resource's endpoint.
    fn variable(&self) -> &'static str;

    /// HTTP methods this resource serves.
    fn methods(&self) -> &[crate::request::HttpMethod];

    /// Accepted media types, canonical first.
    fn formats(&self) -> &[&'static str];

    /// Runs the verb handlers for one validated request.
    fn execute(
        &self,
        service: &GradebookService,
        request: &ServiceRequest,
        params: &HashMap<String, String>,
        proxy: &ToolProxyId,
    ) -> ServiceResult<ServiceResponse>;
}

/// Runs the shared request pipeline for one resource and turns any failure into a
/// status-only response.
///
/// Pipeline order, each step short-circuiting the rest:
/// 1. Parse the URI template and extract the named parameters.
/// 2. Tool-proxy authorization through the external collaborator.
/// 3. Effective media type must be one of the resource's accepted types, when present.
/// 4. Resource preconditions and verb dispatch inside `execute`.
pub fn handle(
    resource: &dyn Resource,
    service: &GradebookService,
    request: &ServiceRequest,
) -> ServiceResponse {
    match run_pipeline(resource, service, request) {
        Ok(response) => response,
        Err(error) => {
            log::debug!(
                "{} {} on {} failed: {}",
                request.method.as_str(),
                request.path,
                resource.id(),
                error
            );
            // Failures carry a status code only; any partial body is discarded.
            ServiceResponse::with_code(error.status())
        }
    }
}

fn run_pipeline(
    resource: &dyn Resource,
    service: &GradebookService,
    request: &ServiceRequest,
) -> ServiceResult<ServiceResponse> {
    let params = resource
        .template()
        .parse(&request.path)
        .ok_or(ServiceError::BadRequest)?;

    let proxy = service.authorize(request)?;

    if let Some(media_type) = request.effective_media_type() {
        if !resource.formats().contains(&media_type) {
            return Err(ServiceError::BadRequest);
        }
    }

    resource.execute(service, request, &params, &proxy)
}

/// Reads a required numeric identifier out of the extracted template parameters.
pub(crate) fn numeric_param(params: &HashMap<String, String>, name: &str) -> ServiceResult<i64> {
    params
        .get(name)
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or(ServiceError::BadRequest)
}

/// Reads a required string parameter out of the extracted template parameters.
pub(crate) fn string_param<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
) -> ServiceResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(ServiceError::BadRequest)
}
