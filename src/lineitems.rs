// Import necessary crates and modules
use std::collections::HashMap;

use serde_json::{json, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::{GradeItem, LineItemFilter, ToolProxyId};
use crate::request::{HttpMethod, ServiceRequest, ServiceResponse};
use crate::resource::{string_param, Resource, MEDIA_TYPE_LINE_ITEM, MEDIA_TYPE_LINE_ITEM_CONTAINER};
use crate::service::GradebookService;
use crate::template::UriTemplate;
use crate::translator::{item_to_json, numeric_id, LineItemPayload, CONTEXT_LINE_ITEM_CONTAINER};

/// A resource implementing the LineItem container.
///
/// Serves GET and POST under `/{context_id}/lineitems`. GET lists every item visible
/// to the calling tool proxy inside a paging envelope; POST creates a new
/// service-owned item and records its ownership.
///
/// The container and item media types are mutually exclusive per verb: a GET must
/// negotiate the container type (or none), a POST must declare the item type.
pub struct LineItems {
    id: &'static str,
    template: UriTemplate,
    variable: &'static str,
    methods: Vec<HttpMethod>,
    formats: Vec<&'static str>,
}

impl LineItems {
    pub fn new() -> LineItems {
        LineItems {
            id: "LineItem.collection",
            template: UriTemplate::new("/{context_id}/lineitems"),
            variable: "LineItems.url",
            methods: vec![HttpMethod::Get, HttpMethod::Post],
            formats: vec![MEDIA_TYPE_LINE_ITEM_CONTAINER, MEDIA_TYPE_LINE_ITEM],
        }
    }

    /// Generate the JSON for a GET request.
    fn get_request_json(
        &self,
        service: &GradebookService,
        context_id: &str,
        items: &[GradeItem],
    ) -> Value {
        let endpoint = service.lineitems_endpoint(context_id);
        let line_items: Vec<Value> = items
            .iter()
            .map(|item| item_to_json(item, &endpoint, true, None))
            .collect();
        json!({
            "@context": CONTEXT_LINE_ITEM_CONTAINER,
            "@type": "Page",
            "@id": endpoint,
            "pageOf": {
                "@type": "LineItemContainer",
                "membershipSubject": {
                    "contextId": context_id,
                    "lineItem": line_items,
                }
            }
        })
    }

    /// Generate the JSON for a POST request.
    ///
    /// Missing labels default to a generated `Item <timestamp>` name, a missing score
    /// maximum defaults to 1. The response echoes the submitted payload augmented with
    /// the new `@id` and its `scores` sub-resource URL.
    fn post_request_json(
        &self,
        service: &GradebookService,
        body: &str,
        context_id: &str,
        proxy: &ToolProxyId,
    ) -> ServiceResult<Value> {
        let mut echoed: Value = serde_json::from_str(body).map_err(|_| ServiceError::BadRequest)?;
        let payload: LineItemPayload =
            serde_json::from_value(echoed.clone()).map_err(|_| ServiceError::BadRequest)?;
        if payload.type_name.as_deref() != Some("LineItem") {
            return Err(ServiceError::BadRequest);
        }

        let label = payload
            .label
            .unwrap_or_else(|| format!("Item {}", chrono::Utc::now().timestamp()));
        let maximum = payload.line_item_score_maximum.unwrap_or(1.0);
        let item = GradeItem {
            id: 0,
            course_id: context_id.to_string(),
            item_name: label,
            grade_max: maximum,
            grade_min: 0.0,
            id_number: payload.resource_id,
            item_instance: payload.resource_link_id.as_ref().and_then(numeric_id),
            item_type: "mod".to_string(),
            item_module: "lti".to_string(),
            item_number: 0,
            line_item_type: payload.line_item_type.clone(),
        };
        let item_id = service.create_lineitem(&item, proxy, payload.line_item_type.as_deref())?;

        let endpoint = service.lineitems_endpoint(context_id);
        echoed["@id"] = json!(format!("{}/{}", endpoint, item_id));
        echoed["scores"] = json!(format!("{}/{}/scores", endpoint, item_id));
        Ok(echoed)
    }
}

impl Resource for LineItems {
    fn id(&self) -> &'static str {
        self.id
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn variable(&self) -> &'static str {
        self.variable
    }

    fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    fn formats(&self) -> &[&'static str] {
        &self.formats
    }

    fn execute(
        &self,
        service: &GradebookService,
        request: &ServiceRequest,
        params: &HashMap<String, String>,
        proxy: &ToolProxyId,
    ) -> ServiceResult<ServiceResponse> {
        let context_id = string_param(params, "context_id")?;

        // An absent media type counts as the container type; POST must present the
        // item type, GET the container type.
        let media_type = request.effective_media_type();
        let container = media_type.is_none() || media_type == Some(self.formats[0]);
        if !(container ^ (request.method == HttpMethod::Post)) {
            return Err(ServiceError::BadRequest);
        }

        match request.method {
            HttpMethod::Get => {
                let filter = LineItemFilter {
                    course_id: context_id.to_string(),
                    tool_proxy: Some(proxy.clone()),
                    resource_id: request.query.get("resourceid").cloned(),
                    resource_link_id: request.query.get("resourcelinkid").cloned(),
                    limit: request.query.get("limit").and_then(|v| v.parse().ok()),
                    page: request.query.get("page").and_then(|v| v.parse().ok()),
                };
                let items = service.get_lineitems(&filter)?;
                let json = self.get_request_json(service, context_id, &items);
                Ok(ServiceResponse::ok(Some(self.formats[0]), json.to_string()))
            }
            HttpMethod::Post => {
                let json = self.post_request_json(service, &request.body, context_id, proxy)?;
                Ok(ServiceResponse {
                    code: 201,
                    content_type: Some(self.formats[1].to_string()),
                    body: json.to_string(),
                })
            }
            _ => Err(ServiceError::MethodNotAllowed),
        }
    }
}
