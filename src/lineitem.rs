// Import necessary crates and modules
use std::collections::HashMap;

use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::{GradeItem, LookupScope, ToolProxyId};
use crate::grade_record::{grade_floats_different, grade_floatval};
use crate::request::{HttpMethod, ServiceRequest, ServiceResponse};
use crate::resource::{numeric_param, string_param, Resource, MEDIA_TYPE_LINE_ITEM};
use crate::service::GradebookService;
use crate::template::UriTemplate;
use crate::translator::{item_to_json, numeric_id, LineItemPayload};

/// A resource implementing a single LineItem.
///
/// Serves GET, PUT and DELETE under
/// `/{context_id}/lineitems/{item_id}/lineitem`. GET resolves the item under the
/// `AnyOwner` policy so legacy items stay readable; PUT and DELETE require the item
/// to be owned by the calling tool proxy.
pub struct LineItem {
    id: &'static str,
    template: UriTemplate,
    variable: &'static str,
    methods: Vec<HttpMethod>,
    formats: Vec<&'static str>,
}

impl LineItem {
    pub fn new() -> LineItem {
        LineItem {
            id: "LineItem.item",
            template: UriTemplate::new("/{context_id}/lineitems/{item_id}/lineitem"),
            variable: "LineItem.url",
            methods: vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete],
            formats: vec![MEDIA_TYPE_LINE_ITEM],
        }
    }

    /// Process a GET request.
    fn get_request(
        &self,
        service: &GradebookService,
        context_id: &str,
        item: &GradeItem,
    ) -> ServiceResult<ServiceResponse> {
        let endpoint = service.lineitems_endpoint(context_id);
        let json = item_to_json(item, &endpoint, false, Some(context_id));
        Ok(ServiceResponse::ok(Some(self.formats[0]), json.to_string()))
    }

    /// Process a PUT request.
    ///
    /// Only the fields present in the payload are applied; the item is persisted
    /// only when at least one of them actually changed.
    fn put_request(
        &self,
        service: &GradebookService,
        body: &str,
        old_item: &GradeItem,
    ) -> ServiceResult<ServiceResponse> {
        let payload: LineItemPayload =
            serde_json::from_str(body).map_err(|_| ServiceError::BadRequest)?;
        if payload.type_name.as_deref() != Some("LineItem") {
            return Err(ServiceError::BadRequest);
        }

        let mut item = old_item.clone();
        let mut update = false;
        if let Some(label) = payload.label {
            if item.item_name != label {
                item.item_name = label;
                update = true;
            }
        }
        if let Some(maximum) = payload.line_item_score_maximum {
            if grade_floats_different(
                Some(grade_floatval(item.grade_max)),
                Some(grade_floatval(maximum)),
            ) {
                item.grade_max = grade_floatval(maximum);
                update = true;
            }
        }
        if let Some(resource_id) = payload.resource_id {
            if item.id_number.as_deref() != Some(resource_id.as_str()) {
                item.id_number = Some(resource_id);
                update = true;
            }
        }
        if let Some(instance) = payload.resource_link_id.as_ref().and_then(numeric_id) {
            if item.item_instance != Some(instance) {
                item.item_instance = Some(instance);
                update = true;
            }
        }
        if update {
            service.update_lineitem(&item)?;
        }
        Ok(ServiceResponse::with_code(200))
    }

    /// Process a DELETE request.
    fn delete_request(
        &self,
        service: &GradebookService,
        item: &GradeItem,
    ) -> ServiceResult<ServiceResponse> {
        service.delete_lineitem(&item.course_id, item.id)?;
        Ok(ServiceResponse::with_code(200))
    }
}

impl Resource for LineItem {
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
        let item_id = numeric_param(params, "item_id")?;

        // Reads stay open to legacy items; writes require service ownership.
        let scope = if request.method == HttpMethod::Get {
            LookupScope::AnyOwner
        } else {
            LookupScope::ServiceOwnedOnly
        };
        let item = service
            .get_lineitem(context_id, item_id, proxy, scope)
            .ok_or(ServiceError::BadRequest)?;

        match request.method {
            HttpMethod::Get => self.get_request(service, context_id, &item),
            HttpMethod::Put => self.put_request(service, &request.body, &item),
            HttpMethod::Delete => self.delete_request(service, &item),
            _ => Err(ServiceError::MethodNotAllowed),
        }
    }
}
