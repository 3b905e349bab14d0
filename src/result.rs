// Import necessary crates and modules
use std::collections::HashMap;

use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::{LookupScope, ToolProxyId};
use crate::grade_record::GradeRecord;
use crate::request::{HttpMethod, ServiceRequest, ServiceResponse};
use crate::resource::{numeric_param, string_param, Resource, MEDIA_TYPE_RESULT};
use crate::service::GradebookService;
use crate::template::UriTemplate;
use crate::translator::result_to_json;

/// A resource implementing LISResult, read-only.
///
/// Serves GET under `/{context_id}/lineitems/{item_id}/results/{result_id}/result`;
/// any other method fails immediately with MethodNotAllowed. The result id doubles
/// as the user id of the grade record.
pub struct LisResult {
    id: &'static str,
    template: UriTemplate,
    variable: &'static str,
    methods: Vec<HttpMethod>,
    formats: Vec<&'static str>,
}

impl LisResult {
    pub fn new() -> LisResult {
        LisResult {
            id: "Result.item",
            template: UriTemplate::new(
                "/{context_id}/lineitems/{item_id}/results/{result_id}/result",
            ),
            variable: "Result.url",
            methods: vec![HttpMethod::Get],
            formats: vec![MEDIA_TYPE_RESULT],
        }
    }
}

impl Resource for LisResult {
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
        if request.method != HttpMethod::Get {
            return Err(ServiceError::MethodNotAllowed);
        }
        let context_id = string_param(params, "context_id")?;
        let item_id = numeric_param(params, "item_id")?;
        let result_id = string_param(params, "result_id")?;

        let item = service
            .get_lineitem(context_id, item_id, proxy, LookupScope::AnyOwner)
            .ok_or(ServiceError::BadRequest)?;

        let grade = match service.fetch_grade(item.id, result_id) {
            Some(grade) => {
                // A stored score without a grading timestamp is an inconsistent
                // record and must not be exposed.
                if grade.final_grade.is_some() && grade.time_modified.is_none() {
                    return Err(ServiceError::BadRequest);
                }
                grade
            }
            // No record yet: serialize an empty Result for the requested user.
            None => GradeRecord {
                item_id: item.id,
                user_id: result_id.to_string(),
                raw_grade_max: item.grade_max,
                ..Default::default()
            },
        };

        let endpoint = service.lineitem_endpoint(context_id, item.id);
        let json = result_to_json(&grade, &endpoint, true);
        Ok(ServiceResponse::ok(Some(self.formats[0]), json.to_string()))
    }
}
