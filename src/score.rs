// Import necessary crates and modules
use std::collections::HashMap;

use serde_json::{json, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::{GradeItem, LookupScope, ToolProxyId};
use crate::request::{HttpMethod, ServiceRequest, ServiceResponse};
use crate::resource::{numeric_param, string_param, Resource, MEDIA_TYPE_SCORE};
use crate::service::GradebookService;
use crate::template::UriTemplate;
use crate::translator::ScorePayload;

/// A resource implementing a single Score submission.
///
/// Serves PUT and DELETE under
/// `/{context_id}/lineitems/{item_id}/scores/{result_id}/score`. GET is reserved for
/// a future implementation and always answers MethodNotAllowed. A grade record for
/// the target user must already exist, even if it has never been graded.
pub struct Score {
    id: &'static str,
    template: UriTemplate,
    variable: &'static str,
    methods: Vec<HttpMethod>,
    formats: Vec<&'static str>,
}

impl Score {
    pub fn new() -> Score {
        Score {
            id: "Score.item",
            template: UriTemplate::new(
                "/{context_id}/lineitems/{item_id}/scores/{result_id}/score",
            ),
            variable: "Score.url",
            methods: vec![HttpMethod::Put, HttpMethod::Delete],
            formats: vec![MEDIA_TYPE_SCORE],
        }
    }

    /// Process a PUT request.
    ///
    /// A fully graded submission is applied to the gradebook; any other grading
    /// progress counts as a withdrawal and clears the record instead. The response
    /// echoes the submitted payload with the score's `@id` added.
    fn put_request(
        &self,
        service: &GradebookService,
        body: &str,
        context_id: &str,
        item: &GradeItem,
        result_id: &str,
    ) -> ServiceResult<ServiceResponse> {
        let mut echoed: Value = serde_json::from_str(body).map_err(|_| ServiceError::BadRequest)?;
        let payload: ScorePayload =
            serde_json::from_value(echoed.clone()).map_err(|_| ServiceError::BadRequest)?;
        if payload.type_name.as_deref() != Some("Score") {
            return Err(ServiceError::BadRequest);
        }
        if let Some(agent_user) = payload
            .result_agent
            .as_ref()
            .and_then(|agent| agent.user_id.as_deref())
        {
            if agent_user != result_id {
                return Err(ServiceError::BadRequest);
            }
        }
        if payload.score_given.is_none() || payload.grading_progress.is_none() {
            return Err(ServiceError::BadRequest);
        }

        if payload.grading_progress.as_deref() == Some("FullyGraded") {
            service.set_grade(item, &payload, result_id)?;
        } else {
            service.clear_grade(item, result_id)?;
        }

        let id = format!(
            "{}/scores/{}",
            service.lineitem_endpoint(context_id, item.id),
            result_id
        );
        echoed["@id"] = json!(id);
        Ok(ServiceResponse::ok(None, echoed.to_string()))
    }
}

impl Resource for Score {
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
        // GET is disabled for the moment; reserved for a future implementation.
        if request.method == HttpMethod::Get {
            return Err(ServiceError::MethodNotAllowed);
        }

        let context_id = string_param(params, "context_id")?;
        let item_id = numeric_param(params, "item_id")?;
        let result_id = string_param(params, "result_id")?;

        let item = service
            .get_lineitem(context_id, item_id, proxy, LookupScope::AnyOwner)
            .ok_or(ServiceError::BadRequest)?;
        if service.fetch_grade(item.id, result_id).is_none() {
            return Err(ServiceError::BadRequest);
        }

        match request.method {
            HttpMethod::Put => {
                self.put_request(service, &request.body, context_id, &item, result_id)
            }
            HttpMethod::Delete => {
                service.clear_grade(&item, result_id)?;
                Ok(ServiceResponse::with_code(200))
            }
            _ => Err(ServiceError::MethodNotAllowed),
        }
    }
}
