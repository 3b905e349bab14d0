// Import necessary crates and modules
use std::collections::HashMap;

use serde_json::{json, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::{GradeItem, LookupScope, ToolProxyId};
use crate::request::{HttpMethod, ServiceRequest, ServiceResponse};
use crate::resource::{
    numeric_param, string_param, Resource, MEDIA_TYPE_SCORE, MEDIA_TYPE_SCORE_CONTAINER,
};
use crate::service::GradebookService;
use crate::template::UriTemplate;
use crate::translator::{score_to_json, ScorePayload, CONTEXT_SCORE_CONTAINER};

/// A resource implementing the Score container.
///
/// Serves GET and POST under `/{context_id}/lineitems/{item_id}/scores`. GET lists
/// the scores of every record that has been graded at least once; POST submits a
/// score for the user named in the payload's result agent. The container and item
/// media types are mutually exclusive per verb, as for the LineItem container.
pub struct Scores {
    id: &'static str,
    template: UriTemplate,
    variable: &'static str,
    methods: Vec<HttpMethod>,
    formats: Vec<&'static str>,
}

impl Scores {
    pub fn new() -> Scores {
        Scores {
            id: "Score.collection",
            template: UriTemplate::new("/{context_id}/lineitems/{item_id}/scores"),
            variable: "Scores.url",
            methods: vec![HttpMethod::Get, HttpMethod::Post],
            formats: vec![MEDIA_TYPE_SCORE_CONTAINER, MEDIA_TYPE_SCORE],
        }
    }

    /// Generate the JSON for a GET request.
    ///
    /// Records without a grading timestamp have never been graded and are skipped.
    fn get_request_json(
        &self,
        service: &GradebookService,
        context_id: &str,
        item: &GradeItem,
    ) -> Value {
        let endpoint = service.lineitem_endpoint(context_id, item.id);
        let scores: Vec<Value> = service
            .fetch_grades(item.id)
            .iter()
            .filter(|grade| grade.time_modified.is_some())
            .map(|grade| score_to_json(grade, &endpoint, false))
            .collect();
        json!({
            "@context": CONTEXT_SCORE_CONTAINER,
            "@type": "Page",
            "@id": service.scores_endpoint(context_id, item.id),
            "pageOf": {
                "@type": "ScoreContainer",
                "membershipSubject": {
                    "score": scores,
                }
            }
        })
    }

    /// Generate the JSON for a POST request.
    fn post_request_json(
        &self,
        service: &GradebookService,
        body: &str,
        context_id: &str,
        item: &GradeItem,
    ) -> ServiceResult<Value> {
        let mut echoed: Value = serde_json::from_str(body).map_err(|_| ServiceError::BadRequest)?;
        let payload: ScorePayload =
            serde_json::from_value(echoed.clone()).map_err(|_| ServiceError::BadRequest)?;
        if payload.type_name.as_deref() != Some("Score") {
            return Err(ServiceError::BadRequest);
        }
        let user_id = payload
            .result_agent
            .as_ref()
            .and_then(|agent| agent.user_id.clone())
            .ok_or(ServiceError::BadRequest)?;
        if payload.score_given.is_none() {
            return Err(ServiceError::BadRequest);
        }

        service.set_grade(item, &payload, &user_id)?;

        echoed["@id"] = json!(format!(
            "{}/{}",
            service.scores_endpoint(context_id, item.id),
            user_id
        ));
        Ok(echoed)
    }
}

impl Resource for Scores {
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

        let media_type = request.effective_media_type();
        let container = media_type.is_none() || media_type == Some(self.formats[0]);
        if !(container ^ (request.method == HttpMethod::Post)) {
            return Err(ServiceError::BadRequest);
        }

        // Unlike the other resources, an unresolved item reports NotFound here.
        let item = service
            .get_lineitem(context_id, item_id, proxy, LookupScope::AnyOwner)
            .ok_or(ServiceError::NotFound)?;

        match request.method {
            HttpMethod::Get => {
                let json = self.get_request_json(service, context_id, &item);
                Ok(ServiceResponse::ok(Some(self.formats[0]), json.to_string()))
            }
            HttpMethod::Post => {
                let json = self.post_request_json(service, &request.body, context_id, &item)?;
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
