// Import necessary crates and modules
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::grade_item::{GradeItem, LineItemFilter, LookupScope, ToolProxyId};
use crate::grade_record::{GradeRecord, GradeWrite};
use crate::lineitem::LineItem;
use crate::lineitems::LineItems;
use crate::request::{ServiceRequest, ServiceResponse};
use crate::resource::{self, Resource};
use crate::result::LisResult;
use crate::score::Score;
use crate::scores::Scores;
use crate::store::{
    Directory, GradeStore, GradeUpdateStatus, OwnershipIndex, ToolProxyValidator,
};
use crate::translator::{grade_write_from_score, ScorePayload};

/// Central service shared by every resource handler.
///
/// Holds the external collaborators (gradebook store, ownership index, user
/// directory, tool-proxy validator) behind trait objects, plus the endpoint
/// configuration. All collaborator access from the resources goes through the
/// methods here, which translate collaborator failures into the request error
/// taxonomy.
pub struct GradebookService {
    config: ServiceConfig,
    store: Arc<dyn GradeStore + Send + Sync>,
    ownership: Arc<dyn OwnershipIndex + Send + Sync>,
    directory: Arc<dyn Directory + Send + Sync>,
    validator: Arc<dyn ToolProxyValidator + Send + Sync>,
}

impl GradebookService {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn GradeStore + Send + Sync>,
        ownership: Arc<dyn OwnershipIndex + Send + Sync>,
        directory: Arc<dyn Directory + Send + Sync>,
        validator: Arc<dyn ToolProxyValidator + Send + Sync>,
    ) -> GradebookService {
        GradebookService {
            config,
            store,
            ownership,
            directory,
            validator,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Runs the tool-proxy authorization check for one request.
    ///
    /// Returns the authenticated proxy identity, which the caller threads through
    /// every ownership-scoped lookup of the request.
    pub fn authorize(&self, request: &ServiceRequest) -> ServiceResult<ToolProxyId> {
        self.validator
            .authorize(request.proxy_hint.as_deref(), &request.body)
            .ok_or(ServiceError::Unauthorized)
    }

    /// Resolves one grade item within a course under the given lookup policy.
    ///
    /// Returns `None` when the item does not exist, is outside the course, or is not
    /// visible to the proxy under the policy; callers decide which status that maps to.
    pub fn get_lineitem(
        &self,
        course_id: &str,
        item_id: i64,
        proxy: &ToolProxyId,
        scope: LookupScope,
    ) -> Option<GradeItem> {
        self.store.find_item(course_id, item_id, proxy, scope)
    }

    /// Lists the grade items of a course visible to a tool proxy.
    pub fn get_lineitems(&self, filter: &LineItemFilter) -> ServiceResult<Vec<GradeItem>> {
        self.store.find_items(filter).map_err(|error| {
            log::warn!("Line item listing failed: {}", error);
            ServiceError::Internal
        })
    }

    /// Creates a grade item and records its ownership as one logical transaction.
    ///
    /// The ownership record is what makes the item visible to future service-owned
    /// lookups, so a half-created pair must not survive: when the ownership insert
    /// fails, the freshly created item is deleted again before the failure is
    /// reported.
    pub fn create_lineitem(
        &self,
        item: &GradeItem,
        proxy: &ToolProxyId,
        line_item_type: Option<&str>,
    ) -> ServiceResult<i64> {
        let item_id = self.store.create_item(item).map_err(|error| {
            log::warn!("Line item creation failed: {}", error);
            ServiceError::Internal
        })?;
        if let Err(error) = self
            .ownership
            .record_ownership(item_id, proxy, line_item_type)
        {
            log::warn!(
                "Ownership record for item {} failed, deleting the item again: {}",
                item_id,
                error
            );
            if let Err(error) = self.store.delete_item(&item.course_id, item_id) {
                log::warn!("Compensating delete of item {} failed: {}", item_id, error);
            }
            return Err(ServiceError::Internal);
        }
        Ok(item_id)
    }

    /// Persists field changes of an existing grade item.
    pub fn update_lineitem(&self, item: &GradeItem) -> ServiceResult<()> {
        self.store.update_item(item).map_err(|error| {
            log::warn!("Line item update failed: {}", error);
            ServiceError::Internal
        })
    }

    /// Deletes a grade item.
    pub fn delete_lineitem(&self, course_id: &str, item_id: i64) -> ServiceResult<()> {
        self.store.delete_item(course_id, item_id).map_err(|error| {
            log::warn!("Line item deletion failed: {}", error);
            ServiceError::Internal
        })
    }

    /// Fetches the grade record of one user against one item.
    pub fn fetch_grade(&self, item_id: i64, user_id: &str) -> Option<GradeRecord> {
        self.store.fetch_grade(item_id, user_id)
    }

    /// Fetches every grade record of one item.
    pub fn fetch_grades(&self, item_id: i64) -> Vec<GradeRecord> {
        self.store.fetch_grades(item_id)
    }

    /// Applies a submitted score to a user's grade record.
    ///
    /// The target user must exist in the host directory. The raw score is rescaled
    /// onto the item's maximum when the payload declares a different, nonzero
    /// maximum of its own.
    pub fn set_grade(
        &self,
        item: &GradeItem,
        score: &ScorePayload,
        user_id: &str,
    ) -> ServiceResult<()> {
        if !self.directory.user_exists(user_id) {
            return Err(ServiceError::BadRequest);
        }
        let write = grade_write_from_score(score, user_id, item, chrono::Utc::now());
        self.submit_grade_write(item, &write)
    }

    /// Withdraws a user's submission: score and feedback cleared, record marked
    /// not-yet-graded.
    pub fn clear_grade(&self, item: &GradeItem, user_id: &str) -> ServiceResult<()> {
        self.submit_grade_write(item, &GradeWrite::cleared(user_id))
    }

    fn submit_grade_write(&self, item: &GradeItem, write: &GradeWrite) -> ServiceResult<()> {
        match self.store.apply_grade(item, write) {
            GradeUpdateStatus::Ok => Ok(()),
            GradeUpdateStatus::Failed => {
                log::warn!(
                    "Grade update for item {} user {} failed",
                    item.id,
                    write.user_id
                );
                Err(ServiceError::Internal)
            }
        }
    }

    /// Resolves the grade item behind a course module, for launch-time variable
    /// substitution. Runs outside any service request, so no proxy scoping applies.
    pub fn lineitem_for_course_module(
        &self,
        course_id: &str,
        course_module_id: i64,
    ) -> Option<GradeItem> {
        let instance = self
            .directory
            .course_module_to_activity_instance(course_module_id)?;
        let filter = LineItemFilter {
            course_id: course_id.to_string(),
            resource_link_id: Some(instance.to_string()),
            ..Default::default()
        };
        self.store.find_items(&filter).ok()?.into_iter().next()
    }

    /// Builds the lineitems container endpoint of a course context.
    pub fn lineitems_endpoint(&self, context_id: &str) -> String {
        format!("{}/{}/lineitems", self.config.service_root, context_id)
    }

    /// Builds the endpoint of one line item.
    pub fn lineitem_endpoint(&self, context_id: &str, item_id: i64) -> String {
        format!("{}/{}", self.lineitems_endpoint(context_id), item_id)
    }

    /// Builds the scores sub-resource endpoint of one line item.
    pub fn scores_endpoint(&self, context_id: &str, item_id: i64) -> String {
        format!("{}/scores", self.lineitem_endpoint(context_id, item_id))
    }
}

/// Explicit context for launch-time parameter substitution.
///
/// Fields:
/// - `course_id`: Course the launch belongs to.
/// - `course_module_id`: Course module of the launch, when known; needed by the
///   variables that point at a specific line item.
/// - `user_id`: Launching user, substituted into result and score endpoints.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
    pub course_id: String,
    pub course_module_id: Option<i64>,
    pub user_id: String,
}

/// Registry assembling the ordered resource list and dispatching requests to it.
///
/// The containers are ordered after their elements: lineitems after lineitem and
/// scores after score. Dispatch picks the first resource whose template matches the
/// request path.
pub struct ServiceRegistry {
    service: Arc<GradebookService>,
    resources: Vec<Box<dyn Resource + Send + Sync>>,
}

impl ServiceRegistry {
    pub fn new(service: Arc<GradebookService>) -> ServiceRegistry {
        let resources: Vec<Box<dyn Resource + Send + Sync>> = vec![
            Box::new(LineItem::new()),
            Box::new(LineItems::new()),
            Box::new(LisResult::new()),
            Box::new(Score::new()),
            Box::new(Scores::new()),
        ];
        ServiceRegistry { service, resources }
    }

    pub fn service(&self) -> &GradebookService {
        &self.service
    }

    /// Returns the registered resources in dispatch order.
    pub fn resources(&self) -> impl Iterator<Item = &(dyn Resource + Send + Sync)> {
        self.resources.iter().map(|entry| &**entry)
    }

    /// Dispatches one inbound request to the resource matching its path.
    ///
    /// Returns a `404` response when no registered template matches.
    pub fn dispatch(&self, request: &ServiceRequest) -> ServiceResponse {
        for entry in &self.resources {
            if entry.template().matches(&request.path) {
                log::debug!(
                    "{} {} handled by {}",
                    request.method.as_str(),
                    request.path,
                    entry.id()
                );
                return resource::handle(entry.as_ref(), &self.service, request);
            }
        }
        log::debug!("No resource template matches {}", request.path);
        ServiceResponse::with_code(404)
    }

    /// Substitutes launch-time endpoint variables in a custom parameter value.
    ///
    /// Each resource contributes one variable, e.g. `$LineItem.url`. Variables whose
    /// endpoint needs a line item are resolved through the launching course module;
    /// when that resolution fails the whole value collapses to an empty string, as
    /// the launch path expects.
    pub fn substitute_variables(&self, value: &str, context: &SubstitutionContext) -> String {
        let mut substituted = value.to_string();
        for entry in &self.resources {
            let variable = format!("${}", entry.variable());
            if !substituted.contains(&variable) {
                continue;
            }
            match self.resource_endpoint(entry.as_ref(), context) {
                Some(endpoint) => substituted = substituted.replace(&variable, &endpoint),
                None => return String::new(),
            }
        }
        substituted
    }

    fn resource_endpoint(
        &self,
        entry: &dyn Resource,
        context: &SubstitutionContext,
    ) -> Option<String> {
        let mut params = HashMap::new();
        params.insert("context_id".to_string(), context.course_id.clone());
        if entry.template().names().iter().any(|name| name == "item_id") {
            let module_id = context.course_module_id?;
            let item = self
                .service
                .lineitem_for_course_module(&context.course_id, module_id)?;
            params.insert("item_id".to_string(), item.id.to_string());
        }
        if entry
            .template()
            .names()
            .iter()
            .any(|name| name == "result_id")
        {
            params.insert("result_id".to_string(), context.user_id.clone());
        }
        let path = entry.template().expand(&params)?;
        Some(format!("{}{}", self.service.config().service_root, path))
    }
}
