// In-memory collaborators used by the integration tests.
//
// One structure backs all four collaborator traits so a single `Arc` can be handed
// to the service in every role. Failure switches let individual tests force the
// collaborator errors the handlers must translate.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lti_gradebook_services::{
    Directory, FeedbackFormat, GradeItem, GradeRecord, GradeStore, GradeUpdateStatus,
    GradeWrite, GradebookService, HttpMethod, LineItemFilter, LookupScope, OwnershipIndex,
    OwnershipRecord, ServiceConfig, ServiceRegistry, ServiceRequest, StoreError, ToolProxyId,
    ToolProxyValidator,
};

pub const ROOT: &str = "https://lms.example.edu/services";

pub fn proxy() -> ToolProxyId {
    ToolProxyId::new("proxy-1")
}

#[derive(Default)]
pub struct MemoryGradebook {
    pub items: Mutex<Vec<GradeItem>>,
    pub ownership: Mutex<Vec<OwnershipRecord>>,
    // Item ids reachable by a proxy through its own legacy activity launches.
    pub legacy_launches: Mutex<HashMap<i64, ToolProxyId>>,
    pub grades: Mutex<Vec<GradeRecord>>,
    pub users: Mutex<Vec<String>>,
    pub course_modules: Mutex<HashMap<i64, i64>>,
    pub next_id: Mutex<i64>,
    pub authorized: Mutex<Option<ToolProxyId>>,
    pub fail_ownership: Mutex<bool>,
    pub fail_grade_update: Mutex<bool>,
}

impl MemoryGradebook {
    pub fn new() -> MemoryGradebook {
        let gradebook = MemoryGradebook::default();
        *gradebook.authorized.lock().unwrap() = Some(proxy());
        gradebook
    }

    fn owned_by(&self, item_id: i64, proxy: &ToolProxyId) -> bool {
        self.ownership
            .lock()
            .unwrap()
            .iter()
            .any(|record| record.grade_item_id == item_id && &record.tool_proxy_id == proxy)
    }

    fn legacy_visible(&self, item_id: i64, proxy: &ToolProxyId) -> bool {
        self.legacy_launches
            .lock()
            .unwrap()
            .get(&item_id)
            .map(|launcher| launcher == proxy)
            .unwrap_or(false)
    }

    fn visible(&self, item_id: i64, proxy: &ToolProxyId, scope: LookupScope) -> bool {
        match scope {
            LookupScope::ServiceOwnedOnly => self.owned_by(item_id, proxy),
            LookupScope::AnyOwner => {
                self.owned_by(item_id, proxy) || self.legacy_visible(item_id, proxy)
            }
        }
    }

    fn with_line_item_type(&self, mut item: GradeItem) -> GradeItem {
        let tag = self
            .ownership
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.grade_item_id == item.id)
            .and_then(|record| record.line_item_type.clone());
        if tag.is_some() {
            item.line_item_type = tag;
        }
        item
    }
}

impl GradeStore for MemoryGradebook {
    fn create_item(&self, item: &GradeItem) -> Result<i64, StoreError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let mut stored = item.clone();
        stored.id = *next_id;
        self.items.lock().unwrap().push(stored);
        Ok(*next_id)
    }

    fn update_item(&self, item: &GradeItem) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|stored| stored.id == item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_item(&self, course_id: &str, item_id: i64) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| !(item.id == item_id && item.course_id == course_id));
        if items.len() == before {
            return Err(StoreError::NotFound);
        }
        // The store cascades: ownership rows and grades die with their item.
        self.ownership
            .lock()
            .unwrap()
            .retain(|record| record.grade_item_id != item_id);
        self.grades
            .lock()
            .unwrap()
            .retain(|grade| grade.item_id != item_id);
        Ok(())
    }

    fn find_items(&self, filter: &LineItemFilter) -> Result<Vec<GradeItem>, StoreError> {
        let items = self.items.lock().unwrap();
        let found = items
            .iter()
            .filter(|item| item.course_id == filter.course_id)
            .filter(|item| match &filter.tool_proxy {
                Some(proxy) => self.visible(item.id, proxy, LookupScope::AnyOwner),
                None => true,
            })
            .filter(|item| match &filter.resource_id {
                Some(resource_id) => item.id_number.as_deref() == Some(resource_id.as_str()),
                None => true,
            })
            .filter(|item| match &filter.resource_link_id {
                Some(link_id) => {
                    item.item_instance.map(|instance| instance.to_string()).as_deref()
                        == Some(link_id.as_str())
                }
                None => true,
            })
            .map(|item| self.with_line_item_type(item.clone()))
            .collect();
        Ok(found)
    }

    fn find_item(
        &self,
        course_id: &str,
        item_id: i64,
        proxy: &ToolProxyId,
        scope: LookupScope,
    ) -> Option<GradeItem> {
        let items = self.items.lock().unwrap();
        let item = items
            .iter()
            .find(|item| item.id == item_id && item.course_id == course_id)?
            .clone();
        if !self.visible(item.id, proxy, scope) {
            return None;
        }
        Some(self.with_line_item_type(item))
    }

    fn fetch_grade(&self, item_id: i64, user_id: &str) -> Option<GradeRecord> {
        self.grades
            .lock()
            .unwrap()
            .iter()
            .find(|grade| grade.item_id == item_id && grade.user_id == user_id)
            .cloned()
    }

    fn fetch_grades(&self, item_id: i64) -> Vec<GradeRecord> {
        self.grades
            .lock()
            .unwrap()
            .iter()
            .filter(|grade| grade.item_id == item_id)
            .cloned()
            .collect()
    }

    fn apply_grade(&self, item: &GradeItem, write: &GradeWrite) -> GradeUpdateStatus {
        if *self.fail_grade_update.lock().unwrap() {
            return GradeUpdateStatus::Failed;
        }
        let mut grades = self.grades.lock().unwrap();
        let position = grades
            .iter()
            .position(|grade| grade.item_id == item.id && grade.user_id == write.user_id);
        let index = match position {
            Some(index) => index,
            None => {
                grades.push(GradeRecord {
                    item_id: item.id,
                    user_id: write.user_id.clone(),
                    ..Default::default()
                });
                grades.len() - 1
            }
        };
        let record = &mut grades[index];
        if write.raw_grade.is_none() && write.time_modified.is_none() {
            record.raw_grade = None;
            record.final_grade = None;
            record.feedback = None;
            record.feedback_format = FeedbackFormat::Native;
            record.time_modified = None;
        } else {
            record.raw_grade = write.raw_grade;
            record.raw_grade_min = write.raw_grade_min;
            record.raw_grade_max = item.grade_max;
            record.final_grade = write.raw_grade;
            record.feedback = write.feedback.clone();
            record.feedback_format = write.feedback_format;
            record.time_modified = write.time_modified;
        }
        GradeUpdateStatus::Ok
    }
}

impl OwnershipIndex for MemoryGradebook {
    fn record_ownership(
        &self,
        grade_item_id: i64,
        proxy: &ToolProxyId,
        line_item_type: Option<&str>,
    ) -> Result<(), StoreError> {
        if *self.fail_ownership.lock().unwrap() {
            return Err(StoreError::Persistence("ownership insert failed".to_string()));
        }
        self.ownership.lock().unwrap().push(OwnershipRecord {
            grade_item_id,
            tool_proxy_id: proxy.clone(),
            line_item_type: line_item_type.map(String::from),
        });
        Ok(())
    }
}

impl Directory for MemoryGradebook {
    fn user_exists(&self, user_id: &str) -> bool {
        self.users.lock().unwrap().iter().any(|user| user == user_id)
    }

    fn course_module_to_activity_instance(&self, course_module_id: i64) -> Option<i64> {
        self.course_modules
            .lock()
            .unwrap()
            .get(&course_module_id)
            .copied()
    }
}

impl ToolProxyValidator for MemoryGradebook {
    fn authorize(&self, _proxy_hint: Option<&str>, _request_body: &str) -> Option<ToolProxyId> {
        self.authorized.lock().unwrap().clone()
    }
}

/// Builds a registry wired to one shared in-memory gradebook.
pub fn setup() -> (ServiceRegistry, Arc<MemoryGradebook>) {
    let gradebook = Arc::new(MemoryGradebook::new());
    let service = Arc::new(GradebookService::new(
        ServiceConfig::new(ROOT),
        gradebook.clone(),
        gradebook.clone(),
        gradebook.clone(),
        gradebook.clone(),
    ));
    (ServiceRegistry::new(service), gradebook)
}

pub fn seed_service_item(
    gradebook: &MemoryGradebook,
    course_id: &str,
    name: &str,
    grade_max: f64,
) -> i64 {
    let item_id = gradebook
        .create_item(&GradeItem {
            course_id: course_id.to_string(),
            item_name: name.to_string(),
            grade_max,
            item_type: "mod".to_string(),
            item_module: "lti".to_string(),
            ..Default::default()
        })
        .unwrap();
    gradebook
        .record_ownership(item_id, &proxy(), None)
        .unwrap();
    item_id
}

pub fn seed_legacy_item(
    gradebook: &MemoryGradebook,
    course_id: &str,
    name: &str,
    grade_max: f64,
    launcher: &ToolProxyId,
) -> i64 {
    let item_id = gradebook
        .create_item(&GradeItem {
            course_id: course_id.to_string(),
            item_name: name.to_string(),
            grade_max,
            item_type: "mod".to_string(),
            item_module: "lti".to_string(),
            ..Default::default()
        })
        .unwrap();
    gradebook
        .legacy_launches
        .lock()
        .unwrap()
        .insert(item_id, launcher.clone());
    item_id
}

pub fn seed_empty_grade(gradebook: &MemoryGradebook, item_id: i64, user_id: &str) {
    gradebook.grades.lock().unwrap().push(GradeRecord {
        item_id,
        user_id: user_id.to_string(),
        ..Default::default()
    });
}

pub fn seed_user(gradebook: &MemoryGradebook, user_id: &str) {
    gradebook.users.lock().unwrap().push(user_id.to_string());
}

pub fn request(method: HttpMethod, path: &str) -> ServiceRequest {
    ServiceRequest {
        method,
        path: path.to_string(),
        ..Default::default()
    }
}

pub fn request_with_body(
    method: HttpMethod,
    path: &str,
    content_type: &str,
    body: &str,
) -> ServiceRequest {
    ServiceRequest {
        method,
        path: path.to_string(),
        content_type: Some(content_type.to_string()),
        body: body.to_string(),
        ..Default::default()
    }
}
