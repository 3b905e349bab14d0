// Import necessary crates and modules
use crate::grade_item::{GradeItem, LineItemFilter, LookupScope, ToolProxyId};
use crate::grade_record::{GradeRecord, GradeWrite};
use thiserror::Error;

/// Failure reported by a gradebook store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("grade item not found")]
    NotFound,
    #[error("gradebook persistence failed: {0}")]
    Persistence(String),
}

/// Outcome of a grade write submitted through `GradeStore::apply_grade`.
///
/// Mirrors the status contract of the underlying grade-update collaborator; anything
/// other than `Ok` is surfaced to the caller as an internal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeUpdateStatus {
    Ok,
    Failed,
}

/// Durable store of grade items and grade records.
///
/// This library never talks to a database itself; the host provides an implementation
/// of this trait. Ownership scoping for `find_item` and `find_items` is the store's
/// responsibility: a `ServiceOwnedOnly` lookup may only return items that carry an
/// ownership record for the given proxy, while `AnyOwner` additionally admits legacy
/// items reachable through the proxy's own activity launches. The store also joins
/// the ownership record's line item tag onto returned items.
pub trait GradeStore {
    /// Creates a grade item and returns its assigned identifier.
    fn create_item(&self, item: &GradeItem) -> Result<i64, StoreError>;

    /// Persists changes to an existing grade item.
    fn update_item(&self, item: &GradeItem) -> Result<(), StoreError>;

    /// Deletes a grade item from its course.
    fn delete_item(&self, course_id: &str, item_id: i64) -> Result<(), StoreError>;

    /// Lists the grade items matching a filter.
    fn find_items(&self, filter: &LineItemFilter) -> Result<Vec<GradeItem>, StoreError>;

    /// Resolves one grade item within a course under a lookup policy.
    fn find_item(
        &self,
        course_id: &str,
        item_id: i64,
        proxy: &ToolProxyId,
        scope: LookupScope,
    ) -> Option<GradeItem>;

    /// Fetches the grade record of one user against one item.
    fn fetch_grade(&self, item_id: i64, user_id: &str) -> Option<GradeRecord>;

    /// Fetches every grade record of one item.
    fn fetch_grades(&self, item_id: i64) -> Vec<GradeRecord>;

    /// Submits one grade write, scoped by the item's course, type, module, instance
    /// and number.
    fn apply_grade(&self, item: &GradeItem, write: &GradeWrite) -> GradeUpdateStatus;
}

/// Index binding service-created grade items to their owning tool proxy.
///
/// Used only at creation time; the record lives as long as its item.
pub trait OwnershipIndex {
    fn record_ownership(
        &self,
        grade_item_id: i64,
        proxy: &ToolProxyId,
        line_item_type: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Directory of users and course modules, external to this library.
pub trait Directory {
    /// True if the user exists in the host directory.
    fn user_exists(&self, user_id: &str) -> bool;

    /// Resolves a course-module identifier to the activity instance it wraps.
    fn course_module_to_activity_instance(&self, course_module_id: i64) -> Option<i64>;
}

/// Tool-proxy authorization collaborator.
///
/// Returns the authenticated proxy identity on success so the caller can thread it
/// through ownership-scoped lookups, or `None` when the request is not authorized.
pub trait ToolProxyValidator {
    fn authorize(&self, proxy_hint: Option<&str>, request_body: &str) -> Option<ToolProxyId>;
}
