// Import necessary crates and modules
use serde::{Deserialize, Serialize};

/// Identifier of an authenticated tool proxy.
///
/// Ownership-scoped lookups and ownership records are keyed by this identity. It is
/// produced by the authorization collaborator at the start of each request and threaded
/// explicitly through every call that needs it; there is no ambient "current proxy".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ToolProxyId(pub String);

impl ToolProxyId {
    pub fn new(id: impl Into<String>) -> ToolProxyId {
        ToolProxyId(id.into())
    }
}

/// Structure holding one gradable column of a course gradebook.
///
/// This struct is the internal representation every resource handler works with. It is
/// created either through the LineItems collection POST (service-owned, with a matching
/// `OwnershipRecord`) or by an unrelated legacy activity-launch path (non-service-owned).
///
/// Fields:
/// - `id`: Unique identifier of the grade item in the gradebook store.
/// - `course_id`: Identifier of the course context the item belongs to.
/// - `item_name`: Display label shown in the gradebook.
/// - `grade_max`: Score maximum; non-negative.
/// - `grade_min`: Score minimum; always 0 for items written by this service.
/// - `id_number`: External resource identifier, optional.
/// - `item_instance`: External resource-link identifier, optional and numeric.
/// - `item_type`: Owning activity type, e.g. `mod`.
/// - `item_module`: Owning activity module, e.g. `lti`.
/// - `item_number`: Sub-item ordinal used by the grade-update collaborator scope.
/// - `line_item_type`: Service-specific line item tag, populated from the ownership
///   record when the item is service-owned.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GradeItem {
    pub id: i64,
    pub course_id: String,
    pub item_name: String,
    pub grade_max: f64,
    pub grade_min: f64,
    pub id_number: Option<String>,
    pub item_instance: Option<i64>,
    pub item_type: String,
    pub item_module: String,
    pub item_number: i64,
    pub line_item_type: Option<String>,
}

/// Structure binding a service-created grade item to the tool proxy that created it.
///
/// A record exists if and only if the item was created through the collection POST
/// path. It is written atomically with its item and never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OwnershipRecord {
    pub grade_item_id: i64,
    pub tool_proxy_id: ToolProxyId,
    pub line_item_type: Option<String>,
}

/// Lookup policy for resolving a grade item on behalf of a tool proxy.
///
/// `AnyOwner` accepts both service-owned items and legacy items the proxy can reach
/// through its activity launches. `ServiceOwnedOnly` accepts only items with an
/// ownership record for the calling proxy, which is what the mutating line item
/// verbs require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupScope {
    AnyOwner,
    ServiceOwnedOnly,
}

/// Filter for listing grade items within a course context.
///
/// `resource_id` and `resource_link_id` are pass-through filters the store may honor;
/// `limit` and `page` are carried for stores that paginate but are not enforced by
/// this layer. A `tool_proxy` of `None` disables ownership scoping (used by the
/// launch-time variable substitution, which runs outside any service request).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemFilter {
    pub course_id: String,
    pub tool_proxy: Option<ToolProxyId>,
    pub resource_id: Option<String>,
    pub resource_link_id: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}
