//! # LTI Gradebook Services Library
//!
//! This Rust library implements the resource layer of an IMS-style Assignment and Grade
//! Services (AGS) API for a Learning Management System gradebook. It lets an external
//! tool read and write gradebook data for a course context over HTTP, using JSON-LD
//! payloads and URI templates, while the host application keeps ownership of the
//! transport, the durable gradebook store and the tool-proxy credential check.
//!
//! ## Core Features
//!
//! - **Resource Dispatch:** Five REST resources (LineItem, LineItems, Result, Score,
//!   Scores) selected by URI template matching, each with its own method and media
//!   type gates.
//! - **Grade Translation:** Bidirectional JSON-LD serialization of grade items and
//!   grade records, including score rescaling across differing maximum scales.
//! - **Ownership Scoping:** Items created through this service stay bound to the tool
//!   proxy that created them; legacy items created by direct activity launches remain
//!   readable but not writable.
//! - **Typed Failures:** Every failure is reported as a status code only, through a
//!   single error enum covering the whole taxonomy of the wire protocol.
//!
//! ## Usage
//!
//! To use this library, add it as a dependency in your `Cargo.toml`. The host supplies
//! implementations of the collaborator traits (`GradeStore`, `OwnershipIndex`,
//! `Directory`, `ToolProxyValidator`) and forwards each inbound request to a
//! `ServiceRegistry`.
//!
//! ```toml
//! [dependencies]
//! lti_gradebook_services = "0.1"
//! ```
//!
//! ### Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lti_gradebook_services::{
//!     GradebookService, ServiceConfig, ServiceRegistry, ServiceRequest,
//! };
//!
//! let service = Arc::new(GradebookService::new(
//!     ServiceConfig::new("https://lms.example.edu/lti/services"),
//!     store,      // Arc<dyn GradeStore + Send + Sync>
//!     ownership,  // Arc<dyn OwnershipIndex + Send + Sync>
//!     directory,  // Arc<dyn Directory + Send + Sync>
//!     validator,  // Arc<dyn ToolProxyValidator + Send + Sync>
//! ));
//! let registry = ServiceRegistry::new(service);
//!
//! let response = registry.dispatch(&request);
//! println!("{} {}", response.code, response.body);
//! ```
mod config; // Holds the endpoint configuration of the service.
mod error; // Typed request failures and their status codes.
mod grade_item; // Grade item model, ownership records and lookup policies.
mod grade_record; // Grade record model and grade float tolerance helpers.
mod lineitem; // The singular LineItem resource.
mod lineitems; // The LineItem container resource.
mod request; // Transport binding between the host dispatcher and the resources.
mod resource; // Resource contract and the shared request pipeline.
mod result; // The read-only Result resource.
mod score; // The singular Score resource.
mod scores; // The Score container resource.
mod service; // Central service, registry and launch-time variable substitution.
mod store; // Collaborator traits implemented by the host.
mod template; // URI templates with named placeholders.
mod translator; // JSON-LD serialization and score rescaling.

// Exports key structures for external use.
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use grade_item::{GradeItem, LineItemFilter, LookupScope, OwnershipRecord, ToolProxyId};
pub use grade_record::{
    grade_floats_different, grade_floatval, FeedbackFormat, GradeRecord, GradeWrite,
};
pub use lineitem::LineItem;
pub use lineitems::LineItems;
pub use request::{HttpMethod, ServiceRequest, ServiceResponse};
pub use resource::{
    Resource, MEDIA_TYPE_LINE_ITEM, MEDIA_TYPE_LINE_ITEM_CONTAINER, MEDIA_TYPE_RESULT,
    MEDIA_TYPE_SCORE, MEDIA_TYPE_SCORE_CONTAINER,
};
pub use result::LisResult;
pub use score::Score;
pub use scores::Scores;
pub use service::{GradebookService, ServiceRegistry, SubstitutionContext};
pub use store::{
    Directory, GradeStore, GradeUpdateStatus, OwnershipIndex, StoreError, ToolProxyValidator,
};
pub use template::UriTemplate;
pub use translator::{
    format_timestamp, item_to_json, numeric_id, parse_timestamp, rescale_raw_grade,
    result_to_json, score_to_json, AssignedActivity, LineItemPayload, ResultAgent, ScorePayload,
};
