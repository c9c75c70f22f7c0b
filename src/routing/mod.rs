//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Controller::routes() (static declarations)
//!     → template.rs (compile `{name}` templates to anchored regexes)
//!     → router.rs (append in registration order)
//!     → Freeze as immutable Router, shared via Arc
//!
//! Incoming Request (raw path, method, body)
//!     → router.rs (strip base path, scan routes)
//!     → template.rs (full-path match, capture params)
//!     → controller.rs (build controller from context, run action)
//!     → ApiResponse, explicit 404, or the action's error
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order is priority)
//! - Malformed templates fail registration unless lenient mode is configured

pub mod controller;
pub mod router;
pub mod template;

pub use controller::{
    Action, ActionRequest, ActionResult, Controller, ControllerError, PathParams, RouteDecl,
};
pub use router::{normalize_path, RouteError, RouteInfo, RouteMatch, Router};
pub use template::{RouteTemplate, TemplateError, TemplateMode};
