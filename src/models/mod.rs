//! Data models for the visitor registry

pub mod enums;
pub mod visitor;

// Re-export commonly used types
pub use enums::{VehicleType, VisitorStatus};
pub use visitor::{MessageResponse, NewVisitor, RegisterVisitor, RegisteredVisitor, SelfExitRequest, Visitor};
