//! Visitor record model and request/response types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{VehicleType, VisitorStatus};

/// Visit durations offered by the registration form
pub const DURATIONS: [&str; 6] = ["1 hour", "2 hours", "3 hours", "4 hours", "Half day", "Full day"];

/// Duration stored when the registrant leaves it empty
pub const DEFAULT_DURATION: &str = "1 hour";

/// Visitor record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub id: Uuid,
    pub visitor_name: String,
    /// 10-digit mobile number (checked by the form, not here)
    pub mobile_number: String,
    pub apartment_number: String,
    pub vehicle_type: VehicleType,
    pub vehicle_number: Option<String>,
    /// Purpose of the visit
    pub purpose: String,
    /// Announced duration, informational only
    pub duration: String,
    pub time_of_visit: NaiveDateTime,
    /// Exit credential handed to the visitor (`VC` + 6 digits)
    pub entry_code: String,
    /// Set when the visitor leaves; null while active
    pub exit_time: Option<NaiveDateTime>,
    pub status: VisitorStatus,
}

/// Fully resolved record ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisitor {
    pub id: Uuid,
    pub visitor_name: String,
    pub mobile_number: String,
    pub apartment_number: String,
    pub vehicle_type: VehicleType,
    pub vehicle_number: String,
    pub purpose: String,
    pub duration: String,
    pub time_of_visit: NaiveDateTime,
    pub entry_code: String,
}

/// Register visitor request
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVisitor {
    #[validate(
        required(message = "visitorName is required"),
        length(max = 100, message = "visitorName must be at most 100 characters")
    )]
    pub visitor_name: Option<String>,
    #[validate(
        required(message = "mobileNumber is required"),
        length(max = 15, message = "mobileNumber must be at most 15 characters")
    )]
    pub mobile_number: Option<String>,
    #[validate(
        required(message = "apartmentNumber is required"),
        length(max = 50, message = "apartmentNumber must be at most 50 characters")
    )]
    pub apartment_number: Option<String>,
    /// None, Bike, Car or Other (defaults to None)
    pub vehicle_type: Option<String>,
    #[validate(length(max = 50, message = "vehicleNumber must be at most 50 characters"))]
    pub vehicle_number: Option<String>,
    #[validate(
        required(message = "purpose is required"),
        length(max = 200, message = "purpose must be at most 200 characters")
    )]
    pub purpose: Option<String>,
    /// One of the offered durations, e.g. "2 hours"
    #[validate(length(max = 50, message = "duration must be at most 50 characters"))]
    pub duration: Option<String>,
    /// Arrival time; RFC 3339 or `YYYY-MM-DDTHH:MM[:SS]`. Defaults to now.
    pub time_of_visit: Option<String>,
}

impl RegisterVisitor {
    /// Trim every field and treat blank strings as absent
    pub fn normalized(self) -> Self {
        Self {
            visitor_name: non_blank(self.visitor_name),
            mobile_number: non_blank(self.mobile_number),
            apartment_number: non_blank(self.apartment_number),
            vehicle_type: non_blank(self.vehicle_type),
            vehicle_number: non_blank(self.vehicle_number),
            purpose: non_blank(self.purpose),
            duration: non_blank(self.duration),
            time_of_visit: non_blank(self.time_of_visit),
        }
    }
}

/// Self-checkout request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelfExitRequest {
    #[validate(required(message = "Mobile number and entry code required"))]
    pub mobile_number: Option<String>,
    #[validate(required(message = "Mobile number and entry code required"))]
    pub entry_code: Option<String>,
}

impl SelfExitRequest {
    pub fn normalized(self) -> Self {
        Self {
            mobile_number: non_blank(self.mobile_number),
            entry_code: non_blank(self.entry_code),
        }
    }
}

/// Registration result handed back to the visitor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredVisitor {
    pub entry_code: String,
    pub visitor_id: Uuid,
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
