//! Visitor lifecycle service
//!
//! A visitor is created `active` by registration and moved to `exited`
//! exactly once, either by an admin (by id) or by the visitor presenting
//! the mobile number and entry code they registered with.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound};
use rand::Rng;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::VisitorsConfig,
    error::{AppError, AppResult},
    models::{
        enums::VehicleType,
        visitor::{
            NewVisitor, RegisterVisitor, RegisteredVisitor, SelfExitRequest, Visitor,
            DEFAULT_DURATION, DURATIONS,
        },
    },
    repository::VisitorStore,
};

/// Naive layouts accepted for `timeOfVisit` besides RFC 3339
const TIME_OF_VISIT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Clone)]
pub struct VisitorsService {
    store: Arc<dyn VisitorStore>,
    config: VisitorsConfig,
}

impl VisitorsService {
    pub fn new(store: Arc<dyn VisitorStore>, config: VisitorsConfig) -> Self {
        Self { store, config }
    }

    /// Register an arriving visitor and issue their entry code
    pub async fn register(&self, request: RegisterVisitor) -> AppResult<RegisteredVisitor> {
        let request = request.normalized();
        request.validate()?;

        let (Some(visitor_name), Some(mobile_number), Some(apartment_number), Some(purpose)) = (
            request.visitor_name,
            request.mobile_number,
            request.apartment_number,
            request.purpose,
        ) else {
            return Err(AppError::Validation("Required fields missing".to_string()));
        };

        let vehicle_type = match request.vehicle_type.as_deref() {
            Some(raw) => raw.parse::<VehicleType>().map_err(AppError::Validation)?,
            None => VehicleType::None,
        };

        let time_of_visit = match request.time_of_visit.as_deref() {
            Some(raw) => parse_time_of_visit(raw)
                .ok_or_else(|| AppError::Validation(format!("Invalid timeOfVisit: {}", raw)))?,
            None => now(),
        };

        let duration = request
            .duration
            .unwrap_or_else(|| DEFAULT_DURATION.to_string());
        if !DURATIONS.contains(&duration.as_str()) {
            tracing::debug!(duration = %duration, "Registering visitor with unlisted duration");
        }

        let mut visitor = NewVisitor {
            id: Uuid::new_v4(),
            visitor_name,
            mobile_number,
            apartment_number,
            vehicle_type,
            vehicle_number: request.vehicle_number.unwrap_or_default(),
            purpose,
            duration,
            time_of_visit,
            entry_code: String::new(),
        };

        let attempts = self.config.entry_code_attempts.max(1);
        for attempt in 1..=attempts {
            visitor.entry_code = generate_entry_code();

            match self.store.insert(&visitor).await {
                Ok(()) => {
                    tracing::info!(
                        visitor_id = %visitor.id,
                        apartment = %visitor.apartment_number,
                        "Visitor registered"
                    );
                    return Ok(RegisteredVisitor {
                        entry_code: visitor.entry_code,
                        visitor_id: visitor.id,
                    });
                }
                Err(AppError::Conflict(msg)) => {
                    tracing::warn!(attempt, "{}, retrying with a new code", msg);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(format!(
            "Could not allocate a unique entry code after {} attempts",
            attempts
        )))
    }

    /// Visitors still on the premises, most recent arrival first
    pub async fn list_active(&self) -> AppResult<Vec<Visitor>> {
        self.store.list_active().await
    }

    /// Mark a visitor as exited on behalf of the admin
    pub async fn admin_exit(&self, visitor_id: &str) -> AppResult<()> {
        let not_found = || AppError::NotFound("Visitor not found".to_string());

        let id = Uuid::parse_str(visitor_id.trim()).map_err(|_| not_found())?;

        if self.store.exit_by_id(id, now()).await? == 0 {
            return Err(not_found());
        }

        tracing::info!(visitor_id = %id, "Visitor exited by admin");
        Ok(())
    }

    /// Visitor checks out with the mobile number and entry code they registered with
    pub async fn self_exit(&self, request: SelfExitRequest) -> AppResult<()> {
        let request = request.normalized();
        request.validate()?;

        let (Some(mobile_number), Some(entry_code)) = (request.mobile_number, request.entry_code)
        else {
            return Err(AppError::Validation(
                "Mobile number and entry code required".to_string(),
            ));
        };

        let affected = self
            .store
            .exit_by_credentials(&mobile_number, &entry_code, now())
            .await?;

        if affected == 0 {
            return Err(AppError::NotFound(
                "No active visitor found with provided details".to_string(),
            ));
        }

        tracing::info!(affected, "Visitor checked out");
        Ok(())
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

/// Fixed marker in front of the six generated digits
pub const ENTRY_CODE_PREFIX: &str = "VC";

/// `VC` followed by six digits in 100000..=999999
pub fn generate_entry_code() -> String {
    let number: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("{}{}", ENTRY_CODE_PREFIX, number)
}

/// Parse a registrant-supplied arrival time into local wall-clock time,
/// truncated to whole seconds.
pub fn parse_time_of_visit(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local().trunc_subsecs(0));
    }

    TIME_OF_VISIT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.trunc_subsecs(0))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::VisitorStatus;
    use crate::repository::MockVisitorStore;

    fn service(store: MockVisitorStore) -> VisitorsService {
        VisitorsService::new(Arc::new(store), VisitorsConfig::default())
    }

    fn asha() -> RegisterVisitor {
        RegisterVisitor {
            visitor_name: Some("Asha".to_string()),
            mobile_number: Some("9876543210".to_string()),
            apartment_number: Some("12B".to_string()),
            purpose: Some("Delivery".to_string()),
            duration: Some("1 hour".to_string()),
            time_of_visit: Some("2024-05-01T14:30".to_string()),
            ..Default::default()
        }
    }

    fn is_entry_code(code: &str) -> bool {
        code.len() == 8
            && code.starts_with(ENTRY_CODE_PREFIX)
            && code[2..].chars().all(|c| c.is_ascii_digit())
            && !code[2..].starts_with('0')
    }

    #[test]
    fn test_generate_entry_code_shape() {
        for _ in 0..1000 {
            let code = generate_entry_code();
            assert!(is_entry_code(&code), "bad code {}", code);
        }
    }

    #[test]
    fn test_entry_code_fits_column() {
        // visitors.entry_code is VARCHAR(20)
        assert!(generate_entry_code().len() <= 20);
        assert_eq!(ENTRY_CODE_PREFIX.len() + 6, 8);
    }

    #[test]
    fn test_parse_time_of_visit_accepts_form_layouts() {
        let expected =
            NaiveDateTime::parse_from_str("2024-05-01 14:30:00", "%Y-%m-%d %H:%M:%S").unwrap();

        assert_eq!(parse_time_of_visit("2024-05-01T14:30"), Some(expected));
        assert_eq!(parse_time_of_visit("2024-05-01T14:30:00"), Some(expected));
        assert_eq!(parse_time_of_visit("2024-05-01 14:30:00"), Some(expected));
        assert_eq!(parse_time_of_visit("2024-05-01T14:30:00.750"), Some(expected));
        assert_eq!(
            parse_time_of_visit("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_parse_time_of_visit_converts_offsets_to_local() {
        let expected = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();

        assert_eq!(parse_time_of_visit("2024-05-01T09:00:00.123Z"), Some(expected));
    }

    #[test]
    fn test_parse_time_of_visit_rejects_garbage() {
        assert_eq!(parse_time_of_visit("tomorrow"), None);
        assert_eq!(parse_time_of_visit("2024-13-01T10:00"), None);
    }

    #[tokio::test]
    async fn test_register_inserts_active_record() {
        let mut store = MockVisitorStore::new();
        store
            .expect_insert()
            .withf(|v| {
                v.visitor_name == "Asha"
                    && v.mobile_number == "9876543210"
                    && v.apartment_number == "12B"
                    && v.vehicle_type == VehicleType::None
                    && v.vehicle_number.is_empty()
                    && v.duration == "1 hour"
                    && v.time_of_visit.to_string() == "2024-05-01 14:30:00"
                    && is_entry_code(&v.entry_code)
            })
            .times(1)
            .returning(|_| Ok(()));

        let registered = service(store).register(asha()).await.unwrap();
        assert!(is_entry_code(&registered.entry_code));
        assert!(!registered.visitor_id.is_nil());
    }

    #[tokio::test]
    async fn test_register_defaults_time_duration_and_vehicle() {
        let before = now();
        let mut store = MockVisitorStore::new();
        store
            .expect_insert()
            .withf(move |v| {
                v.time_of_visit >= before
                    && v.duration == DEFAULT_DURATION
                    && v.vehicle_type == VehicleType::None
            })
            .times(1)
            .returning(|_| Ok(()));

        let request = RegisterVisitor {
            time_of_visit: Some(String::new()),
            duration: None,
            vehicle_type: Some(String::new()),
            ..asha()
        };
        service(store).register(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_keeps_vehicle_details() {
        let mut store = MockVisitorStore::new();
        store
            .expect_insert()
            .withf(|v| v.vehicle_type == VehicleType::Car && v.vehicle_number == "KA01AB1234")
            .times(1)
            .returning(|_| Ok(()));

        let request = RegisterVisitor {
            vehicle_type: Some("Car".to_string()),
            vehicle_number: Some("KA01AB1234".to_string()),
            ..asha()
        };
        service(store).register(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_missing_required_field_persists_nothing() {
        let cases = [
            RegisterVisitor { visitor_name: None, ..asha() },
            RegisterVisitor { mobile_number: None, ..asha() },
            RegisterVisitor { apartment_number: Some("  ".to_string()), ..asha() },
            RegisterVisitor { purpose: Some(String::new()), ..asha() },
        ];

        for request in cases {
            let mut store = MockVisitorStore::new();
            store.expect_insert().never();

            let result = service(store).register(request).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_vehicle_type() {
        let mut store = MockVisitorStore::new();
        store.expect_insert().never();

        let request = RegisterVisitor {
            vehicle_type: Some("Truck".to_string()),
            ..asha()
        };
        let result = service(store).register(request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_unparseable_time() {
        let mut store = MockVisitorStore::new();
        store.expect_insert().never();

        let request = RegisterVisitor {
            time_of_visit: Some("next tuesday".to_string()),
            ..asha()
        };
        let result = service(store).register(request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_retries_on_entry_code_collision() {
        let mut store = MockVisitorStore::new();
        let mut calls = 0;
        store.expect_insert().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(AppError::Conflict("Entry code is already in use".to_string()))
            } else {
                Ok(())
            }
        });

        let registered = service(store).register(asha()).await.unwrap();
        assert!(is_entry_code(&registered.entry_code));
    }

    #[tokio::test]
    async fn test_register_gives_up_after_configured_attempts() {
        let mut store = MockVisitorStore::new();
        store
            .expect_insert()
            .times(3)
            .returning(|_| Err(AppError::Conflict("taken".to_string())));

        let config = VisitorsConfig {
            entry_code_attempts: 3,
            ..VisitorsConfig::default()
        };
        let service = VisitorsService::new(Arc::new(store), config);

        let result = service.register(asha()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_register_does_not_retry_store_failures() {
        let mut store = MockVisitorStore::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let result = service(store).register(asha()).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_active_returns_store_order() {
        let mut store = MockVisitorStore::new();
        store.expect_list_active().times(1).returning(|| {
            let visitor = |name: &str, time: &str| Visitor {
                id: Uuid::new_v4(),
                visitor_name: name.to_string(),
                mobile_number: "9876543210".to_string(),
                apartment_number: "12B".to_string(),
                vehicle_type: VehicleType::None,
                vehicle_number: None,
                purpose: "Delivery".to_string(),
                duration: "1 hour".to_string(),
                time_of_visit: parse_time_of_visit(time).unwrap(),
                entry_code: "VC123456".to_string(),
                exit_time: None,
                status: VisitorStatus::Active,
            };
            Ok(vec![
                visitor("Later", "2024-05-01T15:00"),
                visitor("Earlier", "2024-05-01T09:00"),
            ])
        });

        let visitors = service(store).list_active().await.unwrap();
        let names: Vec<_> = visitors.iter().map(|v| v.visitor_name.as_str()).collect();
        assert_eq!(names, vec!["Later", "Earlier"]);
    }

    #[tokio::test]
    async fn test_admin_exit_success() {
        let id = Uuid::new_v4();
        let mut store = MockVisitorStore::new();
        store
            .expect_exit_by_id()
            .withf(move |visitor_id, _| *visitor_id == id)
            .times(1)
            .returning(|_, _| Ok(1));

        service(store).admin_exit(&id.to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_exit_twice_reports_not_found() {
        let mut store = MockVisitorStore::new();
        let mut exited = false;
        store.expect_exit_by_id().times(2).returning(move |_, _| {
            let affected = if exited { 0 } else { 1 };
            exited = true;
            Ok(affected)
        });

        let service = service(store);
        let id = Uuid::new_v4().to_string();
        assert!(service.admin_exit(&id).await.is_ok());
        assert!(matches!(service.admin_exit(&id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_admin_exit_malformed_id_is_not_found() {
        let mut store = MockVisitorStore::new();
        store.expect_exit_by_id().never();

        let result = service(store).admin_exit("not-a-uuid").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_self_exit_matches_trimmed_credentials() {
        let mut store = MockVisitorStore::new();
        store
            .expect_exit_by_credentials()
            .withf(|mobile, code, _| mobile == "9876543210" && code == "VC123456")
            .times(1)
            .returning(|_, _, _| Ok(1));

        let request = SelfExitRequest {
            mobile_number: Some(" 9876543210 ".to_string()),
            entry_code: Some("VC123456".to_string()),
        };
        service(store).self_exit(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_self_exit_without_match_is_not_found() {
        let mut store = MockVisitorStore::new();
        store
            .expect_exit_by_credentials()
            .times(1)
            .returning(|_, _, _| Ok(0));

        let request = SelfExitRequest {
            mobile_number: Some("9876543210".to_string()),
            entry_code: Some("VC000000".to_string()),
        };
        let result = service(store).self_exit(request).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_self_exit_requires_both_fields() {
        let mut store = MockVisitorStore::new();
        store.expect_exit_by_credentials().never();

        let service = service(store);
        let missing_code = SelfExitRequest {
            mobile_number: Some("9876543210".to_string()),
            entry_code: None,
        };
        let missing_mobile = SelfExitRequest {
            mobile_number: Some(String::new()),
            entry_code: Some("VC123456".to_string()),
        };

        assert!(matches!(service.self_exit(missing_code).await, Err(AppError::Validation(_))));
        assert!(matches!(service.self_exit(missing_mobile).await, Err(AppError::Validation(_))));
    }
}
