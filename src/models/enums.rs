//! Shared domain enums for visitor records

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use utoipa::ToSchema;

/// Implements text-column sqlx conversions through `as_str` / `FromStr`.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// VehicleType
// ---------------------------------------------------------------------------

/// Vehicle the visitor arrived with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VehicleType {
    #[default]
    None,
    Bike,
    Car,
    Other,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::None => "None",
            VehicleType::Bike => "Bike",
            VehicleType::Car => "Car",
            VehicleType::Other => "Other",
        }
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(VehicleType::None),
            "bike" => Ok(VehicleType::Bike),
            "car" => Ok(VehicleType::Car),
            "other" => Ok(VehicleType::Other),
            _ => Err(format!("Invalid vehicle type: {}", s)),
        }
    }
}

text_column!(VehicleType);

// ---------------------------------------------------------------------------
// VisitorStatus
// ---------------------------------------------------------------------------

/// Lifecycle flag of a visit. Only `Active -> Exited` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
    Active,
    Exited,
}

impl VisitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::Active => "active",
            VisitorStatus::Exited => "exited",
        }
    }
}

impl std::str::FromStr for VisitorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(VisitorStatus::Active),
            "exited" => Ok(VisitorStatus::Exited),
            _ => Err(format!("Invalid visitor status: {}", s)),
        }
    }
}

text_column!(VisitorStatus);
