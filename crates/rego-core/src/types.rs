//! Shared types used across the lookup service.
//!
//! `Plate` is the validated request input; `VehicleRecord` is the fixed-shape
//! result serialized back to the caller.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters the lookup form accepts for a plate.
pub const MAX_PLATE_LEN: usize = 6;

/// Newtype for a registration plate that passed request validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Plate(String);

impl Plate {
    /// Validate the raw `rego` query value.
    ///
    /// Length is counted in characters, not bytes.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let raw = match raw {
            Some(value) if !value.is_empty() => value,
            _ => return Err(ValidationError::Missing),
        };

        if raw.chars().count() > MAX_PLATE_LEN {
            return Err(ValidationError::TooLong { max: MAX_PLATE_LEN });
        }

        Ok(Self(raw.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Labelled values read from the repeated label/value rows of the results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelField {
    /// Tare weight
    TareWeight,
    /// Gross vehicle mass
    GrossWeight,
    /// Registration expiry date
    RegistrationExpiration,
    /// Registration conditions
    RegistrationConditions,
    /// CTP insurance period
    CtpPeriod,
    /// CTP insurer name
    InsurersName,
    /// CTP insurer code
    InsurersCode,
}

impl LabelField {
    /// All labelled fields in page order.
    pub const ALL: [LabelField; 7] = [
        LabelField::TareWeight,
        LabelField::GrossWeight,
        LabelField::RegistrationExpiration,
        LabelField::RegistrationConditions,
        LabelField::CtpPeriod,
        LabelField::InsurersName,
        LabelField::InsurersCode,
    ];

    /// Value reported when the page leaves this field empty.
    #[must_use]
    pub fn default_fallback(self) -> &'static str {
        match self {
            LabelField::TareWeight | LabelField::GrossWeight => "0",
            _ => "N/A",
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Vehicle details
    pub vehicle: Vehicle,
    /// Compulsory third-party insurance details
    pub insurance: Insurance,
}

/// Vehicle section of a [`VehicleRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Make and model as displayed by the lookup page
    pub model: String,
    /// VIN or chassis number
    pub identification_number: String,
    /// Vehicle weights
    pub weight: Weight,
    /// Registration status
    pub registration: Registration,
}

/// Tare and gross weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    /// Tare weight
    pub tare: String,
    /// Gross vehicle mass
    pub gross: String,
}

/// Registration expiry and conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Expiry date
    pub expiration: String,
    /// Conditions attached to the registration
    pub conditions: String,
}

/// CTP insurance details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    /// Policy period
    pub ctp_period: String,
    /// Insurer name
    pub insurers_name: String,
    /// Insurer code
    pub insurers_code: String,
}

impl VehicleRecord {
    /// Create a record for an identified vehicle with every labelled field
    /// set to its fallback value.
    pub fn new(model: impl Into<String>, identification_number: impl Into<String>) -> Self {
        let fallback = |field: LabelField| field.default_fallback().to_string();
        Self {
            vehicle: Vehicle {
                model: model.into(),
                identification_number: identification_number.into(),
                weight: Weight {
                    tare: fallback(LabelField::TareWeight),
                    gross: fallback(LabelField::GrossWeight),
                },
                registration: Registration {
                    expiration: fallback(LabelField::RegistrationExpiration),
                    conditions: fallback(LabelField::RegistrationConditions),
                },
            },
            insurance: Insurance {
                ctp_period: fallback(LabelField::CtpPeriod),
                insurers_name: fallback(LabelField::InsurersName),
                insurers_code: fallback(LabelField::InsurersCode),
            },
        }
    }

    /// Store a labelled value in its slot.
    pub fn set(&mut self, field: LabelField, value: String) {
        let slot = match field {
            LabelField::TareWeight => &mut self.vehicle.weight.tare,
            LabelField::GrossWeight => &mut self.vehicle.weight.gross,
            LabelField::RegistrationExpiration => &mut self.vehicle.registration.expiration,
            LabelField::RegistrationConditions => &mut self.vehicle.registration.conditions,
            LabelField::CtpPeriod => &mut self.insurance.ctp_period,
            LabelField::InsurersName => &mut self.insurance.insurers_name,
            LabelField::InsurersCode => &mut self.insurance.insurers_code,
        };
        *slot = value;
    }
}
