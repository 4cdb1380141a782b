use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Country every blank payer record starts with.
pub const DEFAULT_COUNTRY: &str = "United Kingdom";

/// Who is paying: the passenger themselves, or somebody else on their behalf.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayerMode {
    #[serde(rename = "SELF")]
    SelfPay,
    ThirdParty,
}

impl FromStr for PayerMode {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self" => Ok(Self::SelfPay),
            "third_party" | "third-party" | "thirdparty" => Ok(Self::ThirdParty),
            other => Err(FlowError::ValidationError(format!(
                "Unknown payer mode: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    #[default]
    Individual,
    Company,
}

impl FromStr for EntityType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "company" => Ok(Self::Company),
            other => Err(FlowError::ValidationError(format!(
                "Unknown entity type: {}",
                other
            ))),
        }
    }
}

/// Editable fields of a [`PayerRecord`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PayerField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    AddressLine1,
    AddressLine2,
    City,
    PostalCode,
    Country,
    CompanyName,
    RegistrationNumber,
}

impl PayerField {
    /// Fields that must be non-blank before a verification can pass.
    pub const REQUIRED: [PayerField; 8] = [
        PayerField::FirstName,
        PayerField::LastName,
        PayerField::Email,
        PayerField::Phone,
        PayerField::DateOfBirth,
        PayerField::AddressLine1,
        PayerField::City,
        PayerField::PostalCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayerField::FirstName => "firstName",
            PayerField::LastName => "lastName",
            PayerField::Email => "email",
            PayerField::Phone => "phone",
            PayerField::DateOfBirth => "dateOfBirth",
            PayerField::AddressLine1 => "addressLine1",
            PayerField::AddressLine2 => "addressLine2",
            PayerField::City => "city",
            PayerField::PostalCode => "postalCode",
            PayerField::Country => "country",
            PayerField::CompanyName => "companyName",
            PayerField::RegistrationNumber => "registrationNumber",
        }
    }
}

impl fmt::Display for PayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayerField {
    type Err = FlowError;

    /// Accepts both `firstName` and `first_name` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let field = match normalized.as_str() {
            "firstname" => PayerField::FirstName,
            "lastname" => PayerField::LastName,
            "email" => PayerField::Email,
            "phone" => PayerField::Phone,
            "dateofbirth" | "dob" => PayerField::DateOfBirth,
            "addressline1" => PayerField::AddressLine1,
            "addressline2" => PayerField::AddressLine2,
            "city" => PayerField::City,
            "postalcode" | "postcode" => PayerField::PostalCode,
            "country" => PayerField::Country,
            "companyname" => PayerField::CompanyName,
            "registrationnumber" => PayerField::RegistrationNumber,
            _ => {
                return Err(FlowError::ValidationError(format!(
                    "Unknown payer field: {}",
                    s.trim()
                )));
            }
        };
        Ok(field)
    }
}

/// The mutable payer-input record edited on the details screen.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct PayerRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub company_name: String,
    pub registration_number: String,
}

impl Default for PayerRecord {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            date_of_birth: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            company_name: String::new(),
            registration_number: String::new(),
        }
    }
}

impl PayerRecord {
    pub fn get(&self, field: PayerField) -> &str {
        match field {
            PayerField::FirstName => &self.first_name,
            PayerField::LastName => &self.last_name,
            PayerField::Email => &self.email,
            PayerField::Phone => &self.phone,
            PayerField::DateOfBirth => &self.date_of_birth,
            PayerField::AddressLine1 => &self.address_line1,
            PayerField::AddressLine2 => &self.address_line2,
            PayerField::City => &self.city,
            PayerField::PostalCode => &self.postal_code,
            PayerField::Country => &self.country,
            PayerField::CompanyName => &self.company_name,
            PayerField::RegistrationNumber => &self.registration_number,
        }
    }

    pub fn set(&mut self, field: PayerField, value: String) {
        let slot = match field {
            PayerField::FirstName => &mut self.first_name,
            PayerField::LastName => &mut self.last_name,
            PayerField::Email => &mut self.email,
            PayerField::Phone => &mut self.phone,
            PayerField::DateOfBirth => &mut self.date_of_birth,
            PayerField::AddressLine1 => &mut self.address_line1,
            PayerField::AddressLine2 => &mut self.address_line2,
            PayerField::City => &mut self.city,
            PayerField::PostalCode => &mut self.postal_code,
            PayerField::Country => &mut self.country,
            PayerField::CompanyName => &mut self.company_name,
            PayerField::RegistrationNumber => &mut self.registration_number,
        };
        *slot = value;
    }

    /// Required fields that are empty after trimming, in declaration order.
    pub fn missing_required_fields(&self) -> Vec<PayerField> {
        PayerField::REQUIRED
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    /// Company fields that are blank. Only meaningful for company payers.
    pub fn missing_company_fields(&self) -> Vec<PayerField> {
        [PayerField::CompanyName, PayerField::RegistrationNumber]
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

/// A partial edit: one or more field values to merge into a record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct PayerEdit(pub Vec<(PayerField, String)>);

impl PayerEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: PayerField, value: impl Into<String>) -> Self {
        Self(vec![(field, value.into())])
    }

    pub fn set(mut self, field: PayerField, value: impl Into<String>) -> Self {
        self.0.push((field, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
