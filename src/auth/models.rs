use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub role: Role,
}

impl LoginPayload {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(invalid("password"));
        }
        Ok(())
    }
}

impl RegisterPayload {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("name"));
        }
        validate_email(&self.email)?;
        // same floor the backend enforces on signup
        if self.password.len() < 8 {
            return Err(invalid("password"));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<()> {
    if regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", email) {
        Ok(())
    } else {
        Err(invalid("email"))
    }
}

fn invalid(field: &str) -> Error {
    Error::InvalidPayload {
        field: field.to_string(),
    }
}
