//! New-booking form validation.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Number, Value};

use crate::credentials::Credentials;
use crate::error::DraftError;

/// Raw form input for a new booking, exactly as typed by the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub client_name: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub amount_earned: String,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub client_name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount_earned: Decimal,
}

impl BookingDraft {
    /// Validate the draft, reporting the first failing rule.
    ///
    /// Rules are checked in form order: client name, destination, start
    /// date, end date, amount, then the date ordering.
    pub fn validate(&self) -> Result<ValidatedBooking, DraftError> {
        let client_name = self.client_name.trim();
        if client_name.is_empty() {
            return Err(DraftError::MissingClientName);
        }

        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(DraftError::MissingDestination);
        }

        let start_date = required_date(&self.start_date, "start date")?
            .ok_or(DraftError::MissingStartDate)?;
        let end_date =
            required_date(&self.end_date, "end date")?.ok_or(DraftError::MissingEndDate)?;

        let amount_earned = Decimal::from_str(self.amount_earned.trim())
            .map_err(|_| DraftError::InvalidAmount)?;
        if amount_earned <= Decimal::ZERO {
            return Err(DraftError::InvalidAmount);
        }

        if end_date < start_date {
            return Err(DraftError::EndBeforeStart);
        }

        Ok(ValidatedBooking {
            client_name: client_name.to_string(),
            destination: destination.to_string(),
            start_date,
            end_date,
            amount_earned,
        })
    }
}

fn required_date(raw: &str, field: &'static str) -> Result<Option<NaiveDate>, DraftError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| DraftError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

impl ValidatedBooking {
    /// Request body for creating the booking on behalf of the signed-in agent.
    pub fn to_payload(&self, credentials: &Credentials) -> Value {
        let amount = self.amount_earned.normalize().to_string();
        let amount = Number::from_str(&amount).map_or(Value::String(amount), Value::Number);

        json!({
            "agent_id": credentials.agent_id,
            "name": self.client_name,
            "client_name": self.client_name,
            "destination": self.destination,
            "start_date": self.start_date.format("%Y-%m-%d").to_string(),
            "end_date": self.end_date.format("%Y-%m-%d").to_string(),
            "amt_earned": amount,
        })
    }
}
