use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw trip form as submitted by the page or the JSON API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripForm {
    pub from_city: String,
    pub destination_city: String,
    pub date_from: String,
    pub date_to: String,
    pub interests: String,
}

impl TripForm {
    /// Pre-filled values shown on a fresh page.
    pub fn with_defaults(today: NaiveDate) -> Self {
        let today = today.format(DATE_FORMAT).to_string();
        Self {
            from_city: "New Delhi".to_string(),
            destination_city: "Rome".to_string(),
            date_from: today.clone(),
            date_to: today,
            interests: "sightseeing and good food".to_string(),
        }
    }

    pub fn validate(&self) -> Result<TripRequest, ValidationError> {
        let fields = [
            ("From City", self.from_city.trim()),
            ("Destination City", self.destination_city.trim()),
            ("Departure Date", self.date_from.trim()),
            ("Return Date", self.date_to.trim()),
            ("Interests", self.interests.trim()),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| *label)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let date_from = parse_date("Departure Date", &self.date_from)?;
        let date_to = parse_date("Return Date", &self.date_to)?;
        if date_to < date_from {
            return Err(ValidationError::ReturnBeforeDeparture);
        }

        Ok(TripRequest {
            from_city: self.from_city.trim().to_string(),
            destination_city: self.destination_city.trim().to_string(),
            date_from,
            date_to,
            interests: self.interests.trim().to_string(),
        })
    }
}

impl From<&TripRequest> for TripForm {
    fn from(request: &TripRequest) -> Self {
        Self {
            from_city: request.from_city.clone(),
            destination_city: request.destination_city.clone(),
            date_from: request.date_from.format(DATE_FORMAT).to_string(),
            date_to: request.date_to.format(DATE_FORMAT).to_string(),
            interests: request.interests.clone(),
        }
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.trim().to_string(),
    })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields before generating your travel plan (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{field} must be a date in YYYY-MM-DD form, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Return Date must not be before Departure Date")]
    ReturnBeforeDeparture,
}

/// A validated trip. Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub from_city: String,
    pub destination_city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub interests: String,
}

impl TripRequest {
    /// Inclusive number of days between departure and return.
    pub fn trip_duration(&self) -> i64 {
        (self.date_to - self.date_from).num_days() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Research,
    Guide,
    Planning,
}

impl StageName {
    pub const ALL: [StageName; 3] = [StageName::Research, StageName::Guide, StageName::Planning];

    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Research => "research",
            StageName::Guide => "guide",
            StageName::Planning => "planning",
        }
    }

    /// Section heading used in pages and exported reports.
    pub fn section_title(self) -> &'static str {
        match self {
            StageName::Research => "Location Information",
            StageName::Guide => "Local Guide Recommendations",
            StageName::Planning => "Complete Travel Itinerary",
        }
    }

    pub fn index(self) -> usize {
        match self {
            StageName::Research => 0,
            StageName::Guide => 1,
            StageName::Planning => 2,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum StageResult {
    Output(String),
    /// Folded into the final itinerary; no separate output was recoverable.
    Unavailable,
}

impl StageResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            StageResult::Output(text) => Some(text),
            StageResult::Unavailable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TripForm {
        TripForm {
            from_city: "Paris".to_string(),
            destination_city: "Tokyo".to_string(),
            date_from: "2025-04-01".to_string(),
            date_to: "2025-04-05".to_string(),
            interests: "art".to_string(),
        }
    }

    #[test]
    fn complete_form_validates() {
        let request = form().validate().unwrap();
        assert_eq!(request.destination_city, "Tokyo");
        assert_eq!(request.date_from, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(request.trip_duration(), 5);
    }

    #[test]
    fn every_empty_field_is_reported() {
        let mut empty = form();
        empty.from_city = "   ".to_string();
        empty.interests.clear();
        assert_eq!(
            empty.validate(),
            Err(ValidationError::MissingFields(vec!["From City", "Interests"]))
        );

        let all_empty = TripForm::default().validate().unwrap_err();
        match all_empty {
            ValidationError::MissingFields(fields) => assert_eq!(fields.len(), 5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn return_before_departure_is_rejected() {
        let mut backwards = form();
        backwards.date_to = "2025-03-30".to_string();
        assert_eq!(backwards.validate(), Err(ValidationError::ReturnBeforeDeparture));
    }

    #[test]
    fn malformed_dates_name_the_field() {
        let mut bad = form();
        bad.date_from = "04/01/2025".to_string();
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().starts_with("Departure Date"));
    }

    #[test]
    fn same_day_trip_lasts_one_day() {
        let mut day_trip = form();
        day_trip.date_to = day_trip.date_from.clone();
        assert_eq!(day_trip.validate().unwrap().trip_duration(), 1);
    }
}
