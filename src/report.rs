//! Report catalog
//!
//! Three fixed aggregate reports, each a single read through the gateway.
//! Every report has a total ordering so reruns over unchanged data return
//! identical frames.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::storage::{Frame, Gateway, Value};
use crate::{Error, Result};

/// Providers and receivers per city, zero-filled, alphabetical by city
pub const CITY_COVERAGE_SQL: &str = r#"
SELECT City,
       SUM(providers_count) AS Providers,
       SUM(receivers_count) AS Receivers
FROM (
    SELECT City, COUNT(*) AS providers_count, 0 AS receivers_count FROM providers GROUP BY City
    UNION ALL
    SELECT City, 0, COUNT(*) FROM receivers GROUP BY City
)
GROUP BY City
ORDER BY City
"#;

/// Listings per food type, most frequent first; ties keep first-appearance order
pub const FOOD_TYPE_FREQUENCY_SQL: &str = r#"
SELECT Food_Type, COUNT(*) AS Count_Listings
FROM food_listings
GROUP BY Food_Type
ORDER BY Count_Listings DESC, MIN(rowid)
"#;

/// Claims per status with their share of all claims
pub const CLAIM_STATUS_SQL: &str = r#"
SELECT Status, COUNT(*) AS Count_Status,
       ROUND(100.0 * COUNT(*) / (SELECT COUNT(*) FROM claims), 2) AS Percentage
FROM claims
GROUP BY Status
ORDER BY Status
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    CityCoverage,
    FoodTypeFrequency,
    ClaimStatus,
}

impl Report {
    pub fn all() -> &'static [Report] {
        &[Report::CityCoverage, Report::FoodTypeFrequency, Report::ClaimStatus]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Report::CityCoverage => "Providers & Receivers per City",
            Report::FoodTypeFrequency => "Most Common Food Types",
            Report::ClaimStatus => "Claims Status Distribution",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Report::CityCoverage => CITY_COVERAGE_SQL,
            Report::FoodTypeFrequency => FOOD_TYPE_FREQUENCY_SQL,
            Report::ClaimStatus => CLAIM_STATUS_SQL,
        }
    }

    pub fn run(&self, gateway: &Gateway) -> Result<Frame> {
        tracing::debug!("Running report {:?}", self);
        gateway.query(self.sql(), &[])
    }
}

impl FromStr for Report {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "city_coverage" | "cities" | "city" => Ok(Report::CityCoverage),
            "food_type_frequency" | "food_types" | "food_type" => Ok(Report::FoodTypeFrequency),
            "claim_status" | "claims" | "status" => Ok(Report::ClaimStatus),
            _ => Err(Error::UnknownReport(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCoverage {
    pub city: String,
    pub providers: i64,
    pub receivers: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodTypeCount {
    pub food_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimStatusShare {
    pub status: String,
    pub count: i64,
    pub percentage: f64,
}

fn text(frame: &Frame, row: usize, column: &str) -> String {
    frame.get(row, column).map(Value::to_string).unwrap_or_default()
}

fn int(frame: &Frame, row: usize, column: &str) -> i64 {
    frame.get(row, column).and_then(Value::as_i64).unwrap_or(0)
}

pub fn city_coverage(gateway: &Gateway) -> Result<Vec<CityCoverage>> {
    let frame = Report::CityCoverage.run(gateway)?;
    Ok((0..frame.len())
        .map(|i| CityCoverage {
            city: text(&frame, i, "City"),
            providers: int(&frame, i, "Providers"),
            receivers: int(&frame, i, "Receivers"),
        })
        .collect())
}

pub fn food_type_frequency(gateway: &Gateway) -> Result<Vec<FoodTypeCount>> {
    let frame = Report::FoodTypeFrequency.run(gateway)?;
    Ok((0..frame.len())
        .map(|i| FoodTypeCount {
            food_type: text(&frame, i, "Food_Type"),
            count: int(&frame, i, "Count_Listings"),
        })
        .collect())
}

pub fn claim_status_distribution(gateway: &Gateway) -> Result<Vec<ClaimStatusShare>> {
    let frame = Report::ClaimStatus.run(gateway)?;
    Ok((0..frame.len())
        .map(|i| ClaimStatusShare {
            status: text(&frame, i, "Status"),
            count: int(&frame, i, "Count_Status"),
            percentage: frame.get(i, "Percentage").and_then(Value::as_f64).unwrap_or(0.0),
        })
        .collect())
}

/// `(Status, Count_Status)` pairs from a claim status frame, in frame order.
pub fn claim_status_series(frame: &Frame) -> Vec<(String, i64)> {
    match (frame.column("Status"), frame.column("Count_Status")) {
        (Some(statuses), Some(counts)) => statuses
            .into_iter()
            .zip(counts)
            .map(|(status, count)| {
                (status.as_str().unwrap_or_default().to_string(), count.as_i64().unwrap_or(0))
            })
            .collect(),
        _ => Vec::new(),
    }
}
