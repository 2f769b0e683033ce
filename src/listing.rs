//! Food listing flows: create, read-for-edit, update and delete
//!
//! Thin glue over the [`Gateway`]. A listing is addressed by its store
//! assigned `Food_ID`; updates replace every mutable column at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::seed::parse_date;
use crate::storage::{Frame, Gateway, Value};
use crate::{values, Error, Result};

const SELECT_LISTING: &str = r#"
SELECT Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type
FROM food_listings
WHERE Food_ID = ?1
"#;

const INSERT_LISTING: &str = r#"
INSERT INTO food_listings (Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

const UPDATE_LISTING: &str = r#"
UPDATE food_listings
SET Food_Name = ?1, Quantity = ?2, Expiry_Date = ?3, Provider_ID = ?4, Provider_Type = ?5,
    Location = ?6, Food_Type = ?7, Meal_Type = ?8
WHERE Food_ID = ?9
"#;

const DELETE_LISTING: &str = "DELETE FROM food_listings WHERE Food_ID = ?1";

const LIST_CHOICES: &str = "SELECT Food_ID, Food_Name FROM food_listings ORDER BY Food_ID";

/// Every attribute of a listing except its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub food_name: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub provider_id: i64,
    pub provider_type: String,
    pub location: String,
    pub food_type: String,
    pub meal_type: String,
}

impl ListingDetails {
    /// Positional parameters in column order
    fn params(&self) -> Vec<Value> {
        values![
            self.food_name.as_str(),
            self.quantity,
            self.expiry_date.format("%Y-%m-%d").to_string(),
            self.provider_id,
            self.provider_type.as_str(),
            self.location.as_str(),
            self.food_type.as_str(),
            self.meal_type.as_str(),
        ]
    }
}

/// A stored listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListing {
    pub food_id: i64,
    #[serde(flatten)]
    pub details: ListingDetails,
}

/// Entry for a listing picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingChoice {
    pub food_id: i64,
    pub food_name: String,
}

/// Insert a new listing and return the `Food_ID` the store assigned.
pub fn create(gateway: &Gateway, details: &ListingDetails) -> Result<i64> {
    let food_id = gateway.insert(INSERT_LISTING, &details.params())?;
    tracing::info!(food_id, "Added listing {}", details.food_name);
    Ok(food_id)
}

/// Fetch one listing. `None` when no row has that id.
pub fn read_for_edit(gateway: &Gateway, food_id: i64) -> Result<Option<FoodListing>> {
    let frame = gateway.query(SELECT_LISTING, &values![food_id])?;
    if frame.is_empty() {
        return Ok(None);
    }
    row_to_listing(&frame, 0).map(Some)
}

/// Overwrite every mutable column of a listing. A missing id is a no-op.
pub fn update(gateway: &Gateway, food_id: i64, details: &ListingDetails) -> Result<()> {
    let mut params = details.params();
    params.push(Value::Integer(food_id));
    gateway.execute(UPDATE_LISTING, &params)?;
    tracing::info!(food_id, "Updated listing");
    Ok(())
}

/// Remove a listing. A missing id is a no-op.
pub fn delete(gateway: &Gateway, food_id: i64) -> Result<()> {
    gateway.execute(DELETE_LISTING, &values![food_id])?;
    tracing::info!(food_id, "Deleted listing");
    Ok(())
}

pub fn list_choices(gateway: &Gateway) -> Result<Vec<ListingChoice>> {
    let frame = gateway.query(LIST_CHOICES, &[])?;
    (0..frame.len())
        .map(|i| {
            Ok(ListingChoice {
                food_id: required_int(&frame, i, "Food_ID")?,
                food_name: optional_text(&frame, i, "Food_Name"),
            })
        })
        .collect()
}

fn row_to_listing(frame: &Frame, row: usize) -> Result<FoodListing> {
    let expiry = optional_text(frame, row, "Expiry_Date");
    let quantity = required_int(frame, row, "Quantity")?;

    Ok(FoodListing {
        food_id: required_int(frame, row, "Food_ID")?,
        details: ListingDetails {
            food_name: optional_text(frame, row, "Food_Name"),
            quantity: u32::try_from(quantity)
                .map_err(|_| Error::InvalidRow(format!("Quantity {} out of range", quantity)))?,
            expiry_date: parse_date(&expiry)?,
            provider_id: required_int(frame, row, "Provider_ID")?,
            provider_type: optional_text(frame, row, "Provider_Type"),
            location: optional_text(frame, row, "Location"),
            food_type: optional_text(frame, row, "Food_Type"),
            meal_type: optional_text(frame, row, "Meal_Type"),
        },
    })
}

fn required_int(frame: &Frame, row: usize, column: &str) -> Result<i64> {
    frame
        .get(row, column)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::InvalidRow(format!("food_listings.{} is not an integer", column)))
}

fn optional_text(frame: &Frame, row: usize, column: &str) -> String {
    frame.get(row, column).map(Value::to_string).unwrap_or_default()
}
