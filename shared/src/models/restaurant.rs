//! Restaurants and business hours

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Restaurant row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: i64,
}

/// One weekly opening window
///
/// Times carry a full date. A close on a later calendar day than the open
/// marks an overnight window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BusinessHour {
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    pub open_time: NaiveDateTime,
    pub close_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CuisineType {
    pub id: i64,
    pub description: String,
}

/// Restaurant with its week and current availability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantView {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub cuisine_types: Vec<CuisineType>,
    pub hours: Vec<BusinessHour>,
    pub is_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub restaurant_id: i64,
    pub is_open: bool,
}

/// One day of a weekly hours replacement; both times absent means closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHourInput {
    pub weekday: u8,
    /// "HH:MM"
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
}
