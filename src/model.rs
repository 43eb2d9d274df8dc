//! Geography Records
//!
//! Stored documents use PascalCase field names and an `_id` primary key.
//! References between records (country → continent, country → capital,
//! city → country) are plain ids and are not checked anywhere.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A continent document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continent {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(rename = "Name")]
    pub name: String,
}

/// A country document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    /// Stored as a 32-bit integer
    #[serde(rename = "Population")]
    pub population: i32,

    /// Area in square kilometres
    #[serde(rename = "Area")]
    pub area: f64,

    /// Id of the capital city (may not resolve to any city)
    #[serde(rename = "CapitalObjectId")]
    pub capital_id: ObjectId,

    #[serde(rename = "ContinentObjectId")]
    pub continent_id: ObjectId,
}

/// A city document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "CountryId")]
    pub country_id: ObjectId,
}

/// Number of countries referencing one continent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentCount {
    /// Continent name (the `$group` key)
    #[serde(rename = "_id")]
    pub continent: String,

    pub count: i64,
}

impl std::fmt::Display for ContinentCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.continent, self.count)
    }
}
