//! Geography Engine Trait and Core Types
//!
//! This module defines the storage abstraction the report runs against.
//! Each engine (`MongoDB`, in-memory) implements the `GeographyEngine` trait.
//!
//! # One Operation Per Query
//! Every query in the report is a single trait method. Engines translate it
//! directly to their own primitives; there is no shared query language.
//!
//! # Deterministic Ordering
//! Both engines break ties the same way:
//! - ranked queries sort on `Name` ascending after the ranked field
//! - the "most countries" grouping sorts on continent id ascending after the count
//! - countries per continent are ordered by continent name

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ContinentCount, Country};
use crate::seed::{SeedData, SeedSummary};

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongo;

/// Supported engine types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// `MongoDB` server reached through the official driver
    #[serde(rename = "mongodb")]
    MongoDb,
    /// In-process collections holding the sample dataset
    Memory,
}

impl EngineKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MongoDb => "mongodb",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric country field used by ranked queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Area,
    Population,
}

impl RankBy {
    /// Stored field name
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Population => "Population",
        }
    }
}

/// Information returned after a successful ping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Engine name (`mongodb`, `memory`)
    pub engine: String,

    /// Server version string
    pub server_version: String,

    /// Name of the database the engine is bound to
    pub database: String,
}

/// Geography engine trait
///
/// Methods take `&self`: an engine holds its connection for the whole run.
/// Every query is read-only except `seed`.
pub trait GeographyEngine {
    /// Engine type
    fn kind(&self) -> EngineKind;

    /// Check the server answers and describe it
    fn ping(&self) -> impl std::future::Future<Output = Result<ServerInfo>> + Send;

    /// Insert the sample dataset verbatim
    ///
    /// With `drop_existing` the three collections are emptied first.
    /// Without it, inserting over an already seeded database fails on
    /// duplicate ids.
    fn seed(
        &self,
        data: &SeedData,
        drop_existing: bool,
    ) -> impl std::future::Future<Output = Result<SeedSummary>> + Send;

    /// Every country record
    fn all_countries(&self) -> impl std::future::Future<Output = Result<Vec<Country>>> + Send;

    /// Every country name
    fn country_names(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Names of cities referenced as a capital by any country
    fn capital_names(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Id of the first continent with exactly this name
    fn continent_id(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<ObjectId>>> + Send;

    /// Names of countries on the given continent
    fn country_names_in_continent(
        &self,
        continent_id: ObjectId,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Names of countries with `Area >= min_area`
    fn country_names_with_min_area(
        &self,
        min_area: f64,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Names matching a case-insensitive regular expression
    fn country_names_matching(
        &self,
        pattern: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Names of countries with `min_area <= Area <= max_area`
    fn country_names_in_area_range(
        &self,
        min_area: f64,
        max_area: f64,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Names of countries with `Population > min_population`
    fn country_names_with_population_over(
        &self,
        min_population: i64,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Top `limit` names, descending by the ranked field
    fn top_country_names(
        &self,
        rank_by: RankBy,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Name of the country with the smallest area on the given continent
    fn smallest_country_in_continent(
        &self,
        continent_id: ObjectId,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Mean area of the continent's countries, `None` when it has none
    fn average_area_in_continent(
        &self,
        continent_id: ObjectId,
    ) -> impl std::future::Future<Output = Result<Option<f64>>> + Send;

    /// Number of country records
    fn count_countries(&self) -> impl std::future::Future<Output = Result<u64>> + Send;

    /// Name of the continent referenced by the most countries
    fn continent_with_most_countries(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Country count for every continent that has at least one country
    fn countries_per_continent(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ContinentCount>>> + Send;
}
