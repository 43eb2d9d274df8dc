//! In-Memory Geography Engine
//!
//! This module implements the `GeographyEngine` trait over plain vectors.
//!
//! # Features
//! - No server required (`--engine memory`)
//! - Collections kept in insertion order, matching a fresh `MongoDB` collection's natural order
//! - Filters reproduce `MongoDB` semantics for the exact predicates the report uses
//! - Duplicate `_id` inserts fail the way a unique index would
//!
//! # Implementation Notes
//! - Collections live behind a `tokio::sync::RwLock`; only `seed` takes the write lock
//! - Name patterns are compiled with the `regex` crate, case-insensitive
//! - Documents without a `Name` never match a name filter and are left out of name lists

use bson::oid::ObjectId;
use regex::RegexBuilder;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::engine::{EngineKind, GeographyEngine, RankBy, ServerInfo};
use crate::error::{GeoError, Result};
use crate::model::{City, Continent, ContinentCount, Country};
use crate::seed::{SeedData, SeedSummary};

#[derive(Debug, Default)]
struct Collections {
    continents: Vec<Continent>,
    countries: Vec<Country>,
    cities: Vec<City>,
}

/// In-memory engine implementation
#[derive(Debug)]
pub struct MemoryEngine {
    database: String,
    collections: RwLock<Collections>,
}

impl MemoryEngine {
    /// Create an empty engine bound to a database name
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self { database: database.into(), collections: RwLock::new(Collections::default()) }
    }

    /// Create an engine already holding `data`
    #[must_use]
    pub fn with_data(database: impl Into<String>, data: SeedData) -> Self {
        Self {
            database: database.into(),
            collections: RwLock::new(Collections {
                continents: data.continents,
                countries: data.countries,
                cities: data.cities,
            }),
        }
    }
}

fn names<'a>(countries: impl Iterator<Item = &'a Country>) -> Vec<String> {
    countries.filter_map(|c| c.name.clone()).collect()
}

fn rank_key(country: &Country, rank_by: RankBy) -> f64 {
    match rank_by {
        RankBy::Area => country.area,
        RankBy::Population => f64::from(country.population),
    }
}

fn check_unique<'a>(
    collection: &str,
    existing: impl Iterator<Item = &'a ObjectId>,
    incoming: impl Iterator<Item = &'a ObjectId>,
) -> Result<()> {
    let mut seen: HashSet<ObjectId> = existing.copied().collect();
    for id in incoming {
        if !seen.insert(*id) {
            return Err(GeoError::seed_failed(format!(
                "duplicate key in collection {collection}: {{ _id: ObjectId('{id}') }}"
            )));
        }
    }
    Ok(())
}

impl GeographyEngine for MemoryEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Memory
    }

    async fn ping(&self) -> Result<ServerInfo> {
        Ok(ServerInfo {
            engine: EngineKind::Memory.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            database: self.database.clone(),
        })
    }

    #[instrument(skip(self, data))]
    async fn seed(&self, data: &SeedData, drop_existing: bool) -> Result<SeedSummary> {
        let mut collections = self.collections.write().await;

        if drop_existing {
            debug!("dropping in-memory collections");
            *collections = Collections::default();
        }

        // Validate all three before touching any, so a failed seed leaves nothing half-inserted
        check_unique(
            "Continents",
            collections.continents.iter().map(|c| &c.id),
            data.continents.iter().map(|c| &c.id),
        )?;
        check_unique(
            "Countries",
            collections.countries.iter().map(|c| &c.id),
            data.countries.iter().map(|c| &c.id),
        )?;
        check_unique(
            "Cities",
            collections.cities.iter().map(|c| &c.id),
            data.cities.iter().map(|c| &c.id),
        )?;

        collections.continents.extend(data.continents.iter().cloned());
        collections.countries.extend(data.countries.iter().cloned());
        collections.cities.extend(data.cities.iter().cloned());

        Ok(data.summary())
    }

    async fn all_countries(&self) -> Result<Vec<Country>> {
        Ok(self.collections.read().await.countries.clone())
    }

    async fn country_names(&self) -> Result<Vec<String>> {
        Ok(names(self.collections.read().await.countries.iter()))
    }

    async fn capital_names(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        let capital_ids: HashSet<ObjectId> =
            collections.countries.iter().map(|c| c.capital_id).collect();

        Ok(collections
            .cities
            .iter()
            .filter(|city| capital_ids.contains(&city.id))
            .filter_map(|city| city.name.clone())
            .collect())
    }

    async fn continent_id(&self, name: &str) -> Result<Option<ObjectId>> {
        Ok(self
            .collections
            .read()
            .await
            .continents
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id))
    }

    async fn country_names_in_continent(&self, continent_id: ObjectId) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(names(collections.countries.iter().filter(|c| c.continent_id == continent_id)))
    }

    async fn country_names_with_min_area(&self, min_area: f64) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(names(collections.countries.iter().filter(|c| c.area >= min_area)))
    }

    async fn country_names_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build().map_err(|e| {
            GeoError::invalid_input(format!("Invalid name pattern '{pattern}': {e}"))
        })?;

        let collections = self.collections.read().await;
        Ok(names(
            collections
                .countries
                .iter()
                .filter(|c| c.name.as_deref().is_some_and(|name| regex.is_match(name))),
        ))
    }

    async fn country_names_in_area_range(&self, min_area: f64, max_area: f64) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(names(
            collections.countries.iter().filter(|c| c.area >= min_area && c.area <= max_area),
        ))
    }

    async fn country_names_with_population_over(&self, min_population: i64) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(names(collections.countries.iter().filter(|c| i64::from(c.population) > min_population)))
    }

    async fn top_country_names(&self, rank_by: RankBy, limit: i64) -> Result<Vec<String>> {
        let limit = usize::try_from(limit)
            .map_err(|_| GeoError::invalid_input(format!("Limit must be non-negative, got {limit}")))?;

        let collections = self.collections.read().await;
        let mut ranked: Vec<&Country> = collections.countries.iter().collect();
        ranked.sort_by(|a, b| {
            rank_key(b, rank_by).total_cmp(&rank_key(a, rank_by)).then_with(|| a.name.cmp(&b.name))
        });

        Ok(names(ranked.into_iter().take(limit)))
    }

    async fn smallest_country_in_continent(&self, continent_id: ObjectId) -> Result<Option<String>> {
        let collections = self.collections.read().await;
        Ok(collections
            .countries
            .iter()
            .filter(|c| c.continent_id == continent_id)
            .min_by(|a, b| a.area.total_cmp(&b.area).then_with(|| a.name.cmp(&b.name)))
            .and_then(|c| c.name.clone()))
    }

    async fn average_area_in_continent(&self, continent_id: ObjectId) -> Result<Option<f64>> {
        let collections = self.collections.read().await;
        let areas: Vec<f64> = collections
            .countries
            .iter()
            .filter(|c| c.continent_id == continent_id)
            .map(|c| c.area)
            .collect();

        if areas.is_empty() {
            return Ok(None);
        }

        #[allow(clippy::cast_precision_loss)]
        let average = areas.iter().sum::<f64>() / areas.len() as f64;
        Ok(Some(average))
    }

    async fn count_countries(&self) -> Result<u64> {
        Ok(self.collections.read().await.countries.len() as u64)
    }

    async fn continent_with_most_countries(&self) -> Result<Option<String>> {
        let collections = self.collections.read().await;

        let mut counts: BTreeMap<ObjectId, i64> = BTreeMap::new();
        for country in &collections.countries {
            *counts.entry(country.continent_id).or_default() += 1;
        }

        // BTreeMap iterates ids ascending; keeping the first maximum breaks ties by smallest id
        let mut best: Option<(ObjectId, i64)> = None;
        for (id, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((id, count));
            }
        }

        Ok(best.and_then(|(id, _)| {
            collections.continents.iter().find(|c| c.id == id).map(|c| c.name.clone())
        }))
    }

    async fn countries_per_continent(&self) -> Result<Vec<ContinentCount>> {
        let collections = self.collections.read().await;

        let mut grouped: BTreeMap<String, i64> = BTreeMap::new();
        for continent in &collections.continents {
            let count = collections
                .countries
                .iter()
                .filter(|c| c.continent_id == continent.id)
                .count() as i64;
            // $unwind drops continents whose lookup array is empty
            if count > 0 {
                *grouped.entry(continent.name.clone()).or_default() += count;
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(continent, count)| ContinentCount { continent, count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn country(name: &str, population: i32, area: f64, continent_id: ObjectId) -> Country {
        Country {
            id: ObjectId::new(),
            name: Some(name.to_string()),
            population,
            area,
            capital_id: ObjectId::new(),
            continent_id,
        }
    }

    fn tie_data() -> SeedData {
        let a = ObjectId::parse_str("000000000000000000000001").unwrap();
        let b = ObjectId::parse_str("000000000000000000000002").unwrap();
        SeedData {
            continents: vec![
                Continent { id: b, name: "Beta".to_string() },
                Continent { id: a, name: "Alpha".to_string() },
            ],
            countries: vec![
                country("Zed", 10, 100.0, b),
                country("Yon", 10, 100.0, a),
                country("Xan", 5, 50.0, b),
                country("Wex", 5, 50.0, a),
            ],
            cities: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_engine() {
        let engine = MemoryEngine::new("Geography");
        assert!(engine.country_names().await.unwrap().is_empty());
        assert_eq!(engine.count_countries().await.unwrap(), 0);
        assert_eq!(engine.continent_id("Europe").await.unwrap(), None);
        assert_eq!(engine.continent_with_most_countries().await.unwrap(), None);
        assert!(engine.countries_per_continent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ping_reports_database() {
        let engine = MemoryEngine::new("Atlas");
        let info = engine.ping().await.unwrap();
        assert_eq!(info.engine, "memory");
        assert_eq!(info.database, "Atlas");
    }

    #[tokio::test]
    async fn test_ranked_ties_break_on_name() {
        let engine = MemoryEngine::with_data("Geography", tie_data());
        let top = engine.top_country_names(RankBy::Area, 3).await.unwrap();
        assert_eq!(top, vec!["Yon", "Zed", "Wex"]);
    }

    #[tokio::test]
    async fn test_most_countries_tie_breaks_on_smallest_id() {
        let engine = MemoryEngine::with_data("Geography", tie_data());
        let name = engine.continent_with_most_countries().await.unwrap();
        assert_eq!(name.as_deref(), Some("Alpha"));
    }

    #[tokio::test]
    async fn test_smallest_country_tie_breaks_on_name() {
        let data = tie_data();
        let beta = data.continents[0].id;
        let engine = MemoryEngine::with_data("Geography", data);
        let name = engine.smallest_country_in_continent(beta).await.unwrap();
        assert_eq!(name.as_deref(), Some("Xan"));
    }

    #[tokio::test]
    async fn test_average_of_empty_continent_is_none() {
        let engine = MemoryEngine::with_data("Geography", tie_data());
        let average = engine.average_area_in_continent(ObjectId::new()).await.unwrap();
        assert_eq!(average, None);
    }

    #[tokio::test]
    async fn test_seed_twice_without_drop_fails() {
        let engine = MemoryEngine::new("Geography");
        let data = SeedData::sample().unwrap();
        engine.seed(&data, false).await.unwrap();

        let err = engine.seed(&data, false).await.unwrap_err();
        assert_eq!(err.error_code(), "SEED_FAILED");
        assert!(err.message().contains("duplicate key"));
        assert_eq!(engine.count_countries().await.unwrap(), 13);
    }

    #[tokio::test]
    async fn test_seed_with_drop_replaces_contents() {
        let engine = MemoryEngine::with_data("Geography", tie_data());
        let summary = engine.seed(&SeedData::sample().unwrap(), true).await.unwrap();
        assert_eq!(summary.countries, 13);
        assert_eq!(engine.count_countries().await.unwrap(), 13);
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_rejected() {
        let engine = MemoryEngine::new("Geography");
        let err = engine.country_names_matching("(unclosed").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_unnamed_country_never_matches() {
        let mut data = tie_data();
        data.countries[0].name = None;
        let engine = MemoryEngine::with_data("Geography", data);
        let matched = engine.country_names_matching(".*").await.unwrap();
        assert_eq!(matched, vec!["Yon", "Xan", "Wex"]);
    }

    #[tokio::test]
    async fn test_negative_limit_is_rejected() {
        let engine = MemoryEngine::new("Geography");
        let err = engine.top_country_names(RankBy::Population, -1).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
