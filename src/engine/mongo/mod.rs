//! `MongoDB` Geography Engine Implementation
//!
//! This module implements the `GeographyEngine` trait for a `MongoDB` server.
//!
//! # Features
//! - Connection string parsing via `ClientOptions::parse`
//! - Typed collection handles for continents, countries and cities
//! - Name-only projections deserialized into a narrow document type
//! - Aggregation pipelines for averages and grouping
//!
//! # Implementation Notes
//! - Uses the official `mongodb` async driver (requires tokio runtime)
//! - One `Client` is held for the engine's lifetime; the driver pools connections
//! - Server selection is lazy: a bad host surfaces on the first query, or on `ping`
//! - Connection strings are redacted before logging

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, FindOneOptions, FindOptions};
use mongodb::{Client, Collection, Database};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::{redact_uri, Settings};
use crate::engine::{EngineKind, GeographyEngine, RankBy, ServerInfo};
use crate::error::{GeoError, Result};
use crate::model::{City, Continent, ContinentCount, Country};
use crate::seed::{SeedData, SeedSummary};

/// How long the driver waits for a usable server before failing a query
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Projection target for name-only queries
#[derive(Debug, Deserialize)]
struct NameOnly {
    #[serde(rename = "Name", default)]
    name: Option<String>,
}

fn name_projection() -> Document {
    doc! { "Name": 1, "_id": 0 }
}

fn query_err(context: &'static str) -> impl FnOnce(mongodb::error::Error) -> GeoError {
    move |e| GeoError::query_failed(format!("{context}: {e}"))
}

fn seed_err(collection: &'static str) -> impl FnOnce(mongodb::error::Error) -> GeoError {
    move |e| GeoError::seed_failed(format!("Failed to seed {collection}: {e}"))
}

/// Filter for `min <= Area <= max`
fn area_range_filter(min_area: f64, max_area: f64) -> Document {
    doc! { "Area": { "$gte": min_area, "$lte": max_area } }
}

/// Case-insensitive regular expression on `Name`
fn name_pattern_filter(pattern: &str) -> Document {
    doc! { "Name": { "$regex": pattern, "$options": "i" } }
}

/// Descending by the ranked field, then by name
fn ranked_sort(rank_by: RankBy) -> Document {
    let mut sort = Document::new();
    sort.insert(rank_by.field(), -1);
    sort.insert("Name", 1);
    sort
}

/// Limit to send to the server, or `None` when nothing should be returned
///
/// The server reads a limit of 0 as "no limit".
fn server_limit(limit: i64) -> Result<Option<i64>> {
    match limit {
        0 => Ok(None),
        n if n > 0 => Ok(Some(n)),
        n => Err(GeoError::invalid_input(format!("Limit must be non-negative, got {n}"))),
    }
}

fn average_area_pipeline(continent_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "ContinentObjectId": continent_id } },
        doc! { "$group": { "_id": Bson::Null, "average": { "$avg": "$Area" } } },
    ]
}

fn most_countries_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$ContinentObjectId", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1, "_id": 1 } },
        doc! { "$limit": 1 },
    ]
}

fn countries_per_continent_pipeline(countries_collection: &str) -> Vec<Document> {
    vec![
        doc! {
            "$lookup": {
                "from": countries_collection,
                "localField": "_id",
                "foreignField": "ContinentObjectId",
                "as": "Countries",
            }
        },
        doc! { "$unwind": "$Countries" },
        doc! { "$group": { "_id": "$Name", "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// `MongoDB` engine implementation
#[derive(Debug, Clone)]
pub struct MongoEngine {
    client: Client,
    database: Database,
    countries_collection: String,
    continents: Collection<Continent>,
    countries: Collection<Country>,
    cities: Collection<City>,
}

impl MongoEngine {
    /// Build a client for the configured server and bind the three collections
    #[instrument(skip(settings), fields(uri = %redact_uri(&settings.uri), database = %settings.database))]
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let mut options = ClientOptions::parse(&settings.uri).await.map_err(|e| {
            GeoError::connection_failed(format!(
                "Invalid connection string '{}': {e}",
                redact_uri(&settings.uri)
            ))
        })?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options).map_err(|e| {
            GeoError::connection_failed(format!("Failed to create MongoDB client: {e}"))
        })?;

        let database = client.database(&settings.database);
        let names = &settings.collections;
        debug!(
            continents = %names.continents,
            countries = %names.countries,
            cities = %names.cities,
            "binding collections"
        );

        Ok(Self {
            continents: database.collection(&names.continents),
            countries: database.collection(&names.countries),
            cities: database.collection(&names.cities),
            countries_collection: names.countries.clone(),
            database,
            client,
        })
    }

    async fn collect_names(
        &self,
        filter: Document,
        sort: Option<Document>,
        limit: Option<i64>,
    ) -> Result<Vec<String>> {
        let mut options = FindOptions::default();
        options.projection = Some(name_projection());
        options.sort = sort;
        options.limit = limit;

        let cursor = self
            .countries
            .clone_with_type::<NameOnly>()
            .find(filter)
            .with_options(options)
            .await
            .map_err(query_err("Failed to query country names"))?;

        let docs: Vec<NameOnly> =
            cursor.try_collect().await.map_err(query_err("Failed to read country names"))?;
        Ok(docs.into_iter().filter_map(|d| d.name).collect())
    }

    async fn first_name(&self, filter: Document, sort: Document) -> Result<Option<String>> {
        let mut options = FindOneOptions::default();
        options.projection = Some(name_projection());
        options.sort = Some(sort);

        let found = self
            .countries
            .clone_with_type::<NameOnly>()
            .find_one(filter)
            .with_options(options)
            .await
            .map_err(query_err("Failed to query country"))?;
        Ok(found.and_then(|d| d.name))
    }
}

impl GeographyEngine for MongoEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::MongoDb
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<ServerInfo> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| GeoError::connection_failed(format!("Failed to ping MongoDB: {e}")))?;

        let build_info = self
            .database
            .run_command(doc! { "buildInfo": 1 })
            .await
            .map_err(|e| GeoError::connection_failed(format!("Failed to query build info: {e}")))?;

        let server_version = build_info.get_str("version").unwrap_or("unknown").to_string();
        info!(version = %server_version, "connected to MongoDB");

        Ok(ServerInfo {
            engine: EngineKind::MongoDb.to_string(),
            server_version,
            database: self.database.name().to_string(),
        })
    }

    #[instrument(skip(self, data))]
    async fn seed(&self, data: &SeedData, drop_existing: bool) -> Result<SeedSummary> {
        if drop_existing {
            debug!("dropping collections before seeding");
            self.continents.drop().await.map_err(seed_err("Continents"))?;
            self.countries.drop().await.map_err(seed_err("Countries"))?;
            self.cities.drop().await.map_err(seed_err("Cities"))?;
        }

        let continents =
            self.continents.insert_many(&data.continents).await.map_err(seed_err("Continents"))?;
        let countries =
            self.countries.insert_many(&data.countries).await.map_err(seed_err("Countries"))?;
        let cities = self.cities.insert_many(&data.cities).await.map_err(seed_err("Cities"))?;

        Ok(SeedSummary {
            continents: continents.inserted_ids.len(),
            countries: countries.inserted_ids.len(),
            cities: cities.inserted_ids.len(),
        })
    }

    async fn all_countries(&self) -> Result<Vec<Country>> {
        let cursor = self
            .countries
            .find(doc! {})
            .await
            .map_err(query_err("Failed to query countries"))?;
        cursor.try_collect().await.map_err(query_err("Failed to read countries"))
    }

    async fn country_names(&self) -> Result<Vec<String>> {
        self.collect_names(doc! {}, None, None).await
    }

    async fn capital_names(&self) -> Result<Vec<String>> {
        let capital_ids = self
            .countries
            .distinct("CapitalObjectId", doc! {})
            .await
            .map_err(query_err("Failed to query capital ids"))?;

        let mut options = FindOptions::default();
        options.projection = Some(name_projection());

        let cursor = self
            .cities
            .clone_with_type::<NameOnly>()
            .find(doc! { "_id": { "$in": capital_ids } })
            .with_options(options)
            .await
            .map_err(query_err("Failed to query capitals"))?;

        let docs: Vec<NameOnly> =
            cursor.try_collect().await.map_err(query_err("Failed to read capitals"))?;
        Ok(docs.into_iter().filter_map(|d| d.name).collect())
    }

    async fn continent_id(&self, name: &str) -> Result<Option<ObjectId>> {
        let found = self
            .continents
            .find_one(doc! { "Name": name })
            .await
            .map_err(query_err("Failed to query continent"))?;
        Ok(found.map(|c| c.id))
    }

    async fn country_names_in_continent(&self, continent_id: ObjectId) -> Result<Vec<String>> {
        self.collect_names(doc! { "ContinentObjectId": continent_id }, None, None).await
    }

    async fn country_names_with_min_area(&self, min_area: f64) -> Result<Vec<String>> {
        self.collect_names(doc! { "Area": { "$gte": min_area } }, None, None).await
    }

    async fn country_names_matching(&self, pattern: &str) -> Result<Vec<String>> {
        self.collect_names(name_pattern_filter(pattern), None, None).await
    }

    async fn country_names_in_area_range(&self, min_area: f64, max_area: f64) -> Result<Vec<String>> {
        self.collect_names(area_range_filter(min_area, max_area), None, None).await
    }

    async fn country_names_with_population_over(&self, min_population: i64) -> Result<Vec<String>> {
        self.collect_names(doc! { "Population": { "$gt": min_population } }, None, None).await
    }

    async fn top_country_names(&self, rank_by: RankBy, limit: i64) -> Result<Vec<String>> {
        let Some(limit) = server_limit(limit)? else {
            return Ok(Vec::new());
        };
        self.collect_names(doc! {}, Some(ranked_sort(rank_by)), Some(limit)).await
    }

    async fn smallest_country_in_continent(&self, continent_id: ObjectId) -> Result<Option<String>> {
        self.first_name(doc! { "ContinentObjectId": continent_id }, doc! { "Area": 1, "Name": 1 })
            .await
    }

    async fn average_area_in_continent(&self, continent_id: ObjectId) -> Result<Option<f64>> {
        let cursor = self
            .countries
            .aggregate(average_area_pipeline(continent_id))
            .await
            .map_err(query_err("Failed to aggregate average area"))?;

        let docs: Vec<Document> =
            cursor.try_collect().await.map_err(query_err("Failed to read average area"))?;
        Ok(docs.first().and_then(|d| d.get("average")).and_then(Bson::as_f64))
    }

    async fn count_countries(&self) -> Result<u64> {
        self.countries
            .count_documents(doc! {})
            .await
            .map_err(query_err("Failed to count countries"))
    }

    async fn continent_with_most_countries(&self) -> Result<Option<String>> {
        let cursor = self
            .countries
            .aggregate(most_countries_pipeline())
            .await
            .map_err(query_err("Failed to group countries by continent"))?;

        let groups: Vec<Document> =
            cursor.try_collect().await.map_err(query_err("Failed to read continent groups"))?;

        let Some(continent_id) = groups.first().and_then(|d| d.get_object_id("_id").ok()) else {
            return Ok(None);
        };

        let continent = self
            .continents
            .find_one(doc! { "_id": continent_id })
            .await
            .map_err(query_err("Failed to query continent"))?;
        Ok(continent.map(|c| c.name))
    }

    async fn countries_per_continent(&self) -> Result<Vec<ContinentCount>> {
        let cursor = self
            .continents
            .aggregate(countries_per_continent_pipeline(&self.countries_collection))
            .await
            .map_err(query_err("Failed to aggregate countries per continent"))?;

        let docs: Vec<Document> =
            cursor.try_collect().await.map_err(query_err("Failed to read continent counts"))?;

        docs.into_iter()
            .map(|d| {
                bson::from_document(d).map_err(|e| {
                    GeoError::engine_error("mongodb", format!("Malformed continent count: {e}"))
                })
            })
            .collect()
    }
}
