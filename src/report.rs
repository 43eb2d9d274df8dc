//! Geography Report
//!
//! Runs the fixed query sequence once against an engine and collects the
//! results in print order. Every query is independent; the first failure
//! aborts the report.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::engine::{GeographyEngine, RankBy};
use crate::error::Result;
use crate::model::ContinentCount;

pub const EUROPE: &str = "Europe";
pub const AFRICA: &str = "Africa";
pub const ASIA: &str = "Asia";

pub const MIN_AREA: f64 = 500_000.0;
pub const MAX_AREA: f64 = 1_000_000.0;
pub const MIN_POPULATION: i64 = 10_000_000;

/// Names containing an `a` or a `u`
pub const CONTAINS_A_OR_U: &str = "a|u";

/// Names starting with `a`
pub const STARTS_WITH_A: &str = "^a";

const TOP_N: i64 = 5;

/// Value of one report section
///
/// Output only: the untagged form cannot tell an empty list from empty counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    /// One line per element
    List(Vec<String>),
    /// Continent counts, one line per continent
    Counts(Vec<ContinentCount>),
    /// A single line, skipped when absent
    Line(Option<String>),
}

impl SectionValue {
    /// Number of output lines (not counting the separator)
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Counts(counts) => counts.len(),
            Self::Line(line) => usize::from(line.is_some()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One titled query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Stable machine-readable key
    pub key: String,

    /// Human-readable description of the query
    pub title: String,

    pub value: SectionValue,
}

/// All sections in print order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    fn push(&mut self, key: &str, title: impl Into<String>, value: SectionValue) {
        debug!(section = key, lines = value.len(), "section complete");
        self.sections.push(Section { key: key.to_string(), title: title.into(), value });
    }

    /// Look up a section by key
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }
}

/// Run every query once, in order
#[instrument(skip(engine), fields(engine = %engine.kind()))]
pub async fn run_report<E: GeographyEngine>(engine: &E) -> Result<Report> {
    info!("running geography report");
    let mut report = Report::default();

    let countries = engine.all_countries().await?;
    debug!(count = countries.len(), "loaded country records");

    report.push("country_names", "Country names", SectionValue::List(engine.country_names().await?));

    report.push("capital_names", "Capital names", SectionValue::List(engine.capital_names().await?));

    let european = match engine.continent_id(EUROPE).await? {
        Some(id) => engine.country_names_in_continent(id).await?,
        None => Vec::new(),
    };
    report.push("european_countries", "Countries in Europe", SectionValue::List(european));

    report.push(
        "min_area",
        format!("Countries with area >= {MIN_AREA}"),
        SectionValue::List(engine.country_names_with_min_area(MIN_AREA).await?),
    );

    report.push(
        "contains_a_or_u",
        "Countries with 'a' or 'u' in the name",
        SectionValue::List(engine.country_names_matching(CONTAINS_A_OR_U).await?),
    );

    report.push(
        "starts_with_a",
        "Countries starting with 'a'",
        SectionValue::List(engine.country_names_matching(STARTS_WITH_A).await?),
    );

    report.push(
        "area_range",
        format!("Countries with area between {MIN_AREA} and {MAX_AREA}"),
        SectionValue::List(engine.country_names_in_area_range(MIN_AREA, MAX_AREA).await?),
    );

    report.push(
        "population_over",
        format!("Countries with population > {MIN_POPULATION}"),
        SectionValue::List(engine.country_names_with_population_over(MIN_POPULATION).await?),
    );

    report.push(
        "top_by_area",
        format!("Top {TOP_N} countries by area"),
        SectionValue::List(engine.top_country_names(RankBy::Area, TOP_N).await?),
    );

    report.push(
        "top_by_population",
        format!("Top {TOP_N} countries by population"),
        SectionValue::List(engine.top_country_names(RankBy::Population, TOP_N).await?),
    );

    let largest_area = engine.top_country_names(RankBy::Area, 1).await?.into_iter().next();
    report.push("largest_area", "Country with the largest area", SectionValue::Line(largest_area));

    let largest_population =
        engine.top_country_names(RankBy::Population, 1).await?.into_iter().next();
    report.push(
        "largest_population",
        "Country with the largest population",
        SectionValue::Line(largest_population),
    );

    let smallest_in_africa = match engine.continent_id(AFRICA).await? {
        Some(id) => engine.smallest_country_in_continent(id).await?,
        None => None,
    };
    report.push(
        "smallest_in_africa",
        "Smallest country in Africa",
        SectionValue::Line(smallest_in_africa),
    );

    let average_in_asia = match engine.continent_id(ASIA).await? {
        Some(id) => engine.average_area_in_continent(id).await?,
        None => None,
    };
    report.push(
        "average_area_in_asia",
        "Average area in Asia",
        SectionValue::Line(average_in_asia.map(|avg| format!("Average area in {ASIA} = {avg}km^2"))),
    );

    let total = engine.count_countries().await?;
    report.push(
        "total_countries",
        "Total number of countries",
        SectionValue::Line(Some(format!("Total number of countries: {total}"))),
    );

    report.push(
        "most_countries",
        "Continent with the most countries",
        SectionValue::Line(engine.continent_with_most_countries().await?),
    );

    report.push(
        "countries_per_continent",
        "Countries per continent",
        SectionValue::Counts(engine.countries_per_continent().await?),
    );

    info!(sections = report.sections.len(), "report complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_section_order() {
        let engine = MemoryEngine::new("Geography");
        let report = run_report(&engine).await.unwrap();
        let keys: Vec<&str> = report.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "country_names",
                "capital_names",
                "european_countries",
                "min_area",
                "contains_a_or_u",
                "starts_with_a",
                "area_range",
                "population_over",
                "top_by_area",
                "top_by_population",
                "largest_area",
                "largest_population",
                "smallest_in_africa",
                "average_area_in_asia",
                "total_countries",
                "most_countries",
                "countries_per_continent",
            ]
        );
    }

    #[tokio::test]
    async fn test_unseeded_database_yields_empty_sections() {
        let engine = MemoryEngine::new("Geography");
        let report = run_report(&engine).await.unwrap();

        assert!(report.section("european_countries").unwrap().value.is_empty());
        assert_eq!(report.section("smallest_in_africa").unwrap().value, SectionValue::Line(None));
        assert_eq!(report.section("average_area_in_asia").unwrap().value, SectionValue::Line(None));
        assert_eq!(
            report.section("total_countries").unwrap().value,
            SectionValue::Line(Some("Total number of countries: 0".to_string()))
        );
    }

    #[test]
    fn test_section_value_len() {
        assert_eq!(SectionValue::List(vec!["a".into(), "b".into()]).len(), 2);
        assert_eq!(SectionValue::Line(None).len(), 0);
        assert_eq!(SectionValue::Line(Some("x".into())).len(), 1);
        assert!(SectionValue::Counts(Vec::new()).is_empty());
    }

    #[test]
    fn test_section_value_json_shapes() {
        let json = |value: SectionValue| serde_json::to_value(value).unwrap();

        assert_eq!(json(SectionValue::List(Vec::new())), serde_json::json!([]));
        assert_eq!(json(SectionValue::Counts(Vec::new())), serde_json::json!([]));
        assert_eq!(
            json(SectionValue::Counts(vec![ContinentCount { continent: "Asia".into(), count: 3 }])),
            serde_json::json!([{ "_id": "Asia", "count": 3 }])
        );
        assert_eq!(json(SectionValue::Line(None)), serde_json::Value::Null);
        assert_eq!(json(SectionValue::Line(Some("Canada".into()))), serde_json::json!("Canada"));
    }
}
