//! Sample Geography Dataset
//!
//! The fixed records inserted by the `seed` command. Ids are literal so that
//! country → continent, country → capital and city → country references line
//! up across collections. The data is inserted verbatim, including capital
//! references that do not resolve to any city.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::model::{City, Continent, Country};

/// All records for the three collections
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub continents: Vec<Continent>,
    pub countries: Vec<Country>,
    pub cities: Vec<City>,
}

/// Number of documents inserted into each collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub continents: usize,
    pub countries: usize,
    pub cities: usize,
}

impl SeedSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.continents + self.countries + self.cities
    }
}

const CONTINENTS: &[(&str, &str)] = &[
    ("60c78a3b4b4d8e001a53d471", "Africa"),
    ("60c78a3b4b4d8e001a53d472", "Europe"),
    ("60c78a3b4b4d8e001a53d473", "Asia"),
    ("60c78a3b4b4d8e001a53d474", "North America"),
    ("60c78a3b4b4d8e001a53d475", "South America"),
    ("60c78a3b4b4d8e001a53d476", "Australia"),
    ("60c78a3b4b4d8e001a53d477", "Antarctica"),
];

// (id, name, population, area, capital id, continent id)
const COUNTRIES: &[(&str, &str, i32, f64, &str, &str)] = &[
    ("60c78a3b4b4d8e001a53d47a", "Egypt", 104_258_327, 1_002_450.0, "60c78a3b4b4d8e001a53d47b", "60c78a3b4b4d8e001a53d471"),
    ("60c78a3b4b4d8e001a53d47c", "Nigeria", 206_139_589, 923_768.0, "60c78a3b4b4d8e001a53d47d", "60c78a3b4b4d8e001a53d471"),
    ("60c78a3b4b4d8e001a53d47e", "South Africa", 59_308_690, 1_221_037.0, "60c78a3b4b4d8e001a53d47f", "60c78a3b4b4d8e001a53d471"),
    ("60c78a3b4b4d8e001a53d480", "France", 67_564_275, 551_695.0, "60c78a3b4b4d8e001a53d481", "60c78a3b4b4d8e001a53d472"),
    ("60c78a3b4b4d8e001a53d482", "Germany", 83_783_942, 357_022.0, "60c78a3b4b4d8e001a53daaa", "60c78a3b4b4d8e001a53d472"),
    ("60c78a3b4b4d8e001a53d484", "Spain", 46_754_778, 505_990.0, "60c78a3b4b4d8e001a53d485", "60c78a3b4b4d8e001a53d472"),
    ("60c78a3b4b4d8e001a53d486", "China", 1_444_216_107, 9_596_960.0, "60c78a3b4b4d8e001a53d487", "60c78a3b4b4d8e001a53d473"),
    ("60c78a3b4b4d8e001a53d488", "India", 1_393_409_038, 3_287_263.0, "60c78a3b4b4d8e001a53d489", "60c78a3b4b4d8e001a53d473"),
    ("60c78a3b4b4d8e001a53d48a", "Japan", 126_476_461, 377_975.0, "60c78a3b4b4d8e001a53d48b", "60c78a3b4b4d8e001a53d473"),
    ("60c78a3b4b4d8e001a53d46e", "United States of America", 331_002_651, 9_833_517.85, "72c78a3b4b4d8e001a53d485", "60c78a3b4b4d8e001a53d474"),
    ("60c78a3b4b4d8e001a53d48c", "Canada", 37_742_154, 9_976_140.0, "71c78a3b4b4d8e001a53d485", "60c78a3b4b4d8e001a53d474"),
    ("60c78a3b4b4d8e001a53d48e", "Brazil", 212_559_417, 8_515_767.0, "60c78a3b4b4d8e001a53d471", "60c78a3b4b4d8e001a53d475"),
    ("60c78a3b4b4d8e001a53d490", "Australia", 25_499_884, 7_692_024.0, "60c78a3b4b4d8e001a53d472", "60c78a3b4b4d8e001a53d476"),
];

// (id, name, country id)
const CITIES: &[(&str, &str, &str)] = &[
    ("60c78a3b4b4d8e001a53d47b", "Cairo", "60c78a3b4b4d8e001a53d47a"),
    ("60c78a3b4b4d8e001a53d47d", "Alexandria", "60c78a3b4b4d8e001a53d47a"),
    ("60c78a3b4b4d8e001a53d47f", "Lagos", "60c78a3b4b4d8e001a53d47c"),
    ("60c78a3b4b4d8e001a53d480", "Abuja", "60c78a3b4b4d8e001a53d47c"),
    ("60c78a3b4b4d8e001a53d482", "Cape Town", "60c78a3b4b4d8e001a53d47e"),
    ("60c78a3b4b4d8e001a53d483", "Johannesburg", "60c78a3b4b4d8e001a53d47e"),
    ("60c78a3b4b4d8e001a53d481", "Paris", "60c78a3b4b4d8e001a53d480"),
    ("60c78a3b4b4d8e001a53d484", "Lyon", "60c78a3b4b4d8e001a53d480"),
    ("60c78a3b4b4d8e001a53daaa", "Berlin", "60c78a3b4b4d8e001a53d482"),
    ("60c78a3b4b4d8e001a53d486", "Munich", "60c78a3b4b4d8e001a53d482"),
    ("60c78a3b4b4d8e001a53d46f", "New York", "60c78a3b4b4d8e001a53d46e"),
    ("60c78a3b4b4d8e001a53d470", "Los Angeles", "60c78a3b4b4d8e001a53d46e"),
    ("60c78a3b4b4d8e001a53d471", "Rio de Janeiro", "60c78a3b4b4d8e001a53d48e"),
    ("60c78a3b4b4d8e001a53d472", "San Paulo", "60c78a3b4b4d8e001a53d48e"),
    ("60c78a3b4b4d8e001a53d473", "Sydney", "60c78a3b4b4d8e001a53d490"),
    ("60c78a3b4b4d8e001a53d474", "Melbourne", "60c78a3b4b4d8e001a53d490"),
    ("60c78a3b4b4d8e001a53d485", "Madrid", "60c78a3b4b4d8e001a53d484"),
    ("70c78a3b4b4d8e001a53d485", "New Delhi", "60c78a3b4b4d8e001a53d488"),
    ("72c78a3b4b4d8e001a53d485", "Washington", "60c78a3b4b4d8e001a53d46e"),
];

fn oid(hex: &str) -> Result<ObjectId> {
    ObjectId::parse_str(hex)
        .map_err(|e| GeoError::invalid_input(format!("Invalid ObjectId literal '{hex}': {e}")))
}

impl SeedData {
    /// Build the sample dataset
    pub fn sample() -> Result<Self> {
        let continents = CONTINENTS
            .iter()
            .map(|&(id, name)| Ok(Continent { id: oid(id)?, name: name.to_string() }))
            .collect::<Result<Vec<_>>>()?;

        let countries = COUNTRIES
            .iter()
            .map(|&(id, name, population, area, capital, continent)| {
                Ok(Country {
                    id: oid(id)?,
                    name: Some(name.to_string()),
                    population,
                    area,
                    capital_id: oid(capital)?,
                    continent_id: oid(continent)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let cities = CITIES
            .iter()
            .map(|&(id, name, country)| {
                Ok(City { id: oid(id)?, name: Some(name.to_string()), country_id: oid(country)? })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { continents, countries, cities })
    }

    /// Record counts, as a seed run would report them
    #[must_use]
    pub fn summary(&self) -> SeedSummary {
        SeedSummary {
            continents: self.continents.len(),
            countries: self.countries.len(),
            cities: self.cities.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_sizes() {
        let data = SeedData::sample().unwrap();
        let summary = data.summary();
        assert_eq!(summary.continents, 7);
        assert_eq!(summary.countries, 13);
        assert_eq!(summary.cities, 19);
        assert_eq!(summary.total(), 39);
    }

    #[test]
    fn test_ids_unique_per_collection() {
        let data = SeedData::sample().unwrap();
        let continent_ids: HashSet<_> = data.continents.iter().map(|c| c.id).collect();
        let country_ids: HashSet<_> = data.countries.iter().map(|c| c.id).collect();
        let city_ids: HashSet<_> = data.cities.iter().map(|c| c.id).collect();
        assert_eq!(continent_ids.len(), data.continents.len());
        assert_eq!(country_ids.len(), data.countries.len());
        assert_eq!(city_ids.len(), data.cities.len());
    }

    #[test]
    fn test_every_country_references_a_seeded_continent() {
        let data = SeedData::sample().unwrap();
        let continent_ids: HashSet<_> = data.continents.iter().map(|c| c.id).collect();
        for country in &data.countries {
            assert!(continent_ids.contains(&country.continent_id), "{:?}", country.name);
        }
    }

    #[test]
    fn test_some_capitals_are_dangling() {
        // China, India, Japan and Canada point at ids no city has
        let data = SeedData::sample().unwrap();
        let city_ids: HashSet<_> = data.cities.iter().map(|c| c.id).collect();
        let dangling: Vec<_> = data
            .countries
            .iter()
            .filter(|c| !city_ids.contains(&c.capital_id))
            .filter_map(|c| c.name.as_deref())
            .collect();
        assert_eq!(dangling, vec!["China", "India", "Japan", "Canada"]);
    }

    #[test]
    fn test_populations_are_stored_as_int32() {
        let data = SeedData::sample().unwrap();
        for country in &data.countries {
            let document = bson::to_document(country).unwrap();
            assert_eq!(
                document.get("Population").map(bson::Bson::element_type),
                Some(bson::spec::ElementType::Int32),
                "{:?}",
                country.name
            );
        }
    }

    #[test]
    fn test_invalid_literal_is_rejected() {
        let err = oid("not-an-object-id").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
