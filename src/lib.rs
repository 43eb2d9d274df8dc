//! geoquery - Geography Queries over a Document Database
//!
//! geoquery connects to a `MongoDB` database holding three collections
//! (continents, countries, cities), runs a fixed sequence of one-shot queries
//! and prints the results. An optional seeding routine inserts a fixed sample
//! dataset.
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`model`] - Continent, country and city records
//! - [`engine`] - Engine trait plus `MongoDB` and in-memory implementations
//! - [`seed`] - The sample dataset
//! - [`report`] - The fixed query sequence
//! - [`output`] - Text rendering and JSON envelopes
//! - [`config`] - Settings resolution (flags, environment, config files)
//! - [`logging`] - Tracing subscriber setup

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod report;
pub mod seed;

// Re-export commonly used types for convenience
pub use config::{resolve_settings, CollectionNames, ConfigLocation, Settings, SettingsLayer};
pub use engine::memory::MemoryEngine;
#[cfg(feature = "mongodb")]
pub use engine::mongo::MongoEngine;
pub use engine::{EngineKind, GeographyEngine, RankBy, ServerInfo};
pub use error::{GeoError, Result};
pub use model::{City, Continent, ContinentCount, Country};
pub use output::{render_text, ErrorEnvelope, ErrorInfo, Metadata, OutputFormat, SuccessEnvelope};
pub use report::{run_report, Report, Section, SectionValue};
pub use seed::{SeedData, SeedSummary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_exports() {
        let _settings = Settings::default();
        let _kind = EngineKind::Memory;
        let _engine = MemoryEngine::new("Geography");
        let _format = OutputFormat::default();
    }
}
