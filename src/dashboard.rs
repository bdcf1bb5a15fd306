//! Controller that owns the enriched dataset for the lifetime of a session.

use tracing::{info, warn};

use crate::pipeline::{RecordIssue, enrich_with_issues};
use crate::query::{FilterOptions, FilterSelection, QueryResult, query};
use crate::record::{EnrichedRecord, RawRecord};

/// Enriched records plus the filter options derived from them.
///
/// The record set is built once and only ever lent out immutably.
#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<EnrichedRecord>,
    issues: Vec<RecordIssue>,
    options: FilterOptions,
}

impl Dashboard {
    pub fn new(raw: &[RawRecord]) -> Self {
        let enrichment = enrich_with_issues(raw);
        let options = FilterOptions::from_records(&enrichment.records);

        info!(
            records = enrichment.records.len(),
            cities = options.cities.len(),
            vehicle_types = options.vehicle_types.len(),
            weather_conditions = options.weather_conditions.len(),
            "Dashboard dataset ready"
        );

        Self {
            records: enrichment.records,
            issues: enrichment.issues,
            options,
        }
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    /// Fields degraded during enrichment.
    pub fn issues(&self) -> &[RecordIssue] {
        &self.issues
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Everything selected, no rush-hour restriction.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::all(&self.options)
    }

    pub fn query(&self, selection: &FilterSelection) -> QueryResult<'_> {
        for (dimension, value) in selection.unknown_values(&self.options) {
            warn!(dimension, value, "Selected value does not occur in the dataset");
        }
        query(&self.records, selection)
    }
}
