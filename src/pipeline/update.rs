// src/pipeline/update.rs

//! Weekly update pipeline.
//!
//! Fetch → Parse → Compare with the stored previous week → Circuit Breaker →
//! Store.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{BestsellerList, Config, Region};
use crate::parser::parse_list;
use crate::pipeline::{CircuitBreaker, DiffSummary, compare_lists};
use crate::services::{HistoryWeeksLookup, ListSource};
use crate::storage::{ListStorage, StoredList, content_hash};
use crate::utils::previous_week;

/// Result of updating one region's week.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub region: String,
    pub week: NaiveDate,
    /// Annotated list as stored
    pub list: BestsellerList,
    pub summary: DiffSummary,
    /// The upstream text was unchanged and the stored list was reused
    pub cached: bool,
}

/// Update one region's list for `week`.
///
/// With `force`, the stored copy is rebuilt even if the raw text is
/// unchanged and the circuit breaker is bypassed.
pub async fn run_update(
    config: &Config,
    source: &dyn ListSource,
    storage: &dyn ListStorage,
    region: &Region,
    week: NaiveDate,
    force: bool,
) -> Result<UpdateOutcome> {
    log::info!("Updating {} ({}) for week {}", region.name, region.code, week);

    let raw = source.fetch(region, week).await?;

    if !force {
        if let Some(stored) = storage.load(&region.code, week).await? {
            if stored.content_hash == content_hash(&raw) {
                log::info!("{} week {} unchanged upstream, using stored list", region.code, week);
                return Ok(UpdateOutcome {
                    region: region.code.clone(),
                    week,
                    summary: DiffSummary::of(&stored.list),
                    list: stored.list,
                    cached: true,
                });
            }
        }
    }

    let current = parse_list(&raw);
    log::info!(
        "Parsed '{}' ({}): {} categories, {} books",
        current.title,
        current.date,
        current.categories.len(),
        current.book_count()
    );

    let prev_week = previous_week(week);
    let previous = storage.load(&region.code, prev_week).await?;
    if previous.is_none() {
        log::info!(
            "No stored list for {} week {}; every book counts as new",
            region.code,
            prev_week
        );
    }
    let previous_list = previous.map(|p| p.list).unwrap_or_default();

    let lookup = HistoryWeeksLookup::new(
        storage,
        region.code.as_str(),
        prev_week,
        config.comparison.weeks_lookback,
    );
    let list = compare_lists(&current, &previous_list, &lookup).await;

    if force {
        log::warn!("Skipping circuit breaker (forced update)");
    } else {
        let baseline = (!previous_list.categories.is_empty()).then_some(&previous_list);
        CircuitBreaker::with_config(config.circuit_breaker.clone()).validate(&list, baseline)?;
    }

    storage
        .save(&StoredList::new(&region.code, week, &raw, list.clone()))
        .await?;

    let summary = DiffSummary::of(&list);
    log::info!(
        "{} week {}: {} new, {} dropped, {} up, {} down",
        region.code,
        week,
        summary.new,
        summary.dropped,
        summary.climbed,
        summary.fell
    );

    Ok(UpdateOutcome {
        region: region.code.clone(),
        week,
        list,
        summary,
        cached: false,
    })
}

/// Update several regions concurrently, bounded by `fetcher.max_concurrent`.
///
/// A failing region does not stop the others; results come back per region.
pub async fn run_update_all(
    config: &Config,
    source: &dyn ListSource,
    storage: &dyn ListStorage,
    regions: &[Region],
    week: NaiveDate,
    force: bool,
) -> Vec<(String, Result<UpdateOutcome>)> {
    let concurrency = config.fetcher.max_concurrent.max(1);

    let results: Vec<(String, Result<UpdateOutcome>)> = stream::iter(regions)
        .map(|region| async move {
            let result = run_update(config, source, storage, region, week, force).await;
            (region.code.clone(), result)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    for (code, result) in &results {
        if let Err(e) = result {
            log::warn!("Update failed for {}: {}", code, e);
        }
    }
    results
}
