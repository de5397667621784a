//! Forecast horizons and their storage through a [`TimeseriesSink`].
//!
//! A station series is shifted into the configured UTC offset, cut at midnight
//! of the model state date and split into calendar-day buckets. Each bucket is
//! stored as its own event (`Forecast-0-d`, `Forecast-1-d-after`, ...).

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use storage::{EventMetadata, TimeseriesPoint, TimeseriesSink};
use tracing::{debug, info};

use crate::config::WaterLevelOptions;
use crate::error::{IngestionError, Result};
use crate::report::{Diagnostic, RunReport};
use crate::series::Sample;

/// Number of calendar days a forecast is split into.
pub const MAX_FORECAST_DAYS: usize = 15;

/// Event type label of a forecast day.
pub fn horizon_label(day: usize) -> String {
    if day == 0 {
        "Forecast-0-d".to_string()
    } else {
        format!("Forecast-{}-d-after", day)
    }
}

fn template_parts(template: &str) -> Option<(&str, &str, &str)> {
    let open = template.find('<')?;
    let close = open + template[open..].find('>')?;
    Some((
        &template[..open],
        &template[open + 1..close],
        &template[close + 1..],
    ))
}

fn check_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(IngestionError::InvalidConfig(format!(
            "invalid time pattern in run name: <{}>",
            pattern
        )));
    }
    Ok(())
}

/// Check the `<strftime>` section of a run name, if there is one.
pub fn validate_run_name(template: &str) -> Result<()> {
    match template_parts(template) {
        Some((_, pattern, _)) => check_pattern(pattern),
        None => Ok(()),
    }
}

/// Replace the `<strftime>` section of a run name with `at`.
///
/// `Cloud-1-<%H:%M:%S>` at 06:30 gives `Cloud-1-06:30:00`. Names without a
/// section are returned unchanged.
pub fn format_run_name(template: &str, at: NaiveDateTime) -> Result<String> {
    match template_parts(template) {
        Some((head, pattern, tail)) => {
            check_pattern(pattern)?;
            Ok(format!("{}{}{}", head, at.format(pattern), tail))
        }
        None => Ok(template.to_string()),
    }
}

/// Samples on or after midnight of `state_date`.
pub fn forecast_slice(samples: &[Sample], state_date: NaiveDate) -> &[Sample] {
    let midnight = state_date.and_time(NaiveTime::MIN);
    let start = samples
        .iter()
        .position(|s| s.time >= midnight)
        .unwrap_or(samples.len());
    &samples[start..]
}

/// Samples of one forecast day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub day: usize,
    pub label: String,
    pub samples: Vec<Sample>,
}

/// Split samples by calendar-day distance from `state_date`.
///
/// Only days `0..MAX_FORECAST_DAYS` are kept and days without samples are
/// omitted, so `N` covered days give `min(N, 15)` buckets.
pub fn partition_by_day(samples: &[Sample], state_date: NaiveDate) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();
    for sample in samples {
        let offset = (sample.time.date() - state_date).num_days();
        if offset < 0 || offset as usize >= MAX_FORECAST_DAYS {
            continue;
        }
        let day = offset as usize;
        match buckets.iter_mut().find(|b| b.day == day) {
            Some(bucket) => bucket.samples.push(*sample),
            None => buckets.push(DayBucket {
                day,
                label: horizon_label(day),
                samples: vec![*sample],
            }),
        }
    }
    buckets.sort_by_key(|b| b.day);
    buckets
}

/// Store the forecast horizons of one station.
///
/// Problems are recorded in `report` and never abort the run: an unknown
/// station or a failing sink call ends this station, an existing event without
/// `force_insert` skips that horizon.
pub fn store_forecast(
    sink: &mut dyn TimeseriesSink,
    station: &str,
    samples: &[Sample],
    state: NaiveDateTime,
    options: &WaterLevelOptions,
    source: &str,
    report: &mut RunReport,
) -> Result<()> {
    let state = options.utc_offset.apply(state);
    let run_name = format_run_name(&options.run_name, state)?;

    let unavailable = |horizon: Option<&str>, error: storage::StorageError| {
        Diagnostic::PersistenceSinkUnavailable {
            station: station.to_string(),
            horizon: horizon.map(str::to_string),
            message: error.to_string(),
        }
    };

    match sink.get_station(station) {
        Ok(Some(_)) => {}
        Ok(None) => {
            report.record(Diagnostic::StationNotFound {
                station: station.to_string(),
            });
            return Ok(());
        }
        Err(e) => {
            report.record(unavailable(None, e));
            return Ok(());
        }
    }

    let shifted: Vec<Sample> = samples
        .iter()
        .map(|s| Sample {
            time: options.utc_offset.apply(s.time),
            value: s.value,
        })
        .collect();
    let buckets = partition_by_day(forecast_slice(&shifted, state.date()), state.date());
    debug!(station, horizons = buckets.len(), run_name = %run_name, "Storing forecast");

    for bucket in buckets {
        let metadata = EventMetadata {
            station: station.to_string(),
            variable: options.variable.clone(),
            unit: options.unit.clone(),
            event_type: bucket.label.clone(),
            source: source.to_string(),
            name: run_name.clone(),
        };

        let event_id = match sink.get_event_id(&metadata) {
            Ok(Some(_)) if !options.force_insert => {
                report.record(Diagnostic::EventExists {
                    station: station.to_string(),
                    horizon: bucket.label,
                });
                continue;
            }
            Ok(Some(id)) => id,
            Ok(None) => match sink.create_event_id(&metadata) {
                Ok(id) => id,
                Err(e) => {
                    report.record(unavailable(Some(&bucket.label), e));
                    return Ok(());
                }
            },
            Err(e) => {
                report.record(unavailable(Some(&bucket.label), e));
                return Ok(());
            }
        };

        let points: Vec<TimeseriesPoint> = bucket
            .samples
            .iter()
            .map(|s| TimeseriesPoint::new(s.time, s.value.or_sentinel(options.missing_value)))
            .collect();

        match sink.insert_timeseries(event_id, &points, options.force_insert) {
            Ok(rows) => {
                info!(station, horizon = %bucket.label, rows, "Stored forecast horizon");
                report.horizons_stored += 1;
                report.rows_stored += rows;
            }
            Err(e) => {
                report.record(unavailable(Some(&bucket.label), e));
                return Ok(());
            }
        }
    }

    Ok(())
}
