use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// How raw values collapse into one period aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionPolicy {
    Mean,
    Max,
    Min,
}

impl ReductionPolicy {
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            ReductionPolicy::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
            ReductionPolicy::Max => values.iter().copied().reduce(f64::max),
            ReductionPolicy::Min => values.iter().copied().reduce(f64::min),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub datatype: &'static str,
    pub name: &'static str,
    pub policy: ReductionPolicy,
}

/// Every datatype the pipeline requests upstream, with its store measurement
/// name and reduction policy. An unmapped datatype is a configuration error,
/// never a silent default.
pub const MEASUREMENTS: &[Measurement] = &[
    Measurement {
        datatype: "TAVG",
        name: "Average_Temperature",
        policy: ReductionPolicy::Mean,
    },
    Measurement {
        datatype: "TMAX",
        name: "Maximum_Temperature",
        policy: ReductionPolicy::Max,
    },
    Measurement {
        datatype: "TMIN",
        name: "Minimum_Temperature",
        policy: ReductionPolicy::Min,
    },
    Measurement {
        datatype: "PRCP",
        name: "Precipitation",
        policy: ReductionPolicy::Mean,
    },
    Measurement {
        datatype: "EMXT",
        name: "Extreme_Maximum_Temperature",
        policy: ReductionPolicy::Max,
    },
    Measurement {
        datatype: "EMNT",
        name: "Extreme_Minimum_Temperature",
        policy: ReductionPolicy::Min,
    },
    Measurement {
        datatype: "EMXP",
        name: "Extreme_Maximum_Precipitation",
        policy: ReductionPolicy::Max,
    },
    Measurement {
        datatype: "EMSD",
        name: "Extreme_Maximum_Snow_Depth",
        policy: ReductionPolicy::Max,
    },
];

/// The series the fetch cursor is anchored on; it is the densest series a
/// country reports, so its last timestamp marks ingestion progress.
pub const CURSOR_MEASUREMENT: &str = "Average_Temperature";

pub fn measurement_for(datatype: &str) -> Result<&'static Measurement, PipelineError> {
    MEASUREMENTS
        .iter()
        .find(|m| m.datatype == datatype)
        .ok_or_else(|| PipelineError::UnmappedDatatype(datatype.to_string()))
}

/// Comma-joined datatype list for the observation endpoint.
pub fn datatype_id() -> String {
    MEASUREMENTS
        .iter()
        .map(|m| m.datatype)
        .collect::<Vec<_>>()
        .join(",")
}

/// Suffixes of the derived series recomputed each cycle for a measurement.
pub const DERIVED_SUFFIXES: &[&str] = &[
    "_monthly_average",
    "_yearly_average",
    "_decadal_average",
    "_yoy_change",
    "_dod_change",
    "_trend",
];

/// A country-like location as advertised by the upstream entity listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

/// A closed date interval, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

pub fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// Upstream record timestamps come back without an offset, e.g.
/// "2016-01-01T00:00:00"; they are UTC by contract.
pub fn parse_record_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn reduce_by_policy() {
        assert_eq!(ReductionPolicy::Mean.reduce(&[10.0, 20.0, 30.0]), Some(20.0));
        assert_eq!(ReductionPolicy::Max.reduce(&[5.0, 9.0, 3.0]), Some(9.0));
        assert_eq!(ReductionPolicy::Min.reduce(&[5.0, 9.0, 3.0]), Some(3.0));
        assert_eq!(ReductionPolicy::Mean.reduce(&[]), None);
    }

    #[test]
    fn measurement_lookup() {
        let tavg = measurement_for("TAVG").unwrap();
        assert_eq!(tavg.name, "Average_Temperature");
        assert_eq!(tavg.policy, ReductionPolicy::Mean);

        let err = measurement_for("SNOW").unwrap_err();
        assert_matches!(err, PipelineError::UnmappedDatatype(_));
    }

    #[test]
    fn datatype_id_joins_all_codes() {
        let id = datatype_id();
        assert!(id.starts_with("TAVG,TMAX,TMIN"));
        assert_eq!(id.split(',').count(), MEASUREMENTS.len());
    }

    #[test]
    fn record_timestamp_parsing() {
        let ts = parse_record_timestamp("2016-01-01T00:00:00").unwrap();
        assert_eq!(ts, date_to_utc(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()));
        assert!(parse_record_timestamp("2016-01-01").is_none());
    }

    #[test]
    fn decade_floor() {
        assert_eq!(decade_of(1999), 1990);
        assert_eq!(decade_of(2000), 2000);
        assert_eq!(decade_of(2009), 2000);
    }
}
