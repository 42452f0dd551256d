//! Shared types for the client: closed enumerations for the symbolic values
//! the API accepts, allow-lists for free-form unit strings, and the typed
//! values assembled from composite calls.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use phf::phf_set;
use reqwest::StatusCode;
/// Decimal type used for measurement magnitudes on the wire.
pub use rust_decimal::Decimal;
use serde_json::Value;
use strum_macros::Display;

use crate::error::Error;

pub mod request;

/// Distance unit strings the activity-logging endpoint accepts. Anything else
/// is silently dropped from the outbound request.
pub(crate) static DISTANCE_UNITS: phf::Set<&'static str> = phf_set! {
    "Centimeter", "Foot", "Inch", "Kilometer", "Meter", "Mile", "Millimeter",
    "Steps", "Yards",
};

/// Water unit strings the water-logging endpoint accepts.
pub(crate) static WATER_UNITS: phf::Set<&'static str> = phf_set! {
    "ml", "fl oz", "cup",
};

/// Measurement unit system for response values. Selects the
/// `Accept-Language` sent with every call; the wire encoding is unaffected.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UnitSystem {
    #[default]
    Metric,
    Us,
    Uk,
}

impl UnitSystem {
    pub(crate) fn accept_language(self) -> Option<&'static str> {
        match self {
            UnitSystem::Metric => None,
            UnitSystem::Us => Some("en_US"),
            UnitSystem::Uk => Some("en_GB"),
        }
    }
}

/// Predefined period for a time-series query, counted back from the base
/// date.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Period {
    #[strum(serialize = "1d")]
    OneDay,
    #[strum(serialize = "7d")]
    SevenDays,
    #[strum(serialize = "30d")]
    ThirtyDays,
    #[strum(serialize = "1w")]
    OneWeek,
    #[strum(serialize = "1m")]
    OneMonth,
    #[strum(serialize = "3m")]
    ThreeMonths,
    #[strum(serialize = "6m")]
    SixMonths,
    #[strum(serialize = "1y")]
    OneYear,
    #[strum(serialize = "max")]
    Max,
}

/// The far end of a time-series query: either a predefined period or an
/// explicit end date.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeSeriesRange {
    Period(Period),
    Until(NaiveDate),
}

impl fmt::Display for TimeSeriesRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSeriesRange::Period(period) => write!(f, "{period}"),
            TimeSeriesRange::Until(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<Period> for TimeSeriesRange {
    fn from(period: Period) -> Self {
        TimeSeriesRange::Period(period)
    }
}

impl From<NaiveDate> for TimeSeriesRange {
    fn from(date: NaiveDate) -> Self {
        TimeSeriesRange::Until(date)
    }
}

/// Ranking window for the friends leaderboard.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum LeaderboardPeriod {
    #[strum(serialize = "7d")]
    SevenDays,
    #[strum(serialize = "30d")]
    ThirtyDays,
}

/// The closed set of daily time-series resources.
///
/// Each variant maps to a fixed resource sub-path; the matching field in the
/// JSON response is the sub-path with the leading slash stripped and the
/// remaining slashes replaced by hyphens (e.g. `activities-log-steps`).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum TimeSeriesResource {
    #[strum(serialize = "caloriesIn")]
    CaloriesIn,
    #[strum(serialize = "water")]
    Water,
    #[strum(serialize = "caloriesOut")]
    CaloriesOut,
    #[strum(serialize = "steps")]
    Steps,
    #[strum(serialize = "distance")]
    Distance,
    #[strum(serialize = "floors")]
    Floors,
    #[strum(serialize = "elevation")]
    Elevation,
    #[strum(serialize = "minutesSedentary")]
    MinutesSedentary,
    #[strum(serialize = "minutesLightlyActive")]
    MinutesLightlyActive,
    #[strum(serialize = "minutesFairlyActive")]
    MinutesFairlyActive,
    #[strum(serialize = "minutesVeryActive")]
    MinutesVeryActive,
    #[strum(serialize = "activeScore")]
    ActiveScore,
    #[strum(serialize = "activityCalories")]
    ActivityCalories,
    #[strum(serialize = "tracker_caloriesOut")]
    TrackerCaloriesOut,
    #[strum(serialize = "tracker_steps")]
    TrackerSteps,
    #[strum(serialize = "tracker_distance")]
    TrackerDistance,
    #[strum(serialize = "tracker_floors")]
    TrackerFloors,
    #[strum(serialize = "tracker_elevation")]
    TrackerElevation,
    #[strum(serialize = "startTime")]
    SleepStartTime,
    #[strum(serialize = "timeInBed")]
    TimeInBed,
    #[strum(serialize = "minutesAsleep")]
    MinutesAsleep,
    #[strum(serialize = "awakeningsCount")]
    AwakeningsCount,
    #[strum(serialize = "minutesAwake")]
    MinutesAwake,
    #[strum(serialize = "minutesToFallAsleep")]
    MinutesToFallAsleep,
    #[strum(serialize = "minutesAfterWakeup")]
    MinutesAfterWakeup,
    #[strum(serialize = "efficiency")]
    SleepEfficiency,
    #[strum(serialize = "weight")]
    Weight,
    #[strum(serialize = "bmi")]
    Bmi,
    #[strum(serialize = "fat")]
    Fat,
}

impl TimeSeriesResource {
    /// Every resource, in wire order.
    pub const ALL: [Self; 29] = [
        Self::CaloriesIn,
        Self::Water,
        Self::CaloriesOut,
        Self::Steps,
        Self::Distance,
        Self::Floors,
        Self::Elevation,
        Self::MinutesSedentary,
        Self::MinutesLightlyActive,
        Self::MinutesFairlyActive,
        Self::MinutesVeryActive,
        Self::ActiveScore,
        Self::ActivityCalories,
        Self::TrackerCaloriesOut,
        Self::TrackerSteps,
        Self::TrackerDistance,
        Self::TrackerFloors,
        Self::TrackerElevation,
        Self::SleepStartTime,
        Self::TimeInBed,
        Self::MinutesAsleep,
        Self::AwakeningsCount,
        Self::MinutesAwake,
        Self::MinutesToFallAsleep,
        Self::MinutesAfterWakeup,
        Self::SleepEfficiency,
        Self::Weight,
        Self::Bmi,
        Self::Fat,
    ];

    /// The fixed resource sub-path appended to `user/{id}`.
    #[must_use]
    pub fn sub_path(self) -> &'static str {
        match self {
            Self::CaloriesIn => "/foods/log/caloriesIn",
            Self::Water => "/foods/log/water",
            Self::CaloriesOut => "/activities/log/calories",
            Self::Steps => "/activities/log/steps",
            Self::Distance => "/activities/log/distance",
            Self::Floors => "/activities/log/floors",
            Self::Elevation => "/activities/log/elevation",
            Self::MinutesSedentary => "/activities/log/minutesSedentary",
            Self::MinutesLightlyActive => "/activities/log/minutesLightlyActive",
            Self::MinutesFairlyActive => "/activities/log/minutesFairlyActive",
            Self::MinutesVeryActive => "/activities/log/minutesVeryActive",
            Self::ActiveScore => "/activities/log/activeScore",
            Self::ActivityCalories => "/activities/log/activityCalories",
            Self::TrackerCaloriesOut => "/activities/log/tracker/calories",
            Self::TrackerSteps => "/activities/log/tracker/steps",
            Self::TrackerDistance => "/activities/log/tracker/distance",
            Self::TrackerFloors => "/activities/log/tracker/floors",
            Self::TrackerElevation => "/activities/log/tracker/elevation",
            Self::SleepStartTime => "/sleep/startTime",
            Self::TimeInBed => "/sleep/timeInBed",
            Self::MinutesAsleep => "/sleep/minutesAsleep",
            Self::AwakeningsCount => "/sleep/awakeningsCount",
            Self::MinutesAwake => "/sleep/minutesAwake",
            Self::MinutesToFallAsleep => "/sleep/minutesToFallAsleep",
            Self::MinutesAfterWakeup => "/sleep/minutesAfterWakeup",
            Self::SleepEfficiency => "/sleep/efficiency",
            Self::Weight => "/body/weight",
            Self::Bmi => "/body/bmi",
            Self::Fat => "/body/fat",
        }
    }

    /// The response field holding the series data.
    #[must_use]
    pub fn field_name(self) -> String {
        derive_field_name(self.sub_path())
    }
}

impl FromStr for TimeSeriesResource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.to_string() == s)
            .ok_or_else(|| Error::validation(format!("unrecognized time series resource `{s}`")))
    }
}

/// The closed set of intraday (minute-level) time-series resources.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum IntradayResource {
    #[strum(serialize = "caloriesOut")]
    CaloriesOut,
    #[strum(serialize = "steps")]
    Steps,
    #[strum(serialize = "floors")]
    Floors,
    #[strum(serialize = "elevation")]
    Elevation,
}

impl IntradayResource {
    /// Every intraday resource, in wire order.
    pub const ALL: [Self; 4] = [
        Self::CaloriesOut,
        Self::Steps,
        Self::Floors,
        Self::Elevation,
    ];

    /// The fixed resource sub-path appended to `user/-`.
    #[must_use]
    pub fn sub_path(self) -> &'static str {
        match self {
            Self::CaloriesOut => "/activities/log/calories",
            Self::Steps => "/activities/log/steps",
            Self::Floors => "/activities/log/floors",
            Self::Elevation => "/activities/log/elevation",
        }
    }

    /// The response field holding the minute-level data.
    #[must_use]
    pub fn field_name(self) -> String {
        format!("{}-intraday", derive_field_name(self.sub_path()))
    }
}

impl FromStr for IntradayResource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.to_string() == s)
            .ok_or_else(|| Error::validation(format!("unrecognized intraday resource `{s}`")))
    }
}

fn derive_field_name(sub_path: &str) -> String {
    sub_path
        .strip_prefix('/')
        .unwrap_or(sub_path)
        .replace('/', "-")
}

/// One quota record from the rate-limit status endpoints.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Quota {
    pub remaining_hits: u64,
    pub reset_time: String,
    pub hourly_limit: u64,
}

impl Quota {
    pub(crate) fn from_payload(value: &Value) -> Option<Self> {
        let status = value.get("rateLimitStatus").unwrap_or(value);

        Some(Self {
            remaining_hits: integer_field(status, "remainingHits")?,
            reset_time: status.get("resetTime")?.as_str()?.to_owned(),
            hourly_limit: integer_field(status, "hourlyLimit")?,
        })
    }
}

// XML bodies fold numbers into strings, JSON keeps them numeric.
fn integer_field(value: &Value, key: &str) -> Option<u64> {
    let field = value.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_str().and_then(|text| text.parse().ok()))
}

/// The combined rate-limit snapshot assembled from two separate status
/// fetches. Immutable; reflects the quotas at the moment of the call.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateLimitStatus {
    /// Quota scoped to this client acting for the current viewer.
    pub client_and_viewer: Quota,
    /// Quota scoped to the client alone.
    pub client_only: Quota,
}

/// Unclassified response envelope returned by the custom-call escape
/// hatches: whatever status and body came back, with no success/failure
/// interpretation applied.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct CallResponse {
    pub status: StatusCode,
    pub body: String,
}
