//! Caller-facing parameter sets for the logging and update endpoints.
//!
//! All request types use the [`bon`](https://docs.rs/bon) crate for the
//! builder pattern. Each type knows how to lower itself into the
//! form-encoded key/value pairs the API expects: required fields are always
//! present, optional fields only when supplied, and enumerated unit strings
//! only when they appear in the corresponding allow-list.

#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use super::{DISTANCE_UNITS, WATER_UNITS};

pub(crate) type Params = Vec<(String, String)>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn push(params: &mut Params, key: &str, value: String) {
    params.push((key.to_owned(), value));
}

fn push_opt(params: &mut Params, key: &str, value: Option<String>) {
    if let Some(value) = value {
        push(params, key, value);
    }
}

/// Parameters for logging an activity.
///
/// `distance_unit` is only forwarded when it is one of the unit strings the
/// API documents (Centimeter, Foot, Inch, Kilometer, Meter, Mile,
/// Millimeter, Steps, Yards); any other value is silently omitted.
///
/// # Example
///
/// ```
/// use fitbit_client_sdk::types::request::LogActivityRequest;
///
/// let request = LogActivityRequest::builder()
///     .at("2011-07-10T16:20:00".parse().unwrap())
///     .activity_id("12030")
///     .duration_millis(600_000)
///     .distance("2.5".parse().unwrap())
///     .distance_unit("Mile")
///     .build();
/// ```
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogActivityRequest {
    /// Activity date and start time, in the user's profile timezone.
    pub at: NaiveDateTime,
    /// Activity (or intensity level) id from the activity database.
    #[builder(into)]
    pub activity_id: String,
    pub duration_millis: u64,
    /// Manual calorie count overriding the API's estimate.
    pub manual_calories: Option<u32>,
    pub distance: Option<Decimal>,
    #[builder(into)]
    pub distance_unit: Option<String>,
}

impl LogActivityRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.at.format(DATE_FORMAT).to_string());
        push(&mut params, "startTime", self.at.format(TIME_FORMAT).to_string());
        push(&mut params, "activityId", self.activity_id.clone());
        push(&mut params, "durationMillis", self.duration_millis.to_string());
        push_opt(
            &mut params,
            "manualCalories",
            self.manual_calories.map(|calories| calories.to_string()),
        );
        push_opt(&mut params, "distance", self.distance.map(|d| d.to_string()));
        if let Some(unit) = &self.distance_unit {
            if DISTANCE_UNITS.contains(unit.as_str()) {
                push(&mut params, "distanceUnit", unit.clone());
            }
        }
        params
    }
}

/// Parameters for logging a food entry against the food database.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogFoodRequest {
    pub date: NaiveDate,
    #[builder(into)]
    pub food_id: String,
    #[builder(into)]
    pub meal_type_id: String,
    /// Unit id; must be one of the units allowed for this food.
    #[builder(into)]
    pub unit_id: String,
    /// Amount consumed, in the specified units.
    pub amount: Decimal,
}

impl LogFoodRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.date.format(DATE_FORMAT).to_string());
        push(&mut params, "foodId", self.food_id.clone());
        push(&mut params, "mealTypeId", self.meal_type_id.clone());
        push(&mut params, "unitId", self.unit_id.clone());
        push(&mut params, "amount", self.amount.to_string());
        params
    }
}

/// Parameters for creating a private food in the user's food database.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct CreateFoodRequest {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub default_food_measurement_unit_id: String,
    pub default_serving_size: Decimal,
    pub calories: u32,
    #[builder(into)]
    pub form_type: Option<String>,
    #[builder(into)]
    pub description: Option<String>,
}

impl CreateFoodRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "name", self.name.clone());
        push(
            &mut params,
            "defaultFoodMeasurementUnitId",
            self.default_food_measurement_unit_id.clone(),
        );
        push(
            &mut params,
            "defaultServingSize",
            self.default_serving_size.to_string(),
        );
        push(&mut params, "calories", self.calories.to_string());
        push_opt(&mut params, "formType", self.form_type.clone());
        push_opt(&mut params, "description", self.description.clone());
        params
    }
}

/// Parameters for logging water consumption.
///
/// `unit` is only forwarded when it is one of `ml`, `fl oz`, or `cup`.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogWaterRequest {
    pub date: NaiveDate,
    pub amount: Decimal,
    #[builder(into)]
    pub unit: Option<String>,
}

impl LogWaterRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.date.format(DATE_FORMAT).to_string());
        push(&mut params, "amount", self.amount.to_string());
        if let Some(unit) = &self.unit {
            if WATER_UNITS.contains(unit.as_str()) {
                push(&mut params, "unit", unit.clone());
            }
        }
        params
    }
}

/// Parameters for logging body measurements. Every measurement is optional;
/// only the supplied ones travel to the API.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogBodyRequest {
    pub date: NaiveDate,
    pub weight: Option<Decimal>,
    pub fat: Option<Decimal>,
    pub bicep: Option<Decimal>,
    pub calf: Option<Decimal>,
    pub chest: Option<Decimal>,
    pub forearm: Option<Decimal>,
    pub hips: Option<Decimal>,
    pub neck: Option<Decimal>,
    pub thigh: Option<Decimal>,
    pub waist: Option<Decimal>,
}

impl LogBodyRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.date.format(DATE_FORMAT).to_string());
        let measurements = [
            ("weight", self.weight),
            ("fat", self.fat),
            ("bicep", self.bicep),
            ("calf", self.calf),
            ("chest", self.chest),
            ("forearm", self.forearm),
            ("hips", self.hips),
            ("neck", self.neck),
            ("thigh", self.thigh),
            ("waist", self.waist),
        ];
        for (key, value) in measurements {
            push_opt(&mut params, key, value.map(|v| v.to_string()));
        }
        params
    }
}

/// Parameters for logging a blood pressure reading.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogBloodPressureRequest {
    pub date: NaiveDate,
    pub systolic: u32,
    pub diastolic: u32,
    pub time: Option<NaiveTime>,
}

impl LogBloodPressureRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.date.format(DATE_FORMAT).to_string());
        push(&mut params, "systolic", self.systolic.to_string());
        push(&mut params, "diastolic", self.diastolic.to_string());
        push_opt(
            &mut params,
            "time",
            self.time.map(|t| t.format(TIME_FORMAT).to_string()),
        );
        params
    }
}

/// Parameters for logging blood glucose and HbA1c measurements.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogGlucoseRequest {
    pub date: NaiveDate,
    /// Name of the glucose tracker the measurement belongs to.
    #[builder(into)]
    pub tracker: Option<String>,
    pub glucose: Option<Decimal>,
    pub hba1c: Option<Decimal>,
    pub time: Option<NaiveTime>,
}

impl LogGlucoseRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.date.format(DATE_FORMAT).to_string());
        push_opt(&mut params, "tracker", self.tracker.clone());
        push_opt(&mut params, "glucose", self.glucose.map(|g| g.to_string()));
        push_opt(&mut params, "hba1c", self.hba1c.map(|h| h.to_string()));
        push_opt(
            &mut params,
            "time",
            self.time.map(|t| t.format(TIME_FORMAT).to_string()),
        );
        params
    }
}

/// Parameters for logging a heart rate measurement.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct LogHeartRateRequest {
    pub date: NaiveDate,
    /// Name of the tracker, e.g. `Resting Heart Rate`.
    #[builder(into)]
    pub tracker: String,
    pub heart_rate: u32,
    pub time: Option<NaiveTime>,
}

impl LogHeartRateRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "date", self.date.format(DATE_FORMAT).to_string());
        push(&mut params, "tracker", self.tracker.clone());
        push(&mut params, "heartRate", self.heart_rate.to_string());
        push_opt(
            &mut params,
            "time",
            self.time.map(|t| t.format(TIME_FORMAT).to_string()),
        );
        params
    }
}

/// Profile fields to update. Only the supplied fields are sent.
#[derive(Builder, Clone, Debug, Default)]
#[non_exhaustive]
pub struct UpdateProfileRequest {
    #[builder(into)]
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub height: Option<Decimal>,
    #[builder(into)]
    pub nickname: Option<String>,
    #[builder(into)]
    pub about_me: Option<String>,
    #[builder(into)]
    pub full_name: Option<String>,
    #[builder(into)]
    pub country: Option<String>,
    #[builder(into)]
    pub state: Option<String>,
    #[builder(into)]
    pub city: Option<String>,
    #[builder(into)]
    pub timezone: Option<String>,
}

impl UpdateProfileRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "gender", self.gender.clone());
        push_opt(
            &mut params,
            "birthday",
            self.birthday.map(|d| d.format(DATE_FORMAT).to_string()),
        );
        push_opt(&mut params, "height", self.height.map(|h| h.to_string()));
        push_opt(&mut params, "nickname", self.nickname.clone());
        push_opt(&mut params, "aboutMe", self.about_me.clone());
        push_opt(&mut params, "fullname", self.full_name.clone());
        push_opt(&mut params, "country", self.country.clone());
        push_opt(&mut params, "state", self.state.clone());
        push_opt(&mut params, "city", self.city.clone());
        push_opt(&mut params, "timezone", self.timezone.clone());
        params
    }
}

/// A friend invitation, addressed by email or by user id.
#[derive(Builder, Clone, Debug, Default)]
#[non_exhaustive]
pub struct InviteFriendRequest {
    #[builder(into)]
    pub invited_user_email: Option<String>,
    #[builder(into)]
    pub invited_user_id: Option<String>,
}

impl InviteFriendRequest {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(
            &mut params,
            "invitedUserEmail",
            self.invited_user_email.clone(),
        );
        push_opt(&mut params, "invitedUserId", self.invited_user_id.clone());
        params
    }
}
