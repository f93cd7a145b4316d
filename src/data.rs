use serde::Serialize;

use crate::time::Millis;
use crate::train_kind::TrainKind;

/// One station call of a train, times already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stop {
    pub station_name: String,
    pub scheduled_arrival: Option<Millis>,
    pub scheduled_departure: Option<Millis>,
    pub actual_arrival: Option<Millis>,
    pub actual_departure: Option<Millis>,
    pub forecast_arrival: Option<Millis>,
    pub forecast_departure: Option<Millis>,
    pub arrival_delay_minutes: Option<i64>,
    pub departure_delay_minutes: Option<i64>,
    pub platform: Option<String>,
    /// Upstream text in a time field that is not a timestamp, e.g. `"in arrivo"`.
    pub arrival_text: Option<String>,
    pub departure_text: Option<String>,
}

impl Stop {
    pub fn named(station_name: &str) -> Self {
        Self {
            station_name: station_name.to_owned(),
            ..Self::default()
        }
    }

    pub fn has_real_time(&self) -> bool {
        self.actual_arrival.is_some() || self.actual_departure.is_some()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.station_name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// A train run as reported upstream. Stops are in itinerary order and are
/// never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrainDescriptor {
    pub train_number: String,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub train_kind_raw: String,
    pub global_delay_minutes: Option<i64>,
    pub last_known_station_name: Option<String>,
    pub stops: Vec<Stop>,
}

impl TrainDescriptor {
    pub fn kind(&self) -> TrainKind {
        TrainKind::classify(&self.train_kind_raw)
    }

    /// Index of the stop called `name`, ignoring case and surrounding blanks.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.stops.iter().position(|stop| stop.is_named(name))
    }
}
