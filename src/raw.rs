//! Decoding of `andamentoTreno` payloads.
//!
//! Upstream has renamed fields between API revisions, so every logical field
//! is read through a list of candidate keys, highest priority first. The first
//! key whose value resolves wins; missing or unparseable fields become `None`
//! instead of failing the whole payload.

use std::sync::LazyLock;

use chrono_tz::Tz;
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};

use crate::data::{Stop, TrainDescriptor};
use crate::error::{Result, TrenoError};
use crate::time::{self, Millis};

/// Candidate source keys for one logical field.
pub type Keys = &'static [&'static str];

pub mod keys {
    use super::Keys;

    pub const STATION_NAME: Keys = &["stazione", "stazioneNome", "nome"];
    pub const SCHEDULED_ARRIVAL: Keys = &["arrivo_teorico", "arrivoTeorico", "orarioArrivo"];
    pub const SCHEDULED_DEPARTURE: Keys =
        &["partenza_teorica", "partenzaTeorica", "orarioPartenza"];
    pub const SCHEDULED_ANY: Keys = &["programmata"];
    pub const ACTUAL_ARRIVAL: Keys = &["arrivoReale", "arrivo_reale", "effettivaArrivo"];
    pub const ACTUAL_DEPARTURE: Keys = &["partenzaReale", "partenza_reale", "effettivaPartenza"];
    pub const FORECAST_ARRIVAL: Keys = &["arrivoPrevisto", "arrivo_previsto"];
    pub const FORECAST_DEPARTURE: Keys = &["partenzaPrevista", "partenza_prevista"];
    pub const ARRIVAL_DELAY: Keys = &["ritardoArrivo"];
    pub const DEPARTURE_DELAY: Keys = &["ritardoPartenza"];
    pub const PLATFORM: Keys = &[
        "binarioEffettivoArrivoDescrizione",
        "binarioEffettivoPartenzaDescrizione",
        "binarioProgrammatoArrivoDescrizione",
        "binarioProgrammatoPartenzaDescrizione",
    ];

    pub const TRAIN_NUMBER: Keys = &["numeroTreno", "compNumeroTreno"];
    pub const ORIGIN: Keys = &["origine", "origineEstera"];
    pub const DESTINATION: Keys = &["destinazione", "destinazioneEstera"];
    pub const TRAIN_KIND: Keys = &["categoria", "categoriaDescrizione", "compNumeroTreno"];
    pub const DELAY: Keys = &["ritardo"];
    pub const DELAY_PHRASE: Keys = &["compRitardo", "compRitardoAndamento"];
    pub const LAST_KNOWN_STATION: Keys = &["stazioneUltimoRilevamento"];
    pub const STOPS: Keys = &["fermate"];
}

// Upstream placeholder for "no detection yet".
const NO_STATION: &str = "--";

/// Larger delays, about a week either way, are read as garbage.
pub const MAX_DELAY_MINUTES: i64 = 10_000;

static MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(-?)(\d+)\s*min").unwrap());

/// Value of the first key in `keys` that `resolve` accepts.
pub fn probe<'a, T>(
    object: &'a Map<String, Value>,
    keys: Keys,
    resolve: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(resolve)
}

pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.abs() < i64::MAX as f64)
                .map(|float| float.round() as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn within_delay_bounds(minutes: i64) -> bool {
    (-MAX_DELAY_MINUTES..=MAX_DELAY_MINUTES).contains(&minutes)
}

/// Signed delay in minutes, `None` when out of [`MAX_DELAY_MINUTES`].
pub fn delay(value: &Value) -> Option<i64> {
    integer(value).filter(|&minutes| within_delay_bounds(minutes))
}

/// Minutes from phrases such as `"ritardo 12 min."` or `"in anticipo di 3 min"`.
pub fn delay_from_phrase(phrase: &str) -> Option<i64> {
    let lower = phrase.to_lowercase();

    if let Some(captures) = MINUTES.captures(&lower) {
        let minutes: i64 = captures[2]
            .parse()
            .ok()
            .filter(|&minutes| within_delay_bounds(minutes))?;
        let early =
            !captures[1].is_empty() || lower.contains("anticipo") || lower.contains("early");
        return Some(if early { -minutes } else { minutes });
    }

    (lower.contains("in orario") || lower.contains("on time")).then_some(0)
}

fn phrase(value: &Value) -> Option<i64> {
    match value {
        Value::Array(items) => items.first().and_then(phrase),
        Value::String(text) => delay_from_phrase(text),
        _ => None,
    }
}

/// First non-timestamp text found under `groups`, in order.
fn free_text(object: &Map<String, Value>, groups: &[Keys], tz: Tz) -> Option<String> {
    let unresolved = |v: &Value| match v {
        Value::String(_) if time::normalize(v, tz).is_none() => text(v),
        _ => None,
    };
    groups.iter().find_map(|keys| probe(object, keys, unresolved))
}

fn station_hint(value: &Value) -> Option<String> {
    text(value).filter(|name| name != NO_STATION)
}

pub fn decode_stop(value: &Value, index: usize, tz: Tz) -> Stop {
    let Some(object) = value.as_object() else {
        return Stop::default();
    };
    let timestamp = |v: &Value| time::normalize(v, tz);

    let mut scheduled_arrival = probe(object, keys::SCHEDULED_ARRIVAL, timestamp);
    let mut scheduled_departure = probe(object, keys::SCHEDULED_DEPARTURE, timestamp);
    if scheduled_arrival.is_none() && scheduled_departure.is_none() {
        let fallback: Option<Millis> = probe(object, keys::SCHEDULED_ANY, timestamp);
        if index == 0 {
            scheduled_departure = fallback;
        } else {
            scheduled_arrival = fallback;
        }
    }

    Stop {
        station_name: probe(object, keys::STATION_NAME, text).unwrap_or_default(),
        scheduled_arrival,
        scheduled_departure,
        actual_arrival: probe(object, keys::ACTUAL_ARRIVAL, timestamp),
        actual_departure: probe(object, keys::ACTUAL_DEPARTURE, timestamp),
        forecast_arrival: probe(object, keys::FORECAST_ARRIVAL, timestamp),
        forecast_departure: probe(object, keys::FORECAST_DEPARTURE, timestamp),
        arrival_delay_minutes: probe(object, keys::ARRIVAL_DELAY, delay),
        departure_delay_minutes: probe(object, keys::DEPARTURE_DELAY, delay),
        platform: probe(object, keys::PLATFORM, text),
        arrival_text: free_text(
            object,
            &[keys::ACTUAL_ARRIVAL, keys::FORECAST_ARRIVAL, keys::SCHEDULED_ARRIVAL],
            tz,
        ),
        departure_text: free_text(
            object,
            &[keys::ACTUAL_DEPARTURE, keys::FORECAST_DEPARTURE, keys::SCHEDULED_DEPARTURE],
            tz,
        ),
    }
}

impl TrainDescriptor {
    /// Builds a descriptor from an `andamentoTreno` JSON object. Only a
    /// payload that is not an object at all is rejected.
    pub fn from_payload(payload: &Value, tz: Tz) -> Result<Self> {
        let object = payload.as_object().ok_or(TrenoError::NotATrain)?;

        let stops: Vec<Stop> = probe(object, keys::STOPS, |v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| decode_stop(item, index, tz))
                    .collect()
            })
            .unwrap_or_default();

        let descriptor = Self {
            train_number: probe(object, keys::TRAIN_NUMBER, text).unwrap_or_default(),
            origin_name: probe(object, keys::ORIGIN, text),
            destination_name: probe(object, keys::DESTINATION, text),
            train_kind_raw: probe(object, keys::TRAIN_KIND, text).unwrap_or_default(),
            global_delay_minutes: probe(object, keys::DELAY, delay)
                .or_else(|| probe(object, keys::DELAY_PHRASE, phrase)),
            last_known_station_name: probe(object, keys::LAST_KNOWN_STATION, station_hint),
            stops,
        };

        debug!(
            "Decoded train {:?} with {} stops",
            descriptor.train_number,
            descriptor.stops.len()
        );

        Ok(descriptor)
    }
}
