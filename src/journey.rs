use std::fmt;

use chrono_tz::Tz;
use log::debug;
use serde::{Serialize, Serializer};

use crate::data::{Stop, TrainDescriptor};
use crate::time::{self, Millis};
use crate::train_kind::TrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourneyState {
    Planned,
    Running,
    Completed,
    Unknown,
}

impl fmt::Display for JourneyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JourneyState::Planned => "PLANNED",
            JourneyState::Running => "RUNNING",
            JourneyState::Completed => "COMPLETED",
            JourneyState::Unknown => "UNKNOWN",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowClass {
    Past,
    Current,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeQuality {
    OnTime,
    Early,
    /// Late, or off schedule with no delay sign to tell which way.
    Late,
    ForecastLate,
    ForecastEarly,
    None,
}

/// Arrival or departure side of a stop row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCell {
    pub scheduled: Option<Millis>,
    pub actual: Option<Millis>,
    pub forecast: Option<Millis>,
    /// Forecast computed here from the global delay rather than read upstream.
    pub forecast_derived: bool,
    pub delay_minutes: Option<i64>,
    pub quality: TimeQuality,
    /// Upstream free text standing in for a time, echoed as is.
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopView {
    pub index: usize,
    pub station_name: String,
    pub platform: Option<String>,
    pub row: RowClass,
    pub arrival: TimeCell,
    pub departure: TimeCell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub state: JourneyState,
    pub past_stop_count: usize,
    pub total_stops: usize,
    pub minutes_to_departure: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyView {
    pub train_number: String,
    pub kind: TrainKind,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub state: JourneyState,
    pub past_stop_count: usize,
    pub total_stops: usize,
    pub minutes_to_departure: Option<i64>,
    #[serde(serialize_with = "index_or_minus_one")]
    pub current_stop_index: Option<usize>,
    pub global_delay_minutes: Option<i64>,
    pub stops: Vec<StopView>,
}

fn index_or_minus_one<S: Serializer>(
    index: &Option<usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match index {
        Some(index) => serializer.serialize_u64(*index as u64),
        None => serializer.serialize_i64(-1),
    }
}

/// Highest index with an actual arrival or departure. Every stop up to it
/// counts as passed, whether or not it carries its own actual time.
pub fn last_real_stop(stops: &[Stop]) -> Option<usize> {
    stops.iter().rposition(Stop::has_real_time)
}

pub fn classify(stops: &[Stop], now: Millis) -> Progress {
    let total_stops = stops.len();
    let past_stop_count = last_real_stop(stops).map_or(0, |index| index + 1);

    let (state, minutes_to_departure) = match (stops.first(), stops.last()) {
        (None, _) | (_, None) => (JourneyState::Unknown, None),
        (Some(first), _) if past_stop_count == 0 => {
            let minutes = first
                .scheduled_departure
                .filter(|&departure| departure > now)
                .map(|departure| time::minutes_until(now, departure));
            (JourneyState::Planned, minutes)
        }
        (_, Some(last)) if past_stop_count >= total_stops && last.actual_arrival.is_some() => {
            (JourneyState::Completed, None)
        }
        _ => (JourneyState::Running, None),
    };

    Progress {
        state,
        past_stop_count,
        total_stops,
        minutes_to_departure,
    }
}

/// The live last-detection hint wins over timetable evidence.
pub fn current_stop(train: &TrainDescriptor) -> Option<usize> {
    train
        .last_known_station_name
        .as_deref()
        .and_then(|name| train.position_of(name))
        .or_else(|| last_real_stop(&train.stops))
}

#[derive(Debug)]
pub struct Reconciler<'a> {
    pub train: &'a TrainDescriptor,
    pub now: Millis,
    pub tz: Tz,

    pub progress: Progress,
    pub last_real: Option<usize>,
    pub current: Option<usize>,
}

impl<'a> Reconciler<'a> {
    pub fn new(train: &'a TrainDescriptor, now: Millis, tz: Tz) -> Self {
        Self {
            train,
            now,
            tz,
            progress: classify(&train.stops, now),
            last_real: last_real_stop(&train.stops),
            current: current_stop(train),
        }
    }

    pub fn view(&self) -> JourneyView {
        debug!(
            "Reconciling train {:?} at {}: {} at stop {:?} of {}",
            self.train.train_number,
            self.now,
            self.progress.state,
            self.current,
            self.progress.total_stops
        );

        JourneyView {
            train_number: self.train.train_number.clone(),
            kind: self.train.kind(),
            origin_name: self.train.origin_name.clone(),
            destination_name: self.train.destination_name.clone(),
            state: self.progress.state,
            past_stop_count: self.progress.past_stop_count,
            total_stops: self.progress.total_stops,
            minutes_to_departure: self.progress.minutes_to_departure,
            current_stop_index: self.current,
            global_delay_minutes: self.train.global_delay_minutes,
            stops: self
                .train
                .stops
                .iter()
                .enumerate()
                .map(|(index, stop)| self.stop_view(index, stop))
                .collect(),
        }
    }

    pub fn row_class(&self, index: usize) -> RowClass {
        if self.current == Some(index) {
            RowClass::Current
        } else if self.last_real.is_some_and(|last| index <= last) {
            RowClass::Past
        } else {
            RowClass::Future
        }
    }

    /// Forecasts only describe a running train from its current stop onwards,
    /// and never a stop that later real-time evidence has already passed.
    fn forecastable(&self, index: usize) -> bool {
        self.progress.state == JourneyState::Running
            && self.current.is_some_and(|current| index >= current)
            && !self.last_real.is_some_and(|last| index < last)
    }

    fn stop_view(&self, index: usize, stop: &Stop) -> StopView {
        StopView {
            index,
            station_name: stop.station_name.clone(),
            platform: stop.platform.clone(),
            row: self.row_class(index),
            arrival: self.cell(
                self.forecastable(index) && stop.actual_departure.is_none(),
                stop.scheduled_arrival,
                stop.actual_arrival,
                stop.forecast_arrival,
                stop.arrival_delay_minutes,
                stop.arrival_text.as_deref(),
            ),
            departure: self.cell(
                self.forecastable(index),
                stop.scheduled_departure,
                stop.actual_departure,
                stop.forecast_departure,
                stop.departure_delay_minutes,
                stop.departure_text.as_deref(),
            ),
        }
    }

    fn cell(
        &self,
        forecastable: bool,
        scheduled: Option<Millis>,
        actual: Option<Millis>,
        upstream_forecast: Option<Millis>,
        stop_delay: Option<i64>,
        raw_text: Option<&str>,
    ) -> TimeCell {
        let global_delay = self.train.global_delay_minutes;
        let delay_minutes = stop_delay.or(global_delay);

        let mut cell = TimeCell {
            scheduled,
            actual,
            forecast: None,
            forecast_derived: false,
            delay_minutes,
            quality: TimeQuality::None,
            raw_text: raw_text.map(str::to_owned),
        };

        if let Some(actual) = actual {
            let on_schedule = scheduled
                .is_some_and(|scheduled| time::same_minute(actual, scheduled, self.tz));
            cell.quality = if on_schedule {
                TimeQuality::OnTime
            } else if delay_minutes.is_some_and(|delay| delay < 0) {
                TimeQuality::Early
            } else {
                TimeQuality::Late
            };
            return cell;
        }

        if !forecastable {
            return cell;
        }

        if let Some(forecast) = upstream_forecast {
            let drift = delay_minutes
                .filter(|&delay| delay != 0)
                .or_else(|| scheduled.map(|scheduled| (forecast - scheduled).signum()))
                .unwrap_or(0);
            cell.forecast = Some(forecast);
            cell.quality = forecast_quality(drift);
        } else if let (Some(scheduled), Some(delay)) =
            (scheduled, global_delay.filter(|&delay| delay != 0))
        {
            let derived = time::minutes_to_millis(delay)
                .and_then(|shift| scheduled.checked_add(shift));
            if let Some(forecast) = derived {
                cell.forecast = Some(forecast);
                cell.forecast_derived = true;
                cell.quality = forecast_quality(delay);
            }
        }

        cell
    }
}

fn forecast_quality(delay: i64) -> TimeQuality {
    match delay.signum() {
        1 => TimeQuality::ForecastLate,
        -1 => TimeQuality::ForecastEarly,
        _ => TimeQuality::OnTime,
    }
}

impl TimeCell {
    /// Table text: scheduled `HH:MM`, then the observed time with its quality
    /// mark, or the upstream free text when no time resolved.
    pub fn display(&self, tz: Tz) -> String {
        let clock = |millis: Option<Millis>| {
            millis
                .and_then(|millis| time::hhmm(millis, tz))
                .unwrap_or_else(|| "--:--".to_owned())
        };
        let mark = match self.quality {
            TimeQuality::OnTime | TimeQuality::None => "",
            TimeQuality::Early => "-",
            TimeQuality::Late => "+",
            TimeQuality::ForecastLate => "~+",
            TimeQuality::ForecastEarly => "~-",
        };

        match (self.scheduled, self.actual.or(self.forecast), &self.raw_text) {
            (scheduled, Some(observed), _) => {
                format!("{} {}{}", clock(scheduled), clock(Some(observed)), mark)
            }
            (None, None, Some(text)) => text.clone(),
            (Some(scheduled), None, Some(text)) => format!("{} {}", clock(Some(scheduled)), text),
            (None, None, None) => String::new(),
            (scheduled, None, None) => clock(scheduled),
        }
    }
}

impl JourneyView {
    pub fn current_stop(&self) -> Option<&StopView> {
        self.stops.get(self.current_stop_index?)
    }

    /// Short status text, e.g. `RUNNING +7 min` or `PLANNED in 25 min`.
    pub fn badge(&self) -> String {
        match (self.state, self.minutes_to_departure, self.global_delay_minutes) {
            (JourneyState::Planned, Some(minutes), _) => {
                format!("{} in {} min", self.state, minutes)
            }
            (JourneyState::Running | JourneyState::Completed, _, Some(delay)) if delay != 0 => {
                format!("{} {:+} min", self.state, delay)
            }
            (JourneyState::Running | JourneyState::Completed, _, Some(_)) => {
                format!("{} on time", self.state)
            }
            _ => self.state.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        let route = format!(
            "{} → {}",
            self.origin_name.as_deref().unwrap_or("?"),
            self.destination_name.as_deref().unwrap_or("?")
        );
        let position = match self.current_stop() {
            Some(stop) => format!(", at {}", stop.station_name),
            None => String::new(),
        };

        format!(
            "{} {} {}: {}/{} stops passed{} [{}]",
            self.kind.code.unwrap_or(self.kind.label),
            self.train_number,
            route,
            self.past_stop_count,
            self.total_stops,
            position,
            self.badge()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Rome;

    // 2025-11-28 10:30 in Rome.
    const T0: Millis = 1_764_322_200_000;
    const MINUTE: Millis = 60_000;

    fn stop(name: &str, scheduled: Millis) -> Stop {
        Stop {
            scheduled_arrival: Some(scheduled),
            scheduled_departure: Some(scheduled + MINUTE),
            ..Stop::named(name)
        }
    }

    fn line(count: usize) -> Vec<Stop> {
        (0..count)
            .map(|i| stop(&format!("S{i}"), T0 + 30 * MINUTE * i as Millis))
            .collect()
    }

    fn train(stops: Vec<Stop>) -> TrainDescriptor {
        TrainDescriptor {
            train_number: "9544".to_owned(),
            train_kind_raw: "FR 9544".to_owned(),
            stops,
            ..TrainDescriptor::default()
        }
    }

    #[test]
    fn empty_itinerary_is_unknown() {
        let progress = classify(&[], T0);
        assert_eq!(progress.state, JourneyState::Unknown);
        assert_eq!((progress.past_stop_count, progress.total_stops), (0, 0));
        assert_eq!(progress.minutes_to_departure, None);
    }

    #[test]
    fn future_departure_is_planned_with_countdown() {
        let stops = vec![Stop {
            scheduled_departure: Some(T0 + 25 * MINUTE),
            ..Stop::named("MILANO CENTRALE")
        }];

        let progress = classify(&stops, T0);
        assert_eq!(progress.state, JourneyState::Planned);
        assert_eq!(progress.minutes_to_departure, Some(25));

        let progress = classify(&stops, T0 + 25 * MINUTE - 1);
        assert_eq!(progress.minutes_to_departure, Some(1));
    }

    #[test]
    fn due_or_unscheduled_departure_is_planned_without_countdown() {
        let due = vec![stop("A", T0 - 5 * MINUTE), stop("B", T0 + 30 * MINUTE)];
        let progress = classify(&due, T0);
        assert_eq!(progress.state, JourneyState::Planned);
        assert_eq!(progress.minutes_to_departure, None);

        let unscheduled = vec![Stop::named("A"), Stop::named("B")];
        assert_eq!(classify(&unscheduled, T0).minutes_to_departure, None);
    }

    #[test]
    fn confirmed_terminal_arrival_completes_the_journey() {
        let mut stops = line(4);
        stops[3].actual_arrival = Some(T0 + 91 * MINUTE);

        let progress = classify(&stops, T0 + 120 * MINUTE);
        assert_eq!(progress.state, JourneyState::Completed);
        assert_eq!(progress.past_stop_count, 4);
        assert_eq!(progress.total_stops, 4);
    }

    #[test]
    fn missing_terminal_arrival_keeps_it_running() {
        let mut stops = line(4);
        stops[3].actual_departure = Some(T0 + 91 * MINUTE);

        let progress = classify(&stops, T0 + 120 * MINUTE);
        assert_eq!(progress.past_stop_count, progress.total_stops);
        assert_eq!(progress.state, JourneyState::Running);
    }

    #[test]
    fn intermediate_evidence_means_running() {
        let mut stops = line(5);
        stops[1].actual_departure = Some(T0 + 32 * MINUTE);

        let progress = classify(&stops, T0 + 40 * MINUTE);
        assert_eq!(progress.state, JourneyState::Running);
        assert_eq!(progress.past_stop_count, 2);
    }

    #[test]
    fn later_evidence_marks_earlier_stops_past() {
        let mut stops = line(5);
        stops[3].actual_arrival = Some(T0 + 90 * MINUTE);
        let train = train(stops);

        let reconciler = Reconciler::new(&train, T0 + 95 * MINUTE, Rome);
        let rows: Vec<RowClass> = (0..5).map(|i| reconciler.row_class(i)).collect();
        assert_eq!(
            rows,
            vec![
                RowClass::Past,
                RowClass::Past,
                RowClass::Past,
                RowClass::Current,
                RowClass::Future
            ]
        );
    }

    #[test]
    fn station_hint_wins_over_timetable_evidence() {
        let mut stops = line(5);
        stops[0].actual_departure = Some(T0);
        let mut train = train(stops);
        train.last_known_station_name = Some(" s2 ".to_owned());

        assert_eq!(current_stop(&train), Some(2));
    }

    #[test]
    fn current_stop_falls_back_to_last_real_stop() {
        let mut stops = line(5);
        stops[1].actual_arrival = Some(T0 + 30 * MINUTE);
        let mut train = train(stops);
        assert_eq!(current_stop(&train), Some(1));

        train.last_known_station_name = Some("NOWHERE".to_owned());
        assert_eq!(current_stop(&train), Some(1));
    }

    #[test]
    fn unknown_position_without_evidence() {
        let train = train(line(3));
        assert_eq!(current_stop(&train), None);

        let view = Reconciler::new(&train, T0, Rome).view();
        assert_eq!(view.current_stop_index, None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["currentStopIndex"], serde_json::json!(-1));
        assert_eq!(json["state"], serde_json::json!("PLANNED"));
    }

    #[test]
    fn global_delay_derives_future_forecasts() {
        let mut stops = line(5);
        stops[1].actual_departure = Some(T0 + 41 * MINUTE);
        let mut train = train(stops);
        train.global_delay_minutes = Some(10);

        let view = Reconciler::new(&train, T0 + 45 * MINUTE, Rome).view();
        assert_eq!(view.state, JourneyState::Running);

        let ahead = &view.stops[3].arrival;
        assert_eq!(ahead.forecast, Some(T0 + 90 * MINUTE + 10 * MINUTE));
        assert!(ahead.forecast_derived);
        assert_eq!(ahead.quality, TimeQuality::ForecastLate);

        // The past is never forecast.
        assert_eq!(view.stops[0].arrival.forecast, None);
        assert_eq!(view.stops[0].arrival.quality, TimeQuality::None);

        // Current stop already left: its missing arrival is past, not forecast.
        assert_eq!(view.stops[1].departure.quality, TimeQuality::Late);
        assert_eq!(view.stops[1].arrival.forecast, None);
        assert_eq!(view.stops[1].arrival.quality, TimeQuality::None);
    }

    #[test]
    fn arrived_stop_still_forecasts_its_departure() {
        let mut stops = line(3);
        stops[1].actual_arrival = Some(T0 + 34 * MINUTE);
        let mut train = train(stops);
        train.global_delay_minutes = Some(4);

        let view = Reconciler::new(&train, T0 + 35 * MINUTE, Rome).view();
        assert_eq!(view.stops[1].arrival.quality, TimeQuality::Late);
        assert_eq!(view.stops[1].departure.forecast, Some(T0 + 35 * MINUTE));
        assert_eq!(view.stops[1].departure.quality, TimeQuality::ForecastLate);
    }

    #[test]
    fn hint_behind_later_evidence_keeps_evidence_stops_past() {
        let mut stops = line(6);
        stops[4].actual_arrival = Some(T0 + 125 * MINUTE);
        let mut train = train(stops);
        train.last_known_station_name = Some("S2".to_owned());
        train.global_delay_minutes = Some(5);

        let reconciler = Reconciler::new(&train, T0 + 126 * MINUTE, Rome);
        assert_eq!(reconciler.current, Some(2));

        let view = reconciler.view();
        assert_eq!(view.state, JourneyState::Running);
        assert_eq!(view.current_stop_index, Some(2));
        assert_eq!(view.past_stop_count, 5);

        let rows: Vec<RowClass> = view.stops.iter().map(|stop| stop.row).collect();
        assert_eq!(
            rows,
            vec![
                RowClass::Past,
                RowClass::Past,
                RowClass::Current,
                RowClass::Past,
                RowClass::Past,
                RowClass::Future
            ]
        );

        // Stops behind the last evidence are passed, so nothing is forecast there.
        assert_eq!(view.stops[3].arrival.forecast, None);
        assert_eq!(view.stops[2].arrival.forecast, None);
        assert_eq!(view.stops[5].arrival.forecast, Some(T0 + 155 * MINUTE));
    }

    #[test]
    fn overflowing_delay_derives_no_forecast() {
        let mut stops = line(3);
        stops[0].actual_departure = Some(T0);
        let mut train = train(stops);

        for delay in [i64::MAX, i64::MIN, i64::MAX / 60_000] {
            train.global_delay_minutes = Some(delay);
            let view = Reconciler::new(&train, T0 + MINUTE, Rome).view();
            assert_eq!(view.stops[2].arrival.forecast, None);
            assert_eq!(view.stops[2].arrival.quality, TimeQuality::None);
        }
    }

    #[test]
    fn negative_delay_forecasts_early() {
        let mut stops = line(3);
        stops[0].actual_departure = Some(T0);
        let mut train = train(stops);
        train.global_delay_minutes = Some(-2);

        let view = Reconciler::new(&train, T0 + 5 * MINUTE, Rome).view();
        assert_eq!(view.stops[2].arrival.forecast, Some(T0 + 58 * MINUTE));
        assert_eq!(view.stops[2].arrival.quality, TimeQuality::ForecastEarly);
    }

    #[test]
    fn no_forecasts_outside_a_running_journey() {
        let mut train = train(line(3));
        train.global_delay_minutes = Some(10);
        let view = Reconciler::new(&train, T0 - 10 * MINUTE, Rome).view();
        assert_eq!(view.state, JourneyState::Planned);
        assert!(view.stops.iter().all(|stop| stop.arrival.forecast.is_none()));

        let mut stops = line(3);
        stops[2].actual_arrival = Some(T0 + 70 * MINUTE);
        let mut train = self::train(stops);
        train.global_delay_minutes = Some(10);
        let view = Reconciler::new(&train, T0 + 80 * MINUTE, Rome).view();
        assert_eq!(view.state, JourneyState::Completed);
        assert!(view.stops.iter().all(|stop| stop.departure.forecast.is_none()));
    }

    #[test]
    fn zero_delay_derives_nothing() {
        let mut stops = line(3);
        stops[0].actual_departure = Some(T0);
        let mut train = train(stops);
        train.global_delay_minutes = Some(0);

        let view = Reconciler::new(&train, T0 + MINUTE, Rome).view();
        assert_eq!(view.stops[2].arrival.forecast, None);
        assert_eq!(view.stops[2].arrival.quality, TimeQuality::None);
    }

    #[test]
    fn upstream_forecast_takes_precedence() {
        let mut stops = line(3);
        stops[0].actual_departure = Some(T0);
        stops[2].forecast_arrival = Some(T0 + 57 * MINUTE);
        let mut train = train(stops);
        train.global_delay_minutes = Some(5);

        let view = Reconciler::new(&train, T0 + MINUTE, Rome).view();
        let cell = &view.stops[2].arrival;
        assert_eq!(cell.forecast, Some(T0 + 57 * MINUTE));
        assert!(!cell.forecast_derived);
        // The global delay decides the sign, as for real times.
        assert_eq!(cell.quality, TimeQuality::ForecastLate);
    }

    #[test]
    fn real_time_quality_compares_minutes() {
        let mut stops = line(4);
        stops[0].actual_departure = Some(T0 + MINUTE + 40_000);
        stops[1].actual_arrival = Some(T0 + 28 * MINUTE);
        stops[1].arrival_delay_minutes = Some(-2);
        stops[1].actual_departure = Some(T0 + 33 * MINUTE);
        stops[1].departure_delay_minutes = Some(2);
        stops[2].actual_arrival = Some(T0 + 61 * MINUTE);
        stops[2].arrival_delay_minutes = Some(0);
        let train = train(stops);

        let view = Reconciler::new(&train, T0 + 62 * MINUTE, Rome).view();
        assert_eq!(view.stops[0].departure.quality, TimeQuality::OnTime);
        assert_eq!(view.stops[1].arrival.quality, TimeQuality::Early);
        assert_eq!(view.stops[1].departure.quality, TimeQuality::Late);
        assert_eq!(view.stops[2].arrival.quality, TimeQuality::Late);
        assert_eq!(view.stops[2].arrival.delay_minutes, Some(0));
    }

    #[test]
    fn per_stop_delay_falls_back_to_global() {
        let mut stops = line(2);
        stops[0].actual_departure = Some(T0 - 3 * MINUTE);
        let mut train = train(stops);
        train.global_delay_minutes = Some(-3);

        let view = Reconciler::new(&train, T0, Rome).view();
        assert_eq!(view.stops[0].departure.delay_minutes, Some(-3));
        assert_eq!(view.stops[0].departure.quality, TimeQuality::Early);
    }

    #[test]
    fn free_text_is_echoed_when_no_time_resolves() {
        let mut stops = line(2);
        stops[0].actual_departure = Some(T0 + 2 * MINUTE);
        stops[1].scheduled_arrival = None;
        stops[1].arrival_text = Some("in arrivo".to_owned());
        stops[1].departure_text = Some("10:42".to_owned());
        let train = train(stops);

        let view = Reconciler::new(&train, T0 + 5 * MINUTE, Rome).view();
        assert_eq!(view.stops[1].arrival.display(Rome), "in arrivo");
        assert_eq!(view.stops[1].departure.display(Rome), "11:01 10:42");
        assert_eq!(view.stops[0].departure.display(Rome), "10:31 10:32+");
        assert_eq!(view.stops[0].arrival.display(Rome), "10:30");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["stops"][1]["arrival"]["rawText"], "in arrivo");
    }

    #[test]
    fn badge_and_summary() {
        let mut stops = line(3);
        stops[0].actual_departure = Some(T0 + 8 * MINUTE);
        let mut train = train(stops);
        train.origin_name = Some("MILANO CENTRALE".to_owned());
        train.destination_name = Some("ROMA TERMINI".to_owned());
        train.global_delay_minutes = Some(7);

        let view = Reconciler::new(&train, T0 + 10 * MINUTE, Rome).view();
        assert_eq!(view.badge(), "RUNNING +7 min");
        assert_eq!(
            view.summary(),
            "FR 9544 MILANO CENTRALE → ROMA TERMINI: 1/3 stops passed, at S0 [RUNNING +7 min]"
        );

        let fresh = self::train(line(3));
        let view = Reconciler::new(&fresh, T0 - 30 * MINUTE, Rome).view();
        assert_eq!(view.badge(), "PLANNED in 31 min");
    }
}
