use std::str::FromStr;

use chrono_tz::Tz;
use itertools::Itertools;
use log::{debug, info};
use reqwest::{blocking::Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::data::TrainDescriptor;
use crate::error::{Result, TrenoError};
use crate::stations::{Station, StationDirectory};
use crate::time::Millis;

/// One hit of the train number autocomplete: the same number may run from
/// several origins or on several days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainCandidate {
    pub number: String,
    pub origin_name: String,
    pub origin_code: String,
    /// Local midnight of the departure day, as upstream expects it back.
    pub departure_date: Millis,
}

impl FromStr for TrainCandidate {
    type Err = TrenoError;

    /// Parses `9544 - MILANO CENTRALE - 28/11/25|9544-S01700-1764284400000`.
    fn from_str(line: &str) -> Result<Self> {
        let malformed = || TrenoError::Autocomplete(line.to_owned());

        let (label, key) = line.trim().split_once('|').ok_or_else(malformed)?;
        let mut key_parts = key.trim().splitn(3, '-');
        let (Some(number), Some(origin_code), Some(date)) =
            (key_parts.next(), key_parts.next(), key_parts.next())
        else {
            return Err(malformed());
        };

        let departure_date = date.trim().parse().map_err(|_| malformed())?;
        let origin_name = label
            .split(" - ")
            .nth(1)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(origin_code)
            .to_owned();

        Ok(Self {
            number: number.trim().to_owned(),
            origin_name,
            origin_code: origin_code.trim().to_owned(),
            departure_date,
        })
    }
}

/// Parses `MILANO CENTRALE|S01700`.
pub fn parse_station_line(line: &str) -> Result<Station> {
    let (name, code) = line
        .trim()
        .split_once('|')
        .ok_or_else(|| TrenoError::Autocomplete(line.to_owned()))?;

    Ok(Station {
        name: name.trim().to_owned(),
        code: code.trim().to_owned(),
        region: None,
    })
}

fn lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Picks the run to query among autocomplete hits.
///
/// `from` may be an origin code or name; names are also resolved through the
/// station directory. Without `from`, several distinct origins are ambiguous.
pub fn pick_candidate(
    number: &str,
    candidates: Vec<TrainCandidate>,
    from: Option<&str>,
    directory: &StationDirectory,
) -> Result<TrainCandidate> {
    if candidates.is_empty() {
        return Err(TrenoError::UnknownTrain {
            number: number.to_owned(),
        });
    }

    match from {
        Some(from) => {
            let codes: Vec<&str> = directory
                .resolve(from)
                .into_iter()
                .map(|station| station.code.as_str())
                .collect();

            candidates
                .into_iter()
                .find(|candidate| {
                    candidate.origin_code.eq_ignore_ascii_case(from.trim())
                        || candidate.origin_name.eq_ignore_ascii_case(from.trim())
                        || codes.contains(&candidate.origin_code.as_str())
                })
                .ok_or_else(|| TrenoError::NoSuchOrigin {
                    number: number.to_owned(),
                    origin: from.to_owned(),
                })
        }
        None => {
            let origins: Vec<&str> = candidates
                .iter()
                .map(|candidate| candidate.origin_name.as_str())
                .unique()
                .collect();

            if origins.len() > 1 {
                return Err(TrenoError::AmbiguousTrain {
                    number: number.to_owned(),
                    origins: origins.join(", "),
                });
            }

            candidates.into_iter().next().ok_or_else(|| TrenoError::UnknownTrain {
                number: number.to_owned(),
            })
        }
    }
}

/// Blocking client for the ViaggiaTreno REST endpoints.
#[derive(Debug)]
pub struct ViaggiaTreno {
    http: Client,
    base_url: Url,
    tz: Tz,
}

impl ViaggiaTreno {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|_| TrenoError::BaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(TrenoError::BaseUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("treno/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            tz: config.tz,
        })
    }

    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TrenoError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_text(&self, segments: &[&str]) -> Result<String> {
        let url = self.endpoint(segments)?;
        debug!("GET {url}");

        let response = self.http.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrenoError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }

    pub fn search_train(&self, number: &str) -> Result<Vec<TrainCandidate>> {
        let body = self.get_text(&["cercaNumeroTrenoTrenoAutocomplete", number.trim()])?;
        let candidates = lines(&body)
            .map(TrainCandidate::from_str)
            .collect::<Result<Vec<_>>>()?;

        info!("Found {} runs for train {}", candidates.len(), number);
        Ok(candidates)
    }

    pub fn search_stations(&self, prefix: &str) -> Result<Vec<Station>> {
        let body = self.get_text(&["autocompletaStazione", prefix.trim()])?;
        lines(&body).map(parse_station_line).collect()
    }

    /// Raw `andamentoTreno` payload for one run.
    pub fn train_status(&self, candidate: &TrainCandidate) -> Result<Value> {
        let date = candidate.departure_date.to_string();
        let body = self.get_text(&[
            "andamentoTreno",
            &candidate.origin_code,
            &candidate.number,
            &date,
        ])?;

        if body.trim().is_empty() {
            return Err(TrenoError::UnknownTrain {
                number: candidate.number.clone(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub fn fetch_train(&self, candidate: &TrainCandidate) -> Result<TrainDescriptor> {
        info!(
            "Fetching train {} from {} ({})",
            candidate.number, candidate.origin_name, candidate.origin_code
        );
        TrainDescriptor::from_payload(&self.train_status(candidate)?, self.tz)
    }
}
