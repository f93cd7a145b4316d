//! Italian train status from the ViaggiaTreno endpoints.
//!
//! [`raw`] turns an `andamentoTreno` payload into a [`data::TrainDescriptor`],
//! [`journey::Reconciler`] derives the journey state, current stop and per-stop
//! display classes from it. Both are pure; [`client`] does the fetching.

pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod journey;
pub mod raw;
pub mod stations;
pub mod time;
pub mod train_kind;
