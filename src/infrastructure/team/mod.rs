//! Team stats infrastructure

mod service;

pub use service::TeamStatsService;
