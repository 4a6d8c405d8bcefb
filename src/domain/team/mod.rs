//! Per-organization team usage statistics

mod entity;

pub use entity::{MemberStats, MemberUsage, TeamStats};
