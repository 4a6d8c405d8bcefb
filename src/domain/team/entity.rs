//! Team stats entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::storage::StorageEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStats {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub requests: u64,
    pub tokens: u64,
    /// USD
    pub spend: f64,
    pub last_active: DateTime<Utc>,
}

/// Usage to add to one member's running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberUsage {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub requests: u64,
    #[serde(default)]
    pub tokens: u64,
    #[serde(default)]
    pub spend: f64,
}

/// Usage totals of every member of one organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub organization_id: String,
    pub members: Vec<MemberStats>,
    pub updated_at: DateTime<Utc>,
}

impl StorageEntity for TeamStats {
    type Key = String;

    fn key(&self) -> &Self::Key {
        &self.organization_id
    }
}

impl TeamStats {
    pub fn empty(organization_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            organization_id: organization_id.into(),
            members: Vec::new(),
            updated_at: now,
        }
    }

    /// Adds `usage` to the member's totals, creating the member on first use.
    /// Profile fields are only overwritten when provided. Counters that
    /// would overflow leave the stats untouched.
    pub fn record(&mut self, usage: MemberUsage, now: DateTime<Utc>) -> Result<(), DomainError> {
        match self.members.iter_mut().find(|m| m.user_id == usage.user_id) {
            Some(member) => {
                let requests = member.requests.checked_add(usage.requests);
                let tokens = member.tokens.checked_add(usage.tokens);
                let (Some(requests), Some(tokens)) = (requests, tokens) else {
                    return Err(DomainError::validation(format!(
                        "Usage totals for member '{}' would overflow",
                        member.user_id
                    )));
                };

                member.requests = requests;
                member.tokens = tokens;
                member.spend += usage.spend;
                member.last_active = now;
                if usage.name.is_some() {
                    member.name = usage.name;
                }
                if usage.email.is_some() {
                    member.email = usage.email;
                }
                if let Some(role) = usage.role {
                    member.role = role;
                }
            }
            None => self.members.push(MemberStats {
                user_id: usage.user_id,
                name: usage.name,
                email: usage.email,
                role: usage.role.unwrap_or_else(|| "member".to_string()),
                requests: usage.requests,
                tokens: usage.tokens,
                spend: usage.spend,
                last_active: now,
            }),
        }

        self.updated_at = now;
        Ok(())
    }

    /// Members by descending spend; ties keep insertion order
    pub fn ranked(mut self) -> Self {
        self.members.sort_by(|a, b| b.spend.total_cmp(&a.spend));
        self
    }

    pub fn total_spend(&self) -> f64 {
        self.members.iter().map(|m| m.spend).sum()
    }
}
