//! Usage recording, budgets, alerts and the dashboard built from them

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::DomainError;
use crate::domain::identity::Identity;
use crate::domain::usage::{
    Alert, AlertRepository, Budget, BudgetPeriod, BudgetRepository, DashboardMetrics, Timeframe,
    UsageLog, UsageLogRepository, UsageQuery, compute_dashboard_metrics,
};

/// A usage event reported by a client
#[derive(Debug, Clone, Deserialize)]
pub struct RecordUsageRequest {
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    pub cost: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetRequest {
    pub amount: f64,
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRequest {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Which logs to list; `days` counts back from now
#[derive(Debug, Clone, Default)]
pub struct UsageFilter {
    pub days: Option<u32>,
    pub provider: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderUsage {
    pub requests: usize,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_requests: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub by_provider: BTreeMap<String, ProviderUsage>,
}

impl UsageSummary {
    fn from_logs(logs: &[UsageLog]) -> Self {
        let mut summary = Self::default();

        for log in logs {
            summary.total_requests += 1;
            summary.total_tokens = summary.total_tokens.saturating_add(log.total_tokens);
            summary.total_cost += log.cost;

            let provider = summary
                .by_provider
                .entry(log.provider.to_lowercase())
                .or_default();
            provider.requests += 1;
            provider.tokens = provider.tokens.saturating_add(log.total_tokens);
            provider.cost += log.cost;
        }

        summary
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub usage: Vec<UsageLog>,
    pub summary: UsageSummary,
}

#[derive(Debug)]
pub struct UsageService<U, B, A>
where
    U: UsageLogRepository,
    B: BudgetRepository,
    A: AlertRepository,
{
    usage: Arc<U>,
    budgets: Arc<B>,
    alerts: Arc<A>,
}

impl<U, B, A> UsageService<U, B, A>
where
    U: UsageLogRepository,
    B: BudgetRepository,
    A: AlertRepository,
{
    pub fn new(usage: Arc<U>, budgets: Arc<B>, alerts: Arc<A>) -> Self {
        Self {
            usage,
            budgets,
            alerts,
        }
    }

    pub async fn record(
        &self,
        owner: &Identity,
        request: RecordUsageRequest,
    ) -> Result<UsageLog, DomainError> {
        let provider = request.provider.trim();
        if provider.is_empty() {
            return Err(DomainError::validation("Provider is required"));
        }
        if !request.cost.is_finite() || request.cost < 0.0 {
            return Err(DomainError::validation("Cost must be a non-negative number"));
        }
        if request
            .prompt_tokens
            .checked_add(request.completion_tokens)
            .is_none()
        {
            return Err(DomainError::validation("Token counts are too large"));
        }

        let mut log = UsageLog::new(owner, provider.to_lowercase(), request.cost)
            .with_tokens(request.prompt_tokens, request.completion_tokens);
        if let Some(model) = request.model.filter(|m| !m.trim().is_empty()) {
            log = log.with_model(model);
        }
        if let Some(timestamp) = request.timestamp {
            log = log.at(timestamp);
        }

        self.usage.record(log).await
    }

    /// The organization's logs, newest first, with totals over the listed logs
    pub async fn list(
        &self,
        owner: &Identity,
        filter: UsageFilter,
        now: DateTime<Utc>,
    ) -> Result<UsageReport, DomainError> {
        let mut query = UsageQuery::new().for_organization(&owner.organization_id);
        if let Some(days) = filter.days {
            query = query.since(now - Duration::days(i64::from(days)));
        }
        if let Some(provider) = filter.provider.filter(|p| p != "all") {
            query = query.for_provider(provider);
        }
        if let Some(limit) = filter.limit {
            query = query.with_limit(limit);
        }

        let usage = self.usage.query(&query).await?;
        let summary = UsageSummary::from_logs(&usage);

        Ok(UsageReport { usage, summary })
    }

    pub async fn create_budget(
        &self,
        owner: &Identity,
        request: CreateBudgetRequest,
    ) -> Result<Budget, DomainError> {
        let period = request.period.unwrap_or(BudgetPeriod::Monthly);
        let budget = Budget::new(&owner.organization_id, request.amount, period)?;
        let budget = self.budgets.create(budget).await?;

        info!(
            organization = %owner.organization_id,
            amount = budget.amount,
            period = ?budget.period,
            "Created budget"
        );
        Ok(budget)
    }

    pub async fn list_budgets(
        &self,
        owner: &Identity,
        active_only: bool,
    ) -> Result<Vec<Budget>, DomainError> {
        let budgets = self
            .budgets
            .list_for_organization(&owner.organization_id)
            .await?;

        Ok(budgets
            .into_iter()
            .filter(|b| !active_only || b.is_active)
            .collect())
    }

    pub async fn create_alert(
        &self,
        owner: &Identity,
        request: CreateAlertRequest,
    ) -> Result<Alert, DomainError> {
        if request.alert_type.trim().is_empty() {
            return Err(DomainError::validation("Alert type is required"));
        }
        if request.message.trim().is_empty() {
            return Err(DomainError::validation("Alert message is required"));
        }

        let mut alert = Alert::new(owner, request.alert_type.trim(), request.message);
        if let Some(threshold) = request.threshold {
            alert = alert.with_threshold(threshold);
        }

        self.alerts.create(alert).await
    }

    pub async fn list_alerts(&self, owner: &Identity) -> Result<Vec<Alert>, DomainError> {
        self.alerts
            .list_for_organization(&owner.organization_id)
            .await
    }

    /// Dashboard over `timeframe` ending at `now`, compared with the window
    /// of the same length before it
    pub async fn dashboard(
        &self,
        owner: &Identity,
        timeframe: Timeframe,
        total_users: usize,
        now: DateTime<Utc>,
    ) -> Result<DashboardMetrics, DomainError> {
        let org = &owner.organization_id;
        let start = timeframe.start(now);

        let current = self
            .usage
            .query(&UsageQuery::new().for_organization(org).between(start, now))
            .await?;
        let previous = self
            .usage
            .query(
                &UsageQuery::new()
                    .for_organization(org)
                    .between(timeframe.previous_start(now), start),
            )
            .await?;
        let budgets = self.budgets.list_for_organization(org).await?;
        let alerts = self.alerts.list_for_organization(org).await?;

        Ok(compute_dashboard_metrics(
            now,
            timeframe,
            &current,
            &previous,
            &budgets,
            &alerts,
            total_users,
        ))
    }
}
