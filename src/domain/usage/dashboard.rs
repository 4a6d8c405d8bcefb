//! Dashboard metrics over a reporting window

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use super::{Alert, Budget, BudgetPeriod, UsageLog};

const RECENT_ALERTS: usize = 5;
const RISK_PER_ALERT: u32 = 10;
const OPTIMAL_SPEND: f64 = 1000.0;
const BUDGET_ALERT_UTILIZATION: f64 = 80.0;
const CONCENTRATION_SHARE: f64 = 60.0;
const POWER_USER_RATIO: f64 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Timeframe {
    #[serde(rename = "7d")]
    SevenDays,
    #[default]
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
    #[serde(rename = "mtd")]
    MonthToDate,
}

impl Timeframe {
    /// Unknown values fall back to 30 days
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "7d" => Self::SevenDays,
            "90d" => Self::NinetyDays,
            "mtd" => Self::MonthToDate,
            _ => Self::ThirtyDays,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
            Self::NinetyDays => "90d",
            Self::MonthToDate => "mtd",
        }
    }

    /// First instant of the window ending at `now`
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::SevenDays => now - Duration::days(7),
            Self::ThirtyDays => now - Duration::days(30),
            Self::NinetyDays => now - Duration::days(90),
            Self::MonthToDate => Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
        }
    }

    /// The comparison window ends where this one starts. Month-to-date
    /// compares against the preceding 30 days.
    pub fn previous_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            Self::SevenDays => 7,
            Self::NinetyDays => 90,
            Self::ThirtyDays | Self::MonthToDate => 30,
        };
        self.start(now) - Duration::days(days)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn cents(value: f64) -> f64 {
    round_to(value, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveMetrics {
    pub total_spend: f64,
    pub total_requests: usize,
    pub monthly_budget: f64,
    pub budget_utilization: f64,
    pub cost_per_employee: f64,
    pub risk_score: u32,
    pub monthly_growth: f64,
    pub avg_cost_per_request: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMetrics {
    pub id: String,
    pub name: String,
    pub spend: f64,
    pub share: f64,
    pub requests: usize,
    pub tokens: u64,
    pub avg_cost: f64,
    pub trend: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMetrics {
    pub total_users: usize,
    pub active_users: usize,
    pub power_users: usize,
    pub avg_usage_per_user: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub period: &'static str,
    pub spend: f64,
    pub confidence: u8,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority: &'static str,
    pub title: &'static str,
    pub description: String,
    pub impact: String,
    pub action: &'static str,
    pub confidence: u8,
    pub timeframe: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub threshold: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub timeframe: Timeframe,
    pub window_start: DateTime<Utc>,
    pub executive_metrics: ExecutiveMetrics,
    pub providers: Vec<ProviderMetrics>,
    pub team_metrics: TeamMetrics,
    pub forecast: Vec<ForecastRow>,
    pub insights: Vec<Insight>,
    pub alerts: Vec<RecentAlert>,
}

#[derive(Default)]
struct ProviderTotals {
    spend: f64,
    requests: usize,
    tokens: u64,
}

/// Aggregates one organization's usage into dashboard metrics.
///
/// `current_logs` and `previous_logs` must already be restricted to the
/// window and the comparison window; inactive budgets and alerts are ignored.
pub fn compute_dashboard_metrics(
    now: DateTime<Utc>,
    timeframe: Timeframe,
    current_logs: &[UsageLog],
    previous_logs: &[UsageLog],
    budgets: &[Budget],
    alerts: &[Alert],
    total_users: usize,
) -> DashboardMetrics {
    let total_spend: f64 = current_logs.iter().map(|l| l.cost).sum();
    let total_requests = current_logs.len();
    let avg_cost_per_request = if total_requests > 0 {
        total_spend / total_requests as f64
    } else {
        0.0
    };

    let previous_spend: f64 = previous_logs.iter().map(|l| l.cost).sum();
    let spend_growth = if previous_spend > 0.0 {
        (total_spend - previous_spend) / previous_spend * 100.0
    } else {
        0.0
    };

    let monthly_budget = budgets
        .iter()
        .find(|b| b.is_active && b.period == BudgetPeriod::Monthly)
        .map(|b| b.amount);
    let budget_utilization = match monthly_budget {
        Some(amount) if amount > 0.0 => total_spend / amount * 100.0,
        _ => 0.0,
    };

    let providers = provider_breakdown(current_logs, total_spend, spend_growth);

    let mut active_alerts: Vec<&Alert> = alerts.iter().filter(|a| a.is_active).collect();
    active_alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    active_alerts.truncate(RECENT_ALERTS);

    let active_users = current_logs
        .iter()
        .map(|l| l.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_users = total_users.max(active_users);

    let executive_metrics = ExecutiveMetrics {
        total_spend: cents(total_spend),
        total_requests,
        monthly_budget: monthly_budget.unwrap_or(0.0),
        budget_utilization: round_to(budget_utilization, 1),
        cost_per_employee: if total_users > 0 {
            cents(total_spend / total_users as f64)
        } else {
            0.0
        },
        risk_score: active_alerts.len() as u32 * RISK_PER_ALERT,
        monthly_growth: round_to(spend_growth, 1),
        avg_cost_per_request: round_to(avg_cost_per_request, 4),
    };

    let team_metrics = TeamMetrics {
        total_users,
        active_users,
        power_users: (active_users as f64 * POWER_USER_RATIO).floor() as usize,
        avg_usage_per_user: if active_users > 0 {
            cents(total_spend / active_users as f64)
        } else {
            0.0
        },
    };

    let forecast = vec![
        ForecastRow {
            period: "Next Week",
            spend: cents(total_spend * 0.25),
            confidence: 94,
            status: "on-track",
        },
        ForecastRow {
            period: "Next Month",
            spend: cents(total_spend * 1.1),
            confidence: 87,
            status: if budget_utilization > BUDGET_ALERT_UTILIZATION {
                "over-budget"
            } else {
                "on-track"
            },
        },
        ForecastRow {
            period: "Next Quarter",
            spend: cents(total_spend * 3.2),
            confidence: 73,
            status: "on-track",
        },
    ];

    let mut insights = Vec::new();
    if budget_utilization > BUDGET_ALERT_UTILIZATION {
        let overrun = total_spend - monthly_budget.unwrap_or(0.0);
        insights.push(Insight {
            kind: "alert",
            priority: "urgent",
            title: "Budget Threshold Alert",
            description: format!(
                "On track to exceed monthly budget by {}% at current usage rate",
                (budget_utilization - 100.0).round()
            ),
            impact: format!("${} overrun", cents(overrun)),
            action: "Review and adjust",
            confidence: 94,
            timeframe: "Immediate",
            category: "budget",
        });
    }
    if let Some(top) = providers.first().filter(|p| p.share > CONCENTRATION_SHARE) {
        insights.push(Insight {
            kind: "risk",
            priority: "medium",
            title: "Vendor Concentration Risk",
            description: format!(
                "{}% of spend concentrated in {}. Consider diversification",
                top.share, top.name
            ),
            impact: "Business continuity risk".to_string(),
            action: "Diversify providers",
            confidence: 76,
            timeframe: "1-2 months",
            category: "risk-management",
        });
    }

    DashboardMetrics {
        timeframe,
        window_start: timeframe.start(now),
        executive_metrics,
        providers,
        team_metrics,
        forecast,
        insights,
        alerts: active_alerts
            .into_iter()
            .map(|a| RecentAlert {
                id: a.id.clone(),
                alert_type: a.alert_type.clone(),
                message: a.message.clone(),
                threshold: a.threshold,
                created_at: a.created_at,
            })
            .collect(),
    }
}

/// Highest spend first; equal spend falls back to provider name
fn provider_breakdown(
    logs: &[UsageLog],
    total_spend: f64,
    spend_growth: f64,
) -> Vec<ProviderMetrics> {
    let mut totals: BTreeMap<&str, ProviderTotals> = BTreeMap::new();
    for log in logs {
        let entry = totals.entry(log.provider.as_str()).or_default();
        entry.spend += log.cost;
        entry.requests += 1;
        entry.tokens = entry.tokens.saturating_add(log.total_tokens);
    }

    let mut providers: Vec<ProviderMetrics> = totals
        .into_iter()
        .map(|(name, t)| ProviderMetrics {
            id: name.to_lowercase(),
            name: name.to_string(),
            spend: cents(t.spend),
            share: if total_spend > 0.0 {
                round_to(t.spend / total_spend * 100.0, 1)
            } else {
                0.0
            },
            requests: t.requests,
            tokens: t.tokens,
            avg_cost: round_to(t.spend / t.requests as f64, 4),
            trend: if spend_growth > 0.0 { "up" } else { "down" },
            status: if t.spend > OPTIMAL_SPEND {
                "optimal"
            } else {
                "good"
            },
        })
        .collect();

    // BTreeMap iteration already orders names, and the sort is stable
    providers.sort_by(|a, b| b.spend.total_cmp(&a.spend));
    providers
}
