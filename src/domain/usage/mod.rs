//! Usage logs, budgets and alerts, and the dashboard metrics derived from them

mod alert;
mod budget;
mod dashboard;
mod log;
mod repository;

pub use alert::Alert;
pub use budget::{Budget, BudgetPeriod};
pub use dashboard::{
    DashboardMetrics, ExecutiveMetrics, ForecastRow, Insight, ProviderMetrics, RecentAlert,
    TeamMetrics, Timeframe, compute_dashboard_metrics,
};
pub use log::UsageLog;
pub use repository::{AlertRepository, BudgetRepository, UsageLogRepository, UsageQuery};
