//! Usage tracking infrastructure

mod service;
mod storage_repository;

pub use service::{
    CreateAlertRequest, CreateBudgetRequest, ProviderUsage, RecordUsageRequest, UsageFilter,
    UsageReport, UsageService, UsageSummary,
};
pub use storage_repository::{
    StorageAlertRepository, StorageBudgetRepository, StorageUsageLogRepository,
};
