use std::sync::Arc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::evaluation::EvaluationSchema;
use crate::services::analytics_service::AnalyticsService;
use crate::services::developer_service::DeveloperService;
use crate::services::report_service::ReportService;
use crate::services::team_service::TeamService;

/// Explicit service container handed to the embedding shell. Constructed
/// once at startup from an injected pool; there is no process-wide mutable
/// store behind it.
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    team_service: Arc<TeamService>,
    developer_service: Arc<DeveloperService>,
    report_service: Arc<ReportService>,
    analytics_service: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        let schema = EvaluationSchema::builtin();

        let team_service = Arc::new(TeamService::new(db_pool.clone()));
        let developer_service = Arc::new(DeveloperService::new(db_pool.clone()));
        let report_service = Arc::new(ReportService::new(db_pool.clone(), schema.clone())?);
        let analytics_service = Arc::new(AnalyticsService::new(db_pool.clone(), schema.clone())?);

        Ok(Self {
            db_pool,
            team_service,
            developer_service,
            report_service,
            analytics_service,
        })
    }

    pub fn teams(&self) -> Arc<TeamService> {
        Arc::clone(&self.team_service)
    }

    pub fn developers(&self) -> Arc<DeveloperService> {
        Arc::clone(&self.developer_service)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics_service)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }
}
