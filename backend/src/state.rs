use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::{
    DayOffRepository, HolidayRepository, HolidayRepositoryTrait, ProjectRepository,
    ProjectRepositoryTrait, TimesheetRepository, UserRepository, UserRepositoryTrait,
};
use crate::services::{DayOffService, TimesheetService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepositoryTrait>,
    pub projects: Arc<dyn ProjectRepositoryTrait>,
    pub holidays: Arc<dyn HolidayRepositoryTrait>,
    pub timesheets: TimesheetService,
    pub day_offs: DayOffService,
}

impl AppState {
    /// Wires the Postgres-backed repositories and the engine services.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let users: Arc<dyn UserRepositoryTrait> = Arc::new(UserRepository::new(pool.clone()));
        let projects: Arc<dyn ProjectRepositoryTrait> =
            Arc::new(ProjectRepository::new(pool.clone()));
        let holidays: Arc<dyn HolidayRepositoryTrait> =
            Arc::new(HolidayRepository::new(pool.clone()));
        let timesheet_repo = Arc::new(TimesheetRepository::new(pool.clone()));
        let day_off_repo = Arc::new(DayOffRepository::new(pool));

        let timesheets = TimesheetService::new(
            timesheet_repo,
            day_off_repo.clone(),
            projects.clone(),
            holidays.clone(),
            config.time_zone,
        );
        let day_offs = DayOffService::new(day_off_repo, config.time_zone);

        Self {
            config,
            users,
            projects,
            holidays,
            timesheets,
            day_offs,
        }
    }
}
