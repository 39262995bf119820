pub mod day_off_repository;
pub mod holiday_repository;
pub mod project_repository;
pub mod timesheet_repository;
pub mod user_repository;

pub use day_off_repository::{DayOffRepository, DayOffRepositoryTrait};
pub use holiday_repository::{HolidayRepository, HolidayRepositoryTrait};
pub use project_repository::{ProjectRepository, ProjectRepositoryTrait};
pub use timesheet_repository::{TimesheetRepository, TimesheetRepositoryTrait};
pub use user_repository::{UserRepository, UserRepositoryTrait};
