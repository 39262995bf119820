pub mod day_offs;
pub mod holidays;
pub mod projects;
pub mod timesheets;
