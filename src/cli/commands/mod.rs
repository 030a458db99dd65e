pub mod calendar;
pub mod list;
pub mod schedule;
pub mod task;

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

#[cfg(test)]
#[path = "calendar_test.rs"]
mod calendar_test;

#[cfg(test)]
#[path = "task_test.rs"]
mod task_test;

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;
