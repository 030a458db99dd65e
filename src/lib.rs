pub mod api;
pub mod calendar;
pub mod cli;
pub mod db;
pub mod mcp;
pub mod paths;
pub mod schedule;
pub mod serde_utils;

#[cfg(test)]
mod test_support;
