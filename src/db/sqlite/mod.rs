//! SQLite implementation of the database traits.
//!
//! This module provides a SQLx-backed implementation of the repository
//! traits defined in the parent module.

mod api_key;
mod connection;
mod family;
mod helpers;
mod member;
mod schedule;
mod shared_list;
mod subscription;
mod task;

#[cfg(test)]
mod connection_test;

pub use api_key::SqliteApiKeyRepository;
pub use connection::SqliteDatabase;
pub use family::SqliteFamilyRepository;
pub use member::SqliteMemberRepository;
pub use schedule::SqliteScheduleRepository;
pub use shared_list::SqliteSharedListRepository;
pub use subscription::SqliteSubscriptionRepository;
pub use task::SqliteTaskRepository;
