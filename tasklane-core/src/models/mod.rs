/// Domain models
///
/// Plain persisted rows plus the staged-insert inputs for each of them.
/// Rows carry both a surrogate key (store-internal) and a public id; only
/// the public id ever crosses the service boundary.
///
/// # Models
///
/// - `user`: identity records with hashed credentials
/// - `task`: the aggregate root and its status/priority enums
/// - `assignment`: the append-only assignment audit log

pub mod assignment;
pub mod task;
pub mod user;
