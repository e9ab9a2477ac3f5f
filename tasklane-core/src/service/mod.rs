/// Application services
///
/// The services own all business rules; stores persist, adapters
/// translate. Each service holds an `Arc<dyn Store>` and stages its writes
/// into a unit of work, so the same code runs against Postgres and the
/// in-memory backend.

pub mod assignments;
pub mod dto;
pub mod identity;
pub mod query;
pub mod tasks;
