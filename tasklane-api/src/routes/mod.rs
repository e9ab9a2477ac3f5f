/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login)
/// - `users`: User read endpoints
/// - `tasks`: Task lifecycle endpoints
/// - `assignments`: Assignment audit log endpoints

pub mod assignments;
pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
