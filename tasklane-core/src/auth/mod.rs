/// Authentication primitives
///
/// JWT session tokens and Argon2id password hashing. The identity service
/// composes these; nothing here touches storage.

pub mod jwt;
pub mod password;
