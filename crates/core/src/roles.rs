//! Well-known role name constants.
//!
//! These must match the `role` values written to the `users` table.

pub const ROLE_ADMIN: &str = "admin";
