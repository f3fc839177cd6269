//! Password hashing and strength policy

mod password;

pub use password::{hash_password, Argon2PasswordHasher, PasswordPolicy};
