//! Authentication: JWT middleware and password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Principal, auth_middleware, create_token};
pub use password::{hash_if_needed, hash_password, is_bcrypt_hash, verify_password};
