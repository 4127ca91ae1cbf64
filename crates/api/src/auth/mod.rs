//! Admin credentials: Argon2id password checks ([`password`]) and HS256
//! access tokens ([`jwt`]).

pub mod jwt;
pub mod password;
