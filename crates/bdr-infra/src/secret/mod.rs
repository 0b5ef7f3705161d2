//! Credential resolution.
//!
//! API keys and tokens come from the environment only. They are held as
//! [`secrecy::SecretString`] and exposed solely when building request headers.

pub mod env;

pub use env::Credentials;
