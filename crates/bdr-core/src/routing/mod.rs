//! Event-to-workflow routing.

pub mod router;

pub use router::{Router, resolve};
