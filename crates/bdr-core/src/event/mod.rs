//! Inbound event handling: delivery parsing and normalization.

pub mod normalize;

pub use normalize::{NormalizedBatch, RawEvent, normalize, normalize_delivery, parse_delivery};
