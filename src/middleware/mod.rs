//! Request extractors

pub mod clinical;
