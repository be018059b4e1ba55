//! Data models

pub mod clinical;
pub mod assessment;
pub mod wearable;

pub use clinical::*;
pub use assessment::*;
pub use wearable::*;
