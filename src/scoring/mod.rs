//! Engagement scoring and recommendations.

pub mod engagement;
pub mod recommend;

pub use engagement::{Check, EngagementScorer};
pub use recommend::{notes, recommend};
