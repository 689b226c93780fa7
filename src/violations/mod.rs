//! Weather minimums rule checks
//!
//! Each measurement type gets a `violates` check that normalises its own
//! units (statute miles for visibility, knots for wind, feet for cloud
//! heights) before comparing. The classifier combines the three checks
//! into a single label per takeoff.

pub mod ceiling;
pub mod classifier;
pub mod visibility;
pub mod wind;

pub use classifier::{ViolationFlags, classify};
pub use wind::WindKnots;
