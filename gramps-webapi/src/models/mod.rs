//! Data models for family tree entities.

mod researcher;
mod tree;

pub use researcher::Researcher;
pub use tree::TreeInfo;
