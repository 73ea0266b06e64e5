//! Scalar data model.
//!
//! # Core Concepts
//!
//! - [`ScalarLevel`]: the five tiers of a course scalar (CLO, Topic, Subtopic, Lesson,
//!   Performance Criteria). Each level is an independent partition with its own
//!   numbering space.
//! - [`ScalarEntry`]: one item at a level, addressed by its `serial`.
//! - [`ScalarCollection`]: every entry of one course. Owns level-scoped operations
//!   (ordering, renumbering) and the plain list-of-mappings storage form.

mod collection;
mod entry;
mod level;

pub use collection::*;
pub use entry::*;
pub use level::*;
