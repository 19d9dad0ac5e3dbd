//! Domain model for cached movie listings.
//!
//! # Responsibility
//! - Define the canonical record shared by listing and favorites reads.
//! - Keep payload-shape concerns (serde naming, defaults) in one place.
//!
//! # Invariants
//! - Every record is identified by the remote `MovieId` natural key.
//! - Category tags form a closed set mirrored in the `movies.type` column.

pub mod movie;
