//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the movie cache.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Movie::validate()` before persistence.
//! - Write failures surface as `RepoError`; they are never swallowed.

pub mod movie_repo;
