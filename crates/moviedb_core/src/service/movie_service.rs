//! Movie cache use-case service.
//!
//! # Responsibility
//! - Provide listing refresh and favorite pin/unpin flows on top of the
//!   repository contract.
//! - Keep flag writes verifiable through read-back checks.
//!
//! # Invariants
//! - `refresh_category` purges before storing, so stale non-favorite rows
//!   never outlive a refresh.
//! - Favorite writes are confirmed by reading the flag back; a mismatch is
//!   a typed inconsistency error.

use crate::model::movie::{Category, Movie, MovieId};
use crate::repo::movie_repo::{Lookup, MovieRepository, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for movie cache use-cases.
#[derive(Debug)]
pub enum MovieServiceError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Favorite flag read-back did not match the requested state.
    FavoriteNotPersisted { id: MovieId, expected: bool },
}

impl Display for MovieServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::FavoriteNotPersisted { id, expected } => write!(
                f,
                "favorite flag for movie {id} read back as {} after writing {expected}",
                !expected
            ),
        }
    }
}

impl Error for MovieServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::FavoriteNotPersisted { .. } => None,
        }
    }
}

impl From<RepoError> for MovieServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of one category refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Non-favorite rows deleted before storing.
    pub purged: usize,
    /// Fetched records written through the upsert path.
    pub stored: usize,
}

/// Use-case facade over movie repository implementations.
pub struct MovieService<R: MovieRepository> {
    repo: R,
}

impl<R: MovieRepository> MovieService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads cached rows for one listing category.
    pub fn movies_by_category(&self, category: Category) -> RepoResult<Lookup> {
        self.repo.movies_by_category(category)
    }

    /// Reads all favorite rows across categories.
    pub fn favorites(&self) -> RepoResult<Lookup> {
        self.repo.favorites()
    }

    /// Returns whether the id is currently pinned.
    pub fn is_favorite(&self, id: MovieId) -> RepoResult<bool> {
        self.repo.is_favorite(id)
    }

    /// Replaces the cached listing with freshly fetched records.
    ///
    /// # Contract
    /// - Non-favorite rows of the category are purged first.
    /// - Every fetched record is stored through the upsert path, so pinned
    ///   rows re-fetched by the listing keep their category tag.
    pub fn refresh_category(
        &self,
        category: Category,
        fetched: &[Movie],
    ) -> Result<RefreshSummary, MovieServiceError> {
        let purged = self.repo.purge_category(category)?;
        for movie in fetched {
            self.repo.upsert_movie(category, movie)?;
        }

        Ok(RefreshSummary {
            purged,
            stored: fetched.len(),
        })
    }

    /// Pins one record and confirms the flag was persisted.
    pub fn set_favorite(
        &self,
        category: Category,
        movie: &Movie,
    ) -> Result<(), MovieServiceError> {
        let mut pinned = movie.clone();
        pinned.mark_favorite();
        self.write_favorite(category, &pinned, true)
    }

    /// Unpins one record, making it purgeable again, and confirms the flag
    /// was persisted.
    pub fn clear_favorite(
        &self,
        category: Category,
        movie: &Movie,
    ) -> Result<(), MovieServiceError> {
        let mut released = movie.clone();
        released.clear_favorite();
        self.write_favorite(category, &released, false)
    }

    fn write_favorite(
        &self,
        category: Category,
        movie: &Movie,
        expected: bool,
    ) -> Result<(), MovieServiceError> {
        self.repo.set_favorite(category, movie)?;
        if self.repo.is_favorite(movie.id)? != expected {
            return Err(MovieServiceError::FavoriteNotPersisted {
                id: movie.id,
                expected,
            });
        }
        Ok(())
    }
}
