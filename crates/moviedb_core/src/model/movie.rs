//! Movie domain model.
//!
//! # Responsibility
//! - Define the canonical record cached from remote listing endpoints.
//! - Validate remote payload fields before they reach persistence.
//!
//! # Invariants
//! - `id` is the natural key assigned by the remote API and is never
//!   generated locally.
//! - `favorite` is the source of truth for purge exemption.
//! - `release_date` is `YYYY-MM-DD` when present.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static RELEASE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid release date regex"));

const RATING_MAX: f64 = 10.0;

/// Stable identifier for one cached movie.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type MovieId = i64;

/// Remote listing a cached row was fetched from.
///
/// The tag partitions the cache: each row belongs to exactly one listing,
/// decided when the row is first stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Currently popular listing. Fallback tag for untagged payloads.
    #[default]
    Popular,
    /// All-time top rated listing.
    TopRated,
    /// Currently in theatres.
    NowPlaying,
    /// Announced for future release.
    Upcoming,
}

impl Category {
    /// Tag value stored in the `movies.type` column.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::NowPlaying => "now_playing",
            Self::Upcoming => "upcoming",
        }
    }

    /// Parses a stored tag value back into a category.
    pub fn parse_db_str(value: &str) -> Option<Self> {
        match value {
            "popular" => Some(Self::Popular),
            "top_rated" => Some(Self::TopRated),
            "now_playing" => Some(Self::NowPlaying),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Field-level validation failure for movie records.
#[derive(Debug)]
pub enum MovieValidationError {
    /// Remote ids are strictly positive.
    NonPositiveId(MovieId),
    /// Title must carry at least one non-whitespace character.
    EmptyTitle,
    /// Average rating must stay within the remote 0..=10 scale.
    RatingOutOfRange(f64),
    /// Release date must be `YYYY-MM-DD` when present.
    MalformedReleaseDate(String),
}

impl Display for MovieValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "movie id must be positive, got {id}"),
            Self::EmptyTitle => write!(f, "movie title cannot be empty"),
            Self::RatingOutOfRange(value) => {
                write!(f, "average rating {value} outside 0..={RATING_MAX}")
            }
            Self::MalformedReleaseDate(value) => {
                write!(f, "release date `{value}` is not YYYY-MM-DD")
            }
        }
    }
}

impl Error for MovieValidationError {}

/// Canonical cached movie record.
///
/// Field names and defaults follow the remote listing payload, so one
/// `serde` shape covers both the API response and local persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Natural key from the remote API.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Poster path relative to the remote image host.
    #[serde(rename = "poster_path", default)]
    pub poster: Option<String>,
    /// Plot summary.
    #[serde(default)]
    pub overview: Option<String>,
    /// Average rating on the remote 0..=10 scale.
    #[serde(rename = "vote_average", default)]
    pub rate_avg: f64,
    /// Release date, `YYYY-MM-DD` when present.
    #[serde(default)]
    pub release_date: Option<String>,
    /// User-pinned flag. Favorite rows survive cache purges.
    #[serde(default)]
    pub favorite: bool,
    /// Serialized as `type` to match the stored column naming.
    #[serde(rename = "type", default)]
    pub category: Category,
}

impl Movie {
    /// Creates a record with remote identity and title, other fields at
    /// their payload defaults.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster: None,
            overview: None,
            rate_avg: 0.0,
            release_date: None,
            favorite: false,
            category: Category::default(),
        }
    }

    /// Pins this record so purges leave it in place.
    pub fn mark_favorite(&mut self) {
        self.favorite = true;
    }

    /// Releases the pin, making the record purgeable again.
    pub fn clear_favorite(&mut self) {
        self.favorite = false;
    }

    /// Checks field invariants prior to persistence.
    ///
    /// # Errors
    /// - Non-positive id, blank title, rating outside `0..=10` (NaN
    ///   included), malformed release date.
    pub fn validate(&self) -> Result<(), MovieValidationError> {
        if self.id <= 0 {
            return Err(MovieValidationError::NonPositiveId(self.id));
        }
        if self.title.trim().is_empty() {
            return Err(MovieValidationError::EmptyTitle);
        }
        if !(0.0..=RATING_MAX).contains(&self.rate_avg) {
            return Err(MovieValidationError::RatingOutOfRange(self.rate_avg));
        }
        if let Some(date) = self.release_date.as_deref() {
            if !RELEASE_DATE_RE.is_match(date) {
                return Err(MovieValidationError::MalformedReleaseDate(date.to_string()));
            }
        }
        Ok(())
    }
}
