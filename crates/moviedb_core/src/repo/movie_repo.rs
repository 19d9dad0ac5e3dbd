//! Movie repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide category/favorite read and upsert/purge write APIs over the
//!   `movies` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - At most one row per movie id; the id is the conflict target for
//!   every upsert.
//! - A row keeps the category tag it was first stored under; conflicts
//!   update every other field.
//! - Purges never remove favorite rows.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::movie::{Category, Movie, MovieId, MovieValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MOVIE_SELECT_SQL: &str = "SELECT
    id,
    title,
    poster,
    overview,
    rate_avg,
    favorite,
    release_date,
    type
FROM movies";

const MOVIES_TABLE: &str = "movies";
const MOVIES_COLUMNS: &[&str] = &[
    "id",
    "title",
    "poster",
    "overview",
    "rate_avg",
    "favorite",
    "release_date",
    "type",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for movie persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MovieValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted movie data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MovieValidationError> for RepoError {
    fn from(value: MovieValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read outcome distinguishing cached rows from an empty cache.
///
/// Zero matching rows read as `NotAvailable` rather than an empty list,
/// so callers can fall back to the remote source.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Vec<Movie>),
    NotAvailable,
}

impl Lookup {
    /// Converts the outcome into an optional row list.
    pub fn into_option(self) -> Option<Vec<Movie>> {
        match self {
            Self::Found(movies) => Some(movies),
            Self::NotAvailable => None,
        }
    }

    /// Returns whether any cached rows were found.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    fn from_rows(movies: Vec<Movie>) -> Self {
        if movies.is_empty() {
            Self::NotAvailable
        } else {
            Self::Found(movies)
        }
    }
}

/// Repository interface for movie cache operations.
pub trait MovieRepository {
    /// Reads all rows tagged with the category. `top_rated` reads are
    /// ordered by rating descending; other categories carry no ordering
    /// guarantee.
    fn movies_by_category(&self, category: Category) -> RepoResult<Lookup>;
    /// Inserts a row keyed by movie id under the given category tag; on
    /// conflict updates every field except the tag.
    fn upsert_movie(&self, category: Category, movie: &Movie) -> RepoResult<()>;
    /// Deletes all non-favorite rows of the category and returns the
    /// deleted row count.
    fn purge_category(&self, category: Category) -> RepoResult<usize>;
    /// Returns whether a row with the id exists with the favorite flag set.
    fn is_favorite(&self, id: MovieId) -> RepoResult<bool>;
    /// Persists the record's favorite flag through the upsert path.
    fn set_favorite(&self, category: Category, movie: &Movie) -> RepoResult<()>;
    /// Reads all favorite rows, one per id, ordered by id ascending.
    fn favorites(&self) -> RepoResult<Lookup>;
}

/// SQLite-backed movie repository.
///
/// Holds a caller-owned connection; the repository never opens or closes
/// storage on its own.
pub struct SqliteMovieRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMovieRepository<'conn> {
    /// Constructs a repository after verifying the connection is migrated
    /// and the `movies` table carries the expected columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MovieRepository for SqliteMovieRepository<'_> {
    fn movies_by_category(&self, category: Category) -> RepoResult<Lookup> {
        let mut sql = format!("{MOVIE_SELECT_SQL} WHERE type = ?1");
        if category == Category::TopRated {
            sql.push_str(" ORDER BY rate_avg DESC");
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([category.as_db_str()])?;
        let mut movies = Vec::new();
        while let Some(row) = rows.next()? {
            movies.push(parse_movie_row(row)?);
        }

        Ok(Lookup::from_rows(movies))
    }

    fn upsert_movie(&self, category: Category, movie: &Movie) -> RepoResult<()> {
        movie.validate()?;

        // type is absent from the update list: a row keeps the listing it
        // was first cached under.
        self.conn.execute(
            "INSERT INTO movies (
                id,
                title,
                poster,
                overview,
                rate_avg,
                favorite,
                release_date,
                type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                poster = excluded.poster,
                overview = excluded.overview,
                rate_avg = excluded.rate_avg,
                favorite = excluded.favorite,
                release_date = excluded.release_date;",
            params![
                movie.id,
                movie.title.as_str(),
                movie.poster.as_deref(),
                movie.overview.as_deref(),
                movie.rate_avg,
                bool_to_int(movie.favorite),
                movie.release_date.as_deref(),
                category.as_db_str(),
            ],
        )?;

        Ok(())
    }

    fn purge_category(&self, category: Category) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM movies WHERE type = ?1 AND favorite = 0;",
            [category.as_db_str()],
        )?;
        Ok(deleted)
    }

    fn is_favorite(&self, id: MovieId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM movies
                WHERE id = ?1 AND favorite = 1
            );",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn set_favorite(&self, category: Category, movie: &Movie) -> RepoResult<()> {
        self.upsert_movie(category, movie)
    }

    fn favorites(&self) -> RepoResult<Lookup> {
        // id is the primary key; one row per favorite by construction.
        let mut stmt = self
            .conn
            .prepare(&format!("{MOVIE_SELECT_SQL} WHERE favorite = 1 ORDER BY id ASC"))?;
        let mut rows = stmt.query([])?;
        let mut movies = Vec::new();
        while let Some(row) = rows.next()? {
            movies.push(parse_movie_row(row)?);
        }

        Ok(Lookup::from_rows(movies))
    }
}

fn parse_movie_row(row: &Row<'_>) -> RepoResult<Movie> {
    let type_text: String = row.get("type")?;
    let category = Category::parse_db_str(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid category tag `{type_text}` in movies.type"))
    })?;

    let favorite = match row.get::<_, i64>("favorite")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid favorite value `{other}` in movies.favorite"
            )));
        }
    };

    Ok(Movie {
        id: row.get("id")?,
        title: row.get("title")?,
        poster: row.get("poster")?,
        overview: row.get("overview")?,
        rate_avg: row.get("rate_avg")?,
        release_date: row.get("release_date")?,
        favorite,
        category,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, MOVIES_TABLE)? {
        return Err(RepoError::MissingRequiredTable(MOVIES_TABLE));
    }

    for &column in MOVIES_COLUMNS {
        if !table_has_column(conn, MOVIES_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: MOVIES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
