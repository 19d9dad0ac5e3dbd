use moviedb_core::db::migrations::latest_version;
use moviedb_core::db::open_db_in_memory;
use moviedb_core::{
    Category, Lookup, Movie, MovieRepository, RepoError, SqliteMovieRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

#[test]
fn upsert_creates_single_row_and_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    let mut movie = Movie::new(550, "Fight Club");
    movie.poster = Some("/fight_club.jpg".to_string());
    movie.overview = Some("An insomniac office worker.".to_string());
    movie.rate_avg = 8.4;
    movie.release_date = Some("1999-10-15".to_string());
    repo.upsert_movie(Category::Popular, &movie).unwrap();

    let movies = repo
        .movies_by_category(Category::Popular)
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, 550);
    assert_eq!(movies[0].title, "Fight Club");
    assert_eq!(movies[0].poster.as_deref(), Some("/fight_club.jpg"));
    assert_eq!(movies[0].rate_avg, 8.4);
    assert_eq!(movies[0].release_date.as_deref(), Some("1999-10-15"));
    assert_eq!(movies[0].category, Category::Popular);
    assert!(!movies[0].favorite);
}

#[test]
fn upsert_same_id_updates_fields_but_keeps_category() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    let mut movie = Movie::new(11, "Star Wars");
    movie.rate_avg = 6.0;
    repo.upsert_movie(Category::Popular, &movie).unwrap();

    movie.title = "Star Wars: A New Hope".to_string();
    movie.rate_avg = 8.8;
    repo.upsert_movie(Category::TopRated, &movie).unwrap();

    // The row stays under its first listing with refreshed fields.
    assert_eq!(
        repo.movies_by_category(Category::TopRated).unwrap(),
        Lookup::NotAvailable
    );
    let movies = repo
        .movies_by_category(Category::Popular)
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Star Wars: A New Hope");
    assert_eq!(movies[0].rate_avg, 8.8);
    assert_eq!(movies[0].category, Category::Popular);
}

#[test]
fn top_rated_reads_sorted_by_rating_descending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    repo.upsert_movie(Category::TopRated, &rated_movie(1, "low", 5.1))
        .unwrap();
    repo.upsert_movie(Category::TopRated, &rated_movie(2, "high", 9.2))
        .unwrap();
    repo.upsert_movie(Category::TopRated, &rated_movie(3, "mid", 7.4))
        .unwrap();

    let movies = repo
        .movies_by_category(Category::TopRated)
        .unwrap()
        .into_option()
        .unwrap();
    let ids: Vec<i64> = movies.iter().map(|movie| movie.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[test]
fn other_categories_return_all_rows_without_ordering_contract() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    repo.upsert_movie(Category::NowPlaying, &rated_movie(7, "a", 3.0))
        .unwrap();
    repo.upsert_movie(Category::NowPlaying, &rated_movie(8, "b", 9.0))
        .unwrap();

    let movies = repo
        .movies_by_category(Category::NowPlaying)
        .unwrap()
        .into_option()
        .unwrap();
    let ids: HashSet<i64> = movies.iter().map(|movie| movie.id).collect();
    assert_eq!(ids, HashSet::from([7, 8]));
}

#[test]
fn empty_category_reads_as_not_available() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    repo.upsert_movie(Category::Popular, &rated_movie(1, "elsewhere", 5.0))
        .unwrap();

    let lookup = repo.movies_by_category(Category::Upcoming).unwrap();
    assert_eq!(lookup, Lookup::NotAvailable);
    assert!(!lookup.is_available());
}

#[test]
fn purge_removes_only_non_favorites_of_the_category() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    let mut pinned = rated_movie(1, "pinned", 6.0);
    pinned.mark_favorite();
    repo.upsert_movie(Category::Popular, &pinned).unwrap();
    repo.upsert_movie(Category::Popular, &rated_movie(2, "stale", 5.0))
        .unwrap();
    repo.upsert_movie(Category::Popular, &rated_movie(3, "stale too", 4.0))
        .unwrap();
    repo.upsert_movie(Category::TopRated, &rated_movie(4, "other listing", 9.0))
        .unwrap();

    let purged = repo.purge_category(Category::Popular).unwrap();
    assert_eq!(purged, 2);

    let remaining = repo
        .movies_by_category(Category::Popular)
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, 1);
    assert!(remaining[0].favorite);

    // Rows of other categories are untouched.
    assert!(repo.movies_by_category(Category::TopRated).unwrap().is_available());
}

#[test]
fn validation_failure_blocks_upsert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMovieRepository::try_new(&conn).unwrap();

    let mut overrated = rated_movie(1, "overrated", 11.0);
    let err = repo.upsert_movie(Category::Popular, &overrated).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    overrated.rate_avg = 9.0;
    overrated.title = "   ".to_string();
    let err = repo.upsert_movie(Category::Popular, &overrated).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(
        repo.movies_by_category(Category::Popular).unwrap(),
        Lookup::NotAvailable
    );
}

#[test]
fn read_rejects_invalid_persisted_favorite_value() {
    let conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteMovieRepository::try_new(&conn).unwrap();
        repo.upsert_movie(Category::Popular, &rated_movie(1, "tampered", 5.0))
            .unwrap();
    }
    conn.execute("UPDATE movies SET favorite = 7 WHERE id = 1;", [])
        .unwrap();

    let repo = SqliteMovieRepository::try_new(&conn).unwrap();
    let err = repo.movies_by_category(Category::Popular).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn read_rejects_unknown_persisted_category_tag() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO movies (id, title, rate_avg, favorite, type)
         VALUES (1, 'mystery listing', 5.0, 1, 'bogus');",
        [],
    )
    .unwrap();

    let repo = SqliteMovieRepository::try_new(&conn).unwrap();
    let err = repo.favorites().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteMovieRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_movies_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteMovieRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("movies"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_movies_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE movies (
            id INTEGER PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            poster TEXT,
            overview TEXT
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteMovieRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "movies",
            column: "rate_avg"
        })
    ));
}

fn rated_movie(id: i64, title: &str, rate_avg: f64) -> Movie {
    let mut movie = Movie::new(id, title);
    movie.rate_avg = rate_avg;
    movie
}
