//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `moviedb_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use moviedb_core::db::open_db_in_memory;
use moviedb_core::{Category, Lookup, Movie, MovieService, SqliteMovieRepository};

fn main() {
    println!("moviedb_core version={}", moviedb_core::core_version());

    if let Err(err) = smoke_cycle() {
        eprintln!("smoke cycle failed: {err}");
        std::process::exit(1);
    }
}

// One write/read cycle against a throwaway in-memory store.
fn smoke_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let repo = SqliteMovieRepository::try_new(&conn)?;
    let service = MovieService::new(repo);

    let mut probe = Movie::new(1, "smoke reel");
    probe.rate_avg = 7.5;
    let summary = service.refresh_category(Category::Popular, std::slice::from_ref(&probe))?;
    println!("refresh purged={} stored={}", summary.purged, summary.stored);

    match service.movies_by_category(Category::Popular)? {
        Lookup::Found(movies) => println!("cached popular rows={}", movies.len()),
        Lookup::NotAvailable => println!("cached popular rows=0"),
    }

    Ok(())
}
