//! Query and update operations over venues, artists and shows.
//!
//! Every operation takes an open connection and returns plain data. Writes
//! run inside a single transaction, so a failure leaves nothing behind.

use chrono::NaiveDateTime;
use diesel::sql_types::Integer;
use std::collections::HashMap;

pub mod artists;
pub mod shows;
pub mod venues;

no_arg_sql_function!(last_insert_rowid, Integer);

/// A venue or artist as it appears in lists and search results.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<Summary>,
}

impl SearchResults {
    fn new(data: Vec<Summary>) -> SearchResults {
        SearchResults {
            count: data.len(),
            data,
        }
    }
}

/// One show, seen from the other side of the booking: the artist playing at
/// a venue, or the venue an artist plays at.
#[derive(Clone, Debug, PartialEq)]
pub struct Booking {
    pub show_id: i32,
    pub counterpart_id: i32,
    pub counterpart_name: String,
    pub counterpart_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Detail<T> {
    pub entity: T,
    pub past_shows: Vec<Booking>,
    pub upcoming_shows: Vec<Booking>,
}

impl<T> Detail<T> {
    /// Splits bookings around `now`; a show starting exactly at `now` counts
    /// as upcoming.
    fn split(entity: T, bookings: Vec<Booking>, now: NaiveDateTime) -> Detail<T> {
        let (past_shows, upcoming_shows) = bookings
            .into_iter()
            .partition(|booking| booking.start_time < now);
        Detail {
            entity,
            past_shows,
            upcoming_shows,
        }
    }
}

/// Case-insensitive substring match with Unicode case folding on both sides;
/// SQLite's `lower()` only folds ASCII. A blank term matches every name.
fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.trim().to_lowercase())
}

fn count_by_id(ids: Vec<i32>) -> HashMap<i32, usize> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

fn summarize(
    rows: Vec<(i32, String)>,
    upcoming: &HashMap<i32, usize>,
) -> Vec<Summary> {
    rows.into_iter()
        .map(|(id, name)| Summary {
            num_upcoming_shows: upcoming.get(&id).cloned().unwrap_or(0),
            id,
            name,
        })
        .collect()
}
