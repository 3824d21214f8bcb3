use super::{
    count_by_id, last_insert_rowid, name_matches, summarize, Booking, Detail,
    SearchResults, Summary,
};
use crate::error::Error;
use crate::models::{Artist, ArtistChanges, NewArtist};
use crate::schema::{artists, shows, venues};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::info;

/// Every artist ordered by id, with their upcoming show counts.
pub fn list(conn: &SqliteConnection, now: NaiveDateTime) -> Result<Vec<Summary>, Error> {
    let rows = choices(conn)?;
    let upcoming = upcoming_counts(conn, now)?;
    Ok(summarize(rows, &upcoming))
}

/// Case-insensitive substring search on the artist name. A blank term
/// matches every artist.
pub fn search(
    conn: &SqliteConnection,
    term: &str,
    now: NaiveDateTime,
) -> Result<SearchResults, Error> {
    let rows = artists::table
        .select((artists::id, artists::name))
        .order(artists::id.asc())
        .load::<(i32, String)>(conn)?
        .into_iter()
        .filter(|(_, name)| name_matches(name, term))
        .collect();
    let upcoming = upcoming_counts(conn, now)?;
    Ok(SearchResults::new(summarize(rows, &upcoming)))
}

pub fn get(conn: &SqliteConnection, id: i32) -> Result<Artist, Error> {
    artists::table
        .find(id)
        .first::<Artist>(conn)
        .optional()?
        .ok_or_else(|| Error::not_found("Artist", id))
}

/// The artist together with the venues they are booked at, split around
/// `now`.
pub fn detail(
    conn: &SqliteConnection,
    id: i32,
    now: NaiveDateTime,
) -> Result<Detail<Artist>, Error> {
    let artist = get(conn, id)?;
    let rows = shows::table
        .inner_join(venues::table)
        .filter(shows::artist_id.eq(id))
        .select((
            shows::id,
            venues::id,
            venues::name,
            venues::image_link,
            shows::start_time,
        ))
        .order((shows::start_time.asc(), shows::id.asc()))
        .load::<(i32, i32, String, Option<String>, NaiveDateTime)>(conn)?;
    let bookings = rows
        .into_iter()
        .map(|(show_id, venue_id, venue_name, venue_image_link, start_time)| Booking {
            show_id,
            counterpart_id: venue_id,
            counterpart_name: venue_name,
            counterpart_image_link: venue_image_link,
            start_time,
        })
        .collect();
    Ok(Detail::split(artist, bookings, now))
}

pub fn create(conn: &SqliteConnection, new_artist: &NewArtist) -> Result<Artist, Error> {
    let artist = conn.transaction::<_, Error, _>(|| {
        diesel::insert_into(artists::table)
            .values(new_artist)
            .execute(conn)?;
        let id = diesel::select(last_insert_rowid).get_result::<i32>(conn)?;
        get(conn, id)
    })?;
    info!(id = artist.id, name = artist.name.as_str(), "artist listed");
    Ok(artist)
}

pub fn update(
    conn: &SqliteConnection,
    id: i32,
    changes: &ArtistChanges,
) -> Result<Artist, Error> {
    conn.transaction::<_, Error, _>(|| {
        let artist = get(conn, id)?;
        if changes.is_empty() {
            return Ok(artist);
        }
        diesel::update(&artist).set(changes).execute(conn)?;
        info!(id, "artist updated");
        get(conn, id)
    })
}

/// Deletes the artist and all of their shows. Returns `false` when no artist
/// has this id.
pub fn delete(conn: &SqliteConnection, id: i32) -> Result<bool, Error> {
    conn.transaction::<_, Error, _>(|| {
        let artist = match get(conn, id) {
            Ok(artist) => artist,
            Err(Error::NotFound { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        let cancelled =
            diesel::delete(shows::table.filter(shows::artist_id.eq(id))).execute(conn)?;
        diesel::delete(&artist).execute(conn)?;
        info!(id, cancelled = cancelled as u64, "artist deleted");
        Ok(true)
    })
}

pub fn choices(conn: &SqliteConnection) -> Result<Vec<(i32, String)>, Error> {
    Ok(artists::table
        .select((artists::id, artists::name))
        .order(artists::id.asc())
        .load::<(i32, String)>(conn)?)
}

fn upcoming_counts(
    conn: &SqliteConnection,
    now: NaiveDateTime,
) -> Result<HashMap<i32, usize>, Error> {
    let artist_ids = shows::table
        .filter(shows::start_time.gt(now))
        .select(shows::artist_id)
        .load::<i32>(conn)?;
    Ok(count_by_id(artist_ids))
}
