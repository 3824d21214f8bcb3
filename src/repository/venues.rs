use super::{
    count_by_id, last_insert_rowid, name_matches, summarize, Booking, Detail,
    SearchResults, Summary,
};
use crate::error::Error;
use crate::models::{NewVenue, Venue, VenueChanges};
use crate::schema::{artists, shows, venues};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::info;

/// Venues sharing one (city, state) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<Summary>,
}

/// All venues grouped by location. Groups appear in the order their first
/// venue was created; venues are ordered by id within a group.
pub fn list_grouped_by_location(
    conn: &SqliteConnection,
    now: NaiveDateTime,
) -> Result<Vec<Area>, Error> {
    let rows = venues::table
        .select((venues::id, venues::name, venues::city, venues::state))
        .order(venues::id.asc())
        .load::<(i32, String, String, String)>(conn)?;
    let upcoming = upcoming_counts(conn, now)?;

    let mut areas: Vec<Area> = Vec::new();
    for (id, name, city, state) in rows {
        let summary = Summary {
            num_upcoming_shows: upcoming.get(&id).cloned().unwrap_or(0),
            id,
            name,
        };
        match areas
            .iter_mut()
            .find(|area| area.city == city && area.state == state)
        {
            Some(area) => area.venues.push(summary),
            None => areas.push(Area {
                city,
                state,
                venues: vec![summary],
            }),
        }
    }
    Ok(areas)
}

/// Case-insensitive substring search on the venue name. A blank term matches
/// every venue.
pub fn search(
    conn: &SqliteConnection,
    term: &str,
    now: NaiveDateTime,
) -> Result<SearchResults, Error> {
    let rows = venues::table
        .select((venues::id, venues::name))
        .order(venues::id.asc())
        .load::<(i32, String)>(conn)?
        .into_iter()
        .filter(|(_, name)| name_matches(name, term))
        .collect();
    let upcoming = upcoming_counts(conn, now)?;
    Ok(SearchResults::new(summarize(rows, &upcoming)))
}

pub fn get(conn: &SqliteConnection, id: i32) -> Result<Venue, Error> {
    venues::table
        .find(id)
        .first::<Venue>(conn)
        .optional()?
        .ok_or_else(|| Error::not_found("Venue", id))
}

/// The venue together with the artists booked there, split around `now`.
pub fn detail(
    conn: &SqliteConnection,
    id: i32,
    now: NaiveDateTime,
) -> Result<Detail<Venue>, Error> {
    let venue = get(conn, id)?;
    let bookings = shows::table
        .inner_join(artists::table)
        .filter(shows::venue_id.eq(id))
        .select((
            shows::id,
            artists::id,
            artists::name,
            artists::image_link,
            shows::start_time,
        ))
        .order((shows::start_time.asc(), shows::id.asc()))
        .load::<(i32, i32, String, Option<String>, NaiveDateTime)>(conn)?
        .into_iter()
        .map(
            |(show_id, counterpart_id, counterpart_name, counterpart_image_link, start_time)| {
                Booking {
                    show_id,
                    counterpart_id,
                    counterpart_name,
                    counterpart_image_link,
                    start_time,
                }
            },
        )
        .collect();
    Ok(Detail::split(venue, bookings, now))
}

pub fn create(conn: &SqliteConnection, new_venue: &NewVenue) -> Result<Venue, Error> {
    let venue = conn.transaction::<_, Error, _>(|| {
        diesel::insert_into(venues::table)
            .values(new_venue)
            .execute(conn)?;
        let id = diesel::select(last_insert_rowid).get_result::<i32>(conn)?;
        get(conn, id)
    })?;
    info!(
        id = venue.id,
        name = venue.name.as_str(),
        genres = %venue.genres,
        "venue listed"
    );
    Ok(venue)
}

/// Applies `changes` to the venue; columns not mentioned keep their values.
pub fn update(conn: &SqliteConnection, id: i32, changes: &VenueChanges) -> Result<Venue, Error> {
    conn.transaction::<_, Error, _>(|| {
        let venue = get(conn, id)?;
        if changes.is_empty() {
            return Ok(venue);
        }
        diesel::update(&venue).set(changes).execute(conn)?;
        info!(id, "venue updated");
        get(conn, id)
    })
}

/// Deletes the venue and every show booked there. Returns `false` when no
/// venue has this id.
pub fn delete(conn: &SqliteConnection, id: i32) -> Result<bool, Error> {
    conn.transaction::<_, Error, _>(|| {
        let venue = match get(conn, id) {
            Ok(venue) => venue,
            Err(Error::NotFound { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        let cancelled = diesel::delete(shows::table.filter(shows::venue_id.eq(id))).execute(conn)?;
        diesel::delete(&venue).execute(conn)?;
        info!(id, cancelled = cancelled as u64, "venue deleted");
        Ok(true)
    })
}

/// (id, name) of every venue, for select boxes.
pub fn choices(conn: &SqliteConnection) -> Result<Vec<(i32, String)>, Error> {
    Ok(venues::table
        .select((venues::id, venues::name))
        .order(venues::id.asc())
        .load::<(i32, String)>(conn)?)
}

fn upcoming_counts(
    conn: &SqliteConnection,
    now: NaiveDateTime,
) -> Result<std::collections::HashMap<i32, usize>, Error> {
    let venue_ids = shows::table
        .filter(shows::start_time.gt(now))
        .select(shows::venue_id)
        .load::<i32>(conn)?;
    Ok(count_by_id(venue_ids))
}
