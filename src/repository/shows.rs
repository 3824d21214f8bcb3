use super::last_insert_rowid;
use crate::error::{Error, FieldErrors};
use crate::models::{NewShow, Show};
use crate::schema::{artists, shows, venues};
use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use tracing::info;

/// A show with both sides of the booking resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowListing {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

/// Every show ordered by id.
pub fn list(conn: &SqliteConnection) -> Result<Vec<ShowListing>, Error> {
    let rows = shows::table
        .inner_join(artists::table)
        .inner_join(venues::table)
        .select((
            shows::id,
            venues::id,
            venues::name,
            venues::image_link,
            artists::id,
            artists::name,
            artists::image_link,
            shows::start_time,
        ))
        .order(shows::id.asc())
        .load::<(
            i32,
            i32,
            String,
            Option<String>,
            i32,
            String,
            Option<String>,
            NaiveDateTime,
        )>(conn)?;
    Ok(rows
        .into_iter()
        .map(
            |(
                id,
                venue_id,
                venue_name,
                venue_image_link,
                artist_id,
                artist_name,
                artist_image_link,
                start_time,
            )| ShowListing {
                id,
                venue_id,
                venue_name,
                venue_image_link,
                artist_id,
                artist_name,
                artist_image_link,
                start_time,
            },
        )
        .collect())
}

/// Books an artist into a venue. Both must exist; otherwise nothing is
/// written and the offending ids are reported per field.
pub fn create(conn: &SqliteConnection, new_show: &NewShow) -> Result<Show, Error> {
    let show = conn.transaction::<_, Error, _>(|| {
        let mut errors = FieldErrors::default();
        let artist_exists = diesel::select(exists(artists::table.find(new_show.artist_id)))
            .get_result::<bool>(conn)?;
        let venue_exists = diesel::select(exists(venues::table.find(new_show.venue_id)))
            .get_result::<bool>(conn)?;
        if !artist_exists {
            errors.push(
                "artist_id",
                format!("no artist with id {}", new_show.artist_id),
            );
        }
        if !venue_exists {
            errors.push("venue_id", format!("no venue with id {}", new_show.venue_id));
        }
        errors.into_result(())?;

        diesel::insert_into(shows::table)
            .values(new_show)
            .execute(conn)?;
        let id = diesel::select(last_insert_rowid).get_result::<i32>(conn)?;
        Ok(shows::table.find(id).first::<Show>(conn)?)
    })?;
    info!(
        id = show.id,
        artist_id = show.artist_id,
        venue_id = show.venue_id,
        "show listed"
    );
    Ok(show)
}
