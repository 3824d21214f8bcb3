use crate::schema::*;

use chrono::NaiveDateTime;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use std::fmt;
use std::io::Write;

/// Ordered list of genre names, stored as a single comma-joined column.
#[derive(AsExpression, Clone, Debug, Default, Eq, FromSqlRow, PartialEq)]
#[sql_type = "Text"]
pub struct Genres(pub Vec<String>);

impl Genres {
    pub fn parse(joined: &str) -> Genres {
        Genres(
            joined
                .split(',')
                .map(str::trim)
                .filter(|genre| !genre.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Genres {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl<S: Into<String>> From<Vec<S>> for Genres {
    fn from(genres: Vec<S>) -> Genres {
        Genres(genres.into_iter().map(Into::into).collect())
    }
}

impl ToSql<Text, Sqlite> for Genres {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Sqlite>) -> serialize::Result {
        let joined = self.0.join(",");
        <String as ToSql<Text, Sqlite>>::to_sql(&joined, out)
    }
}

impl FromSql<Text, Sqlite> for Genres {
    fn from_sql(bytes: Option<&<Sqlite as Backend>::RawValue>) -> deserialize::Result<Self> {
        let joined = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Genres::parse(&joined))
    }
}

#[derive(Clone, Debug, Identifiable, PartialEq, Queryable)]
#[table_name = "venues"]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub genres: Genres,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

#[derive(Clone, Debug, Insertable, PartialEq)]
#[table_name = "venues"]
pub struct NewVenue {
    pub name: String,
    pub genres: Genres,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

/// Partial update of a venue. `None` leaves the column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(AsChangeset, Clone, Debug, Default, PartialEq)]
#[table_name = "venues"]
pub struct VenueChanges {
    pub name: Option<String>,
    pub genres: Option<Genres>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: Option<bool>,
    pub seeking_description: Option<Option<String>>,
    pub image_link: Option<Option<String>>,
    pub facebook_link: Option<Option<String>>,
}

impl VenueChanges {
    pub fn is_empty(&self) -> bool {
        *self == VenueChanges::default()
    }
}

#[derive(Clone, Debug, Identifiable, PartialEq, Queryable)]
#[table_name = "artists"]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Option<Genres>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

#[derive(Clone, Debug, Insertable, PartialEq)]
#[table_name = "artists"]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Option<Genres>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

#[derive(AsChangeset, Clone, Debug, Default, PartialEq)]
#[table_name = "artists"]
pub struct ArtistChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<Option<String>>,
    pub genres: Option<Option<Genres>>,
    pub website: Option<Option<String>>,
    pub seeking_venue: Option<bool>,
    pub seeking_description: Option<Option<String>>,
    pub image_link: Option<Option<String>>,
    pub facebook_link: Option<Option<String>>,
}

impl ArtistChanges {
    pub fn is_empty(&self) -> bool {
        *self == ArtistChanges::default()
    }
}

#[derive(Clone, Debug, Identifiable, PartialEq, Queryable)]
#[table_name = "shows"]
pub struct Show {
    pub id: i32,
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: NaiveDateTime,
}

#[derive(Clone, Debug, Insertable, PartialEq)]
#[table_name = "shows"]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::Genres;

    #[test]
    fn genres_parse_skips_blank_entries() {
        let genres = Genres::parse("Jazz, Reggae,,Swing ");
        assert_eq!(genres, Genres::from(vec!["Jazz", "Reggae", "Swing"]));
        assert!(Genres::parse("").is_empty());
    }

    #[test]
    fn genres_display_is_human_readable() {
        let genres = Genres::from(vec!["Rock n Roll", "Blues"]);
        assert_eq!(genres.to_string(), "Rock n Roll, Blues");
    }
}
