//! View models handed to the templates.

use crate::error::FieldErrors;
use crate::forms::{FormData, FormValues, GENRES, STATES};
use crate::models::{Artist, Venue};
use crate::repository::shows::ShowListing;
use crate::repository::{Booking, Detail};
use crate::templates;
use chrono::NaiveDateTime;
use std::io;

/// Renders `body` between the shared page header and footer.
pub fn render_page<F>(title: &str, body: F) -> io::Result<Vec<u8>>
where
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let mut buf = Vec::new();
    templates::header(&mut buf, title)?;
    body(&mut buf)?;
    templates::footer(&mut buf)?;
    Ok(buf)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DateFormat {
    /// `Sat 05, 21, 2019 9:30PM`
    Medium,
    /// `Saturday May, 21, 2019 at 9:30PM`
    Full,
}

pub fn format_datetime(value: NaiveDateTime, format: DateFormat) -> String {
    let pattern = match format {
        DateFormat::Medium => "%a %m, %d, %Y %-I:%M%p",
        DateFormat::Full => "%A %B, %-d, %Y at %-I:%M%p",
    };
    value.format(pattern).to_string()
}

/// The other party of a show, ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowCard {
    pub id: i32,
    pub name: String,
    pub image_link: Option<String>,
    pub start_time: String,
}

impl ShowCard {
    fn from_booking(booking: &Booking) -> ShowCard {
        ShowCard {
            id: booking.counterpart_id,
            name: booking.counterpart_name.clone(),
            image_link: booking.counterpart_image_link.clone(),
            start_time: format_datetime(booking.start_time, DateFormat::Medium),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    pub past_shows: Vec<ShowCard>,
    pub upcoming_shows: Vec<ShowCard>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl Schedule {
    fn new<T>(detail: &Detail<T>) -> Schedule {
        let cards = |bookings: &[Booking]| -> Vec<ShowCard> {
            bookings.iter().map(ShowCard::from_booking).collect()
        };
        Schedule {
            past_shows: cards(&detail.past_shows),
            upcoming_shows: cards(&detail.upcoming_shows),
            past_shows_count: detail.past_shows.len(),
            upcoming_shows_count: detail.upcoming_shows.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VenuePage {
    pub venue: Venue,
    pub genres: Vec<String>,
    pub schedule: Schedule,
}

impl VenuePage {
    pub fn new(detail: &Detail<Venue>) -> VenuePage {
        VenuePage {
            venue: detail.entity.clone(),
            genres: detail.entity.genres.0.clone(),
            schedule: Schedule::new(detail),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistPage {
    pub artist: Artist,
    pub genres: Vec<String>,
    pub schedule: Schedule,
}

impl ArtistPage {
    pub fn new(detail: &Detail<Artist>) -> ArtistPage {
        ArtistPage {
            artist: detail.entity.clone(),
            genres: detail
                .entity
                .genres
                .as_ref()
                .map(|genres| genres.0.clone())
                .unwrap_or_default(),
            schedule: Schedule::new(detail),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShowRow {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
    pub start_time_full: String,
}

impl ShowRow {
    pub fn from_listing(listing: &ShowListing) -> ShowRow {
        ShowRow {
            venue_id: listing.venue_id,
            venue_name: listing.venue_name.clone(),
            artist_id: listing.artist_id,
            artist_name: listing.artist_name.clone(),
            artist_image_link: listing.artist_image_link.clone(),
            start_time: format_datetime(listing.start_time, DateFormat::Medium),
            start_time_full: format_datetime(listing.start_time, DateFormat::Full),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    fn list<I>(options: I, is_selected: impl Fn(&str) -> bool) -> Vec<Choice>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        options
            .into_iter()
            .map(|(value, label)| Choice {
                selected: is_selected(&value),
                value,
                label,
            })
            .collect()
    }
}

/// A venue or artist form: where it posts, what it shows and what went wrong.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityForm {
    pub heading: String,
    pub action: String,
    pub values: FormValues,
    pub genres: Vec<Choice>,
    pub states: Vec<Choice>,
    pub errors: Vec<String>,
}

impl EntityForm {
    pub fn new(heading: &str, action: &str, values: FormValues) -> EntityForm {
        let fixed = |options: &[&str]| -> Vec<(String, String)> {
            options
                .iter()
                .map(|option| (option.to_string(), option.to_string()))
                .collect()
        };
        let genres = Choice::list(fixed(GENRES), |genre| values.genres.iter().any(|g| g == genre));
        let states = Choice::list(fixed(STATES), |state| values.state == state);
        EntityForm {
            heading: heading.to_owned(),
            action: action.to_owned(),
            values,
            genres,
            states,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> EntityForm {
        self.errors = errors.iter().map(ToString::to_string).collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShowForm {
    pub artists: Vec<Choice>,
    pub venues: Vec<Choice>,
    pub start_time: String,
    pub errors: Vec<String>,
}

impl ShowForm {
    pub fn new(
        artists: Vec<(i32, String)>,
        venues: Vec<(i32, String)>,
        submitted: &FormData,
    ) -> ShowForm {
        let options = |rows: Vec<(i32, String)>, key: &str| -> Vec<Choice> {
            let chosen = submitted.get(key).unwrap_or_default().to_owned();
            Choice::list(
                rows.into_iter().map(|(id, name)| (id.to_string(), name)),
                |id| id == chosen,
            )
        };
        ShowForm {
            artists: options(artists, "artist_id"),
            venues: options(venues, "venue_id"),
            start_time: submitted.get("start_time").unwrap_or_default().to_owned(),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> ShowForm {
        self.errors = errors.iter().map(ToString::to_string).collect();
        self
    }
}
