//! Parsing and validation of submitted HTML forms.

use crate::error::{Error, FieldErrors};
use crate::models::{Artist, ArtistChanges, Genres, NewArtist, NewShow, NewVenue, Venue, VenueChanges};
use chrono::{DateTime, NaiveDateTime};
use serde_derive::Deserialize;
use url::form_urlencoded;
use url::Url;

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

const SHORT: usize = 120;
const LONG: usize = 500;

/// An urlencoded body. Keys may repeat, as multi-selects submit one pair per
/// selected option.
#[derive(Clone, Debug, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(body: &[u8]) -> FormData {
        FormData {
            pairs: form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Last submitted value for `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.trim())
    }

    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, value)| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Checkbox state: ticked when any value for `key` is `y`, `on` or `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .any(|(_, value)| match value.trim() {
                "y" | "on" | "true" => true,
                _ => false,
            })
    }
}

/// Accumulates field errors while reading values out of a form.
struct Validator<'a> {
    form: &'a FormData,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    fn new(form: &'a FormData) -> Validator<'a> {
        Validator {
            form,
            errors: FieldErrors::default(),
        }
    }

    fn required(&mut self, key: &'static str, max_len: usize) -> String {
        let form = self.form;
        match form.get(key) {
            Some(value) if !value.is_empty() => {
                self.check_length(key, value, max_len);
                value.to_owned()
            }
            _ => {
                self.errors.push(key, "is required");
                String::new()
            }
        }
    }

    /// Value of a field that may be left blank; blank means `None`.
    fn optional(&mut self, key: &'static str, max_len: usize) -> Option<String> {
        let form = self.form;
        match form.get(key) {
            Some(value) if !value.is_empty() => {
                self.check_length(key, value, max_len);
                Some(value.to_owned())
            }
            _ => None,
        }
    }

    fn required_if_present(&mut self, key: &'static str, max_len: usize) -> Option<String> {
        if self.form.contains(key) {
            Some(self.required(key, max_len))
        } else {
            None
        }
    }

    fn optional_if_present(&mut self, key: &'static str, max_len: usize) -> Option<Option<String>> {
        if self.form.contains(key) {
            Some(self.optional(key, max_len))
        } else {
            None
        }
    }

    fn check_length(&mut self, key: &'static str, value: &str, max_len: usize) {
        if value.chars().count() > max_len {
            self.errors
                .push(key, format!("must be at most {} characters", max_len));
        }
    }

    fn check_state(&mut self, key: &'static str, value: &str) {
        if !value.is_empty() && !STATES.contains(&value) {
            self.errors.push(key, format!("unknown state {:?}", value));
        }
    }

    fn check_phone(&mut self, key: &'static str, value: &str) {
        let allowed = value
            .chars()
            .all(|c| c.is_ascii_digit() || " -().+".contains(c));
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !value.is_empty() && (!allowed || digits < 7) {
            self.errors.push(key, "is not a valid phone number");
        }
    }

    fn check_url(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            if !value.is_empty() && Url::parse(value).is_err() {
                self.errors.push(key, "is not a valid URL");
            }
        }
    }

    fn genres(&mut self, key: &'static str) -> Genres {
        let genres = self.form.get_all(key);
        for genre in &genres {
            if !GENRES.contains(&genre.as_str()) {
                self.errors.push(key, format!("unknown genre {:?}", genre));
            }
        }
        Genres(genres)
    }

    fn finish<T>(self, value: T) -> Result<T, Error> {
        self.errors.into_result(value)
    }
}

pub fn new_venue(form: &FormData) -> Result<NewVenue, Error> {
    let mut v = Validator::new(form);
    let venue = NewVenue {
        name: v.required("name", LONG),
        genres: v.genres("genres"),
        city: v.required("city", SHORT),
        state: v.required("state", SHORT),
        address: v.required("address", SHORT),
        phone: v.required("phone", SHORT),
        website: v.required("website_link", LONG),
        seeking_talent: form.flag("seeking_talent"),
        seeking_description: v.optional("seeking_description", SHORT),
        image_link: v.optional("image_link", LONG),
        facebook_link: v.optional("facebook_link", SHORT),
    };
    v.check_state("state", &venue.state);
    v.check_phone("phone", &venue.phone);
    v.check_url("website_link", Some(venue.website.as_str()));
    v.check_url("image_link", venue.image_link.as_deref());
    v.check_url("facebook_link", venue.facebook_link.as_deref());
    v.finish(venue)
}

/// Changes for the keys present in `form`; absent keys leave the stored
/// value alone.
pub fn venue_changes(form: &FormData) -> Result<VenueChanges, Error> {
    let mut v = Validator::new(form);
    let changes = VenueChanges {
        name: v.required_if_present("name", LONG),
        genres: if form.contains("genres") {
            Some(v.genres("genres"))
        } else {
            None
        },
        city: v.required_if_present("city", SHORT),
        state: v.required_if_present("state", SHORT),
        address: v.required_if_present("address", SHORT),
        phone: v.required_if_present("phone", SHORT),
        website: v.required_if_present("website_link", LONG),
        seeking_talent: if form.contains("seeking_talent") {
            Some(form.flag("seeking_talent"))
        } else {
            None
        },
        seeking_description: v.optional_if_present("seeking_description", SHORT),
        image_link: v.optional_if_present("image_link", LONG),
        facebook_link: v.optional_if_present("facebook_link", SHORT),
    };
    if let Some(state) = &changes.state {
        v.check_state("state", state);
    }
    if let Some(phone) = &changes.phone {
        v.check_phone("phone", phone);
    }
    v.check_url("website_link", changes.website.as_deref());
    v.check_url("image_link", changes.image_link.clone().flatten().as_deref());
    v.check_url("facebook_link", changes.facebook_link.clone().flatten().as_deref());
    v.finish(changes)
}

pub fn new_artist(form: &FormData) -> Result<NewArtist, Error> {
    let mut v = Validator::new(form);
    let genres = v.genres("genres");
    let artist = NewArtist {
        name: v.required("name", LONG),
        city: v.required("city", SHORT),
        state: v.required("state", SHORT),
        phone: v.optional("phone", SHORT),
        genres: if genres.is_empty() { None } else { Some(genres) },
        website: v.optional("website_link", LONG),
        seeking_venue: form.flag("seeking_venue"),
        seeking_description: v.optional("seeking_description", SHORT),
        image_link: v.optional("image_link", LONG),
        facebook_link: v.optional("facebook_link", SHORT),
    };
    v.check_state("state", &artist.state);
    if let Some(phone) = &artist.phone {
        v.check_phone("phone", phone);
    }
    v.check_url("website_link", artist.website.as_deref());
    v.check_url("image_link", artist.image_link.as_deref());
    v.check_url("facebook_link", artist.facebook_link.as_deref());
    v.finish(artist)
}

pub fn artist_changes(form: &FormData) -> Result<ArtistChanges, Error> {
    let mut v = Validator::new(form);
    let changes = ArtistChanges {
        name: v.required_if_present("name", LONG),
        city: v.required_if_present("city", SHORT),
        state: v.required_if_present("state", SHORT),
        phone: v.optional_if_present("phone", SHORT),
        genres: if form.contains("genres") {
            let genres = v.genres("genres");
            Some(if genres.is_empty() { None } else { Some(genres) })
        } else {
            None
        },
        website: v.optional_if_present("website_link", LONG),
        seeking_venue: if form.contains("seeking_venue") {
            Some(form.flag("seeking_venue"))
        } else {
            None
        },
        seeking_description: v.optional_if_present("seeking_description", SHORT),
        image_link: v.optional_if_present("image_link", LONG),
        facebook_link: v.optional_if_present("facebook_link", SHORT),
    };
    if let Some(state) = &changes.state {
        v.check_state("state", state);
    }
    if let Some(Some(phone)) = &changes.phone {
        v.check_phone("phone", phone);
    }
    v.check_url("website_link", changes.website.clone().flatten().as_deref());
    v.check_url("image_link", changes.image_link.clone().flatten().as_deref());
    v.check_url("facebook_link", changes.facebook_link.clone().flatten().as_deref());
    v.finish(changes)
}

pub fn new_show(form: &FormData) -> Result<NewShow, Error> {
    let mut errors = FieldErrors::default();
    let mut id = |key: &'static str| match form.get(key).map(str::parse::<i32>) {
        Some(Ok(id)) => id,
        Some(Err(_)) => {
            errors.push(key, "must be a number");
            0
        }
        None => {
            errors.push(key, "is required");
            0
        }
    };
    let artist_id = id("artist_id");
    let venue_id = id("venue_id");
    let start_time = match form.get("start_time") {
        Some(value) if !value.is_empty() => {
            let parsed = parse_start_time(value);
            if parsed.is_none() {
                errors.push(
                    "start_time",
                    format!("cannot read {:?} as a date and time", value),
                );
            }
            parsed
        }
        _ => {
            errors.push("start_time", "is required");
            None
        }
    };
    match start_time {
        Some(start_time) if errors.is_empty() => Ok(NewShow {
            artist_id,
            venue_id,
            start_time,
        }),
        _ => Err(Error::Validation(errors)),
    }
}

/// Accepts the formats browsers and humans commonly submit; offsets are
/// normalised to UTC.
pub fn parse_start_time(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

impl SearchForm {
    pub fn parse(body: &[u8]) -> Result<SearchForm, Error> {
        serde_urlencoded::from_bytes(body)
            .map_err(|err| Error::invalid("search_term", err.to_string()))
    }
}

/// Values shown in a venue or artist form, either freshly loaded or as the
/// user submitted them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormValues {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub website_link: String,
    pub facebook_link: String,
    pub image_link: String,
    pub seeking: bool,
    pub seeking_description: String,
}

impl FormValues {
    pub fn from_venue(venue: &Venue) -> FormValues {
        FormValues {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            genres: venue.genres.0.clone(),
            website_link: venue.website.clone(),
            facebook_link: venue.facebook_link.clone().unwrap_or_default(),
            image_link: venue.image_link.clone().unwrap_or_default(),
            seeking: venue.seeking_talent,
            seeking_description: venue.seeking_description.clone().unwrap_or_default(),
        }
    }

    pub fn from_artist(artist: &Artist) -> FormValues {
        FormValues {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            address: String::new(),
            phone: artist.phone.clone().unwrap_or_default(),
            genres: artist
                .genres
                .as_ref()
                .map(|genres| genres.0.clone())
                .unwrap_or_default(),
            website_link: artist.website.clone().unwrap_or_default(),
            facebook_link: artist.facebook_link.clone().unwrap_or_default(),
            image_link: artist.image_link.clone().unwrap_or_default(),
            seeking: artist.seeking_venue,
            seeking_description: artist.seeking_description.clone().unwrap_or_default(),
        }
    }

    /// Echoes a rejected submission back into the form. `seeking_key` is the
    /// name of the checkbox.
    pub fn from_form(form: &FormData, seeking_key: &str) -> FormValues {
        let text = |key: &str| form.get(key).unwrap_or_default().to_owned();
        FormValues {
            name: text("name"),
            city: text("city"),
            state: text("state"),
            address: text("address"),
            phone: text("phone"),
            genres: form.get_all("genres"),
            website_link: text("website_link"),
            facebook_link: text("facebook_link"),
            image_link: text("image_link"),
            seeking: form.flag(seeking_key),
            seeking_description: text("seeking_description"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn venue_body() -> String {
        [
            "name=The+Musical+Hop",
            "city=San+Francisco",
            "state=CA",
            "address=1015+Folsom+Street",
            "phone=123-123-1234",
            "genres=Jazz",
            "genres=Reggae",
            "website_link=https%3A%2F%2Fwww.themusicalhop.com",
            "facebook_link=https%3A%2F%2Fwww.facebook.com%2FTheMusicalHop",
            "image_link=",
            "seeking_talent=y",
            "seeking_description=We+are+on+the+lookout",
        ]
        .join("&")
    }

    #[test]
    fn repeated_keys_are_kept_in_order() {
        let form = FormData::parse(b"genres=Jazz&genres=Swing&name=+Hop+&genres=");
        assert_eq!(form.get_all("genres"), vec!["Jazz", "Swing"]);
        assert_eq!(form.get("name"), Some("Hop"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn checkbox_with_hidden_fallback() {
        assert!(FormData::parse(b"seeking_talent=n&seeking_talent=y").flag("seeking_talent"));
        assert!(!FormData::parse(b"seeking_talent=n").flag("seeking_talent"));
        assert!(!FormData::parse(b"").flag("seeking_talent"));
        assert!(FormData::parse(b"seeking_talent=on").flag("seeking_talent"));
    }

    #[test]
    fn complete_venue_form_is_accepted() {
        let venue = new_venue(&FormData::parse(venue_body().as_bytes())).unwrap();
        assert_eq!(venue.name, "The Musical Hop");
        assert_eq!(venue.genres, Genres::from(vec!["Jazz", "Reggae"]));
        assert_eq!(venue.website, "https://www.themusicalhop.com");
        assert_eq!(venue.image_link, None);
        assert!(venue.seeking_talent);
    }

    #[test]
    fn missing_required_venue_fields_are_all_reported() {
        let err = new_venue(&FormData::parse(b"name=&genres=Jazz")).unwrap_err();
        match err {
            Error::Validation(errors) => {
                for field in &["name", "city", "state", "address", "phone", "website_link"] {
                    assert!(errors.has(field), "{} should be reported", field);
                }
                assert!(!errors.has("genres"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        let body = venue_body()
            .replace("state=CA", "state=XX")
            .replace("phone=123-123-1234", "phone=call+me")
            .replace("genres=Reggae", "genres=Polka")
            .replace("image_link=", "image_link=not+a+url");
        match new_venue(&FormData::parse(body.as_bytes())).unwrap_err() {
            Error::Validation(errors) => {
                assert!(errors.has("state"));
                assert!(errors.has("phone"));
                assert!(errors.has("genres"));
                assert!(errors.has("image_link"));
                assert!(!errors.has("name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn venue_changes_only_cover_submitted_keys() {
        let changes =
            venue_changes(&FormData::parse(b"phone=415-555-0100&image_link=")).unwrap();
        assert_eq!(
            changes,
            VenueChanges {
                phone: Some("415-555-0100".to_owned()),
                image_link: Some(None),
                ..VenueChanges::default()
            }
        );
        assert!(venue_changes(&FormData::parse(b"")).unwrap().is_empty());
    }

    #[test]
    fn venue_changes_refuse_to_blank_required_fields() {
        let err = venue_changes(&FormData::parse(b"name=")).unwrap_err();
        assert!(matches!(err, Error::Validation(ref errors) if errors.has("name")));
    }

    #[test]
    fn artist_form_defaults() {
        let artist =
            new_artist(&FormData::parse(b"name=Guns+N+Petals&city=San+Francisco&state=CA"))
                .unwrap();
        assert_eq!(artist.genres, None);
        assert_eq!(artist.phone, None);
        assert!(!artist.seeking_venue);

        let changes = artist_changes(&FormData::parse(b"genres=&seeking_venue=n")).unwrap();
        assert_eq!(changes.genres, Some(None));
        assert_eq!(changes.seeking_venue, Some(false));
        assert_eq!(changes.name, None);
    }

    #[test]
    fn show_form_parsing() {
        let show =
            new_show(&FormData::parse(b"artist_id=4&venue_id=1&start_time=2019-05-21T21%3A30"))
                .unwrap();
        assert_eq!(show.artist_id, 4);
        assert_eq!(show.venue_id, 1);
        assert_eq!(
            show.start_time,
            NaiveDate::from_ymd_opt(2019, 5, 21)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap()
        );

        match new_show(&FormData::parse(b"artist_id=x&start_time=tomorrow")).unwrap_err() {
            Error::Validation(errors) => {
                assert!(errors.has("artist_id"));
                assert!(errors.has("venue_id"));
                assert!(errors.has("start_time"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn start_time_formats() {
        let expected = NaiveDate::from_ymd_opt(2035, 4, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        assert_eq!(parse_start_time("2035-04-01 20:00:00"), Some(expected));
        assert_eq!(parse_start_time("2035-04-01 20:00"), Some(expected));
        assert_eq!(parse_start_time("2035-04-01T20:00"), Some(expected));
        assert_eq!(parse_start_time("2035-04-01T22:00:00+02:00"), Some(expected));
        assert_eq!(parse_start_time("next tuesday"), None);
    }

    #[test]
    fn search_term_defaults_to_empty() {
        assert_eq!(SearchForm::parse(b"").unwrap().search_term, "");
        assert_eq!(
            SearchForm::parse(b"search_term=Music").unwrap().search_term,
            "Music"
        );
    }

    #[test]
    fn repeated_search_term_is_a_field_error() {
        match SearchForm::parse(b"search_term=a&search_term=b") {
            Err(Error::Validation(errors)) => assert!(errors.has("search_term")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
