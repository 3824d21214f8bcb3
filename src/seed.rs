//! Demo directory for a fresh database.

use crate::error::Error;
use crate::forms::parse_start_time;
use crate::models::{Genres, NewArtist, NewShow, NewVenue};
use crate::repository::{artists, shows, venues};
use diesel::prelude::*;
use tracing::info;

/// Inserts the demo venues, artists and shows. Does nothing when any venue
/// or artist already exists; returns whether anything was written.
pub fn seed(conn: &SqliteConnection) -> Result<bool, Error> {
    conn.transaction::<_, Error, _>(|| {
        if !venues::choices(conn)?.is_empty() || !artists::choices(conn)?.is_empty() {
            info!("directory already has entries, not seeding");
            return Ok(false);
        }

        let hop = venues::create(conn, &musical_hop())?;
        let pianos = venues::create(conn, &dueling_pianos())?;
        let park = venues::create(conn, &park_square())?;

        let petals = artists::create(conn, &guns_n_petals())?;
        let matt = artists::create(conn, &matt_quevedo())?;
        let sax = artists::create(conn, &wild_sax_band())?;

        let bookings = [
            (petals.id, hop.id, "2019-05-21 21:30"),
            (matt.id, park.id, "2019-06-15 23:00"),
            (sax.id, park.id, "2035-04-01 20:00"),
            (sax.id, park.id, "2035-04-08 20:00"),
            (sax.id, pianos.id, "2035-04-15 20:00"),
        ];
        for &(artist_id, venue_id, start_time) in bookings.iter() {
            let start_time = parse_start_time(start_time)
                .ok_or_else(|| Error::invalid("start_time", start_time))?;
            shows::create(
                conn,
                &NewShow {
                    artist_id,
                    venue_id,
                    start_time,
                },
            )?;
        }
        info!(venues = 3, artists = 3, shows = bookings.len() as u64, "demo directory seeded");
        Ok(true)
    })
}

fn musical_hop() -> NewVenue {
    NewVenue {
        name: "The Musical Hop".to_owned(),
        genres: Genres::from(vec!["Jazz", "Reggae", "Classical", "Folk"]),
        city: "San Francisco".to_owned(),
        state: "CA".to_owned(),
        address: "1015 Folsom Street".to_owned(),
        phone: "123-123-1234".to_owned(),
        website: "https://www.themusicalhop.com".to_owned(),
        seeking_talent: true,
        seeking_description: Some(
            "We are on the lookout for a local artist to play every two weeks. Please call us."
                .to_owned(),
        ),
        image_link: Some(
            "https://images.unsplash.com/photo-1543900694-133f37abaaa5?auto=format&fit=crop&w=400&q=60"
                .to_owned(),
        ),
        facebook_link: Some("https://www.facebook.com/TheMusicalHop".to_owned()),
    }
}

fn dueling_pianos() -> NewVenue {
    NewVenue {
        name: "The Dueling Pianos Bar".to_owned(),
        genres: Genres::from(vec!["Classical", "R&B", "Hip-Hop"]),
        city: "New York".to_owned(),
        state: "NY".to_owned(),
        address: "335 Delancey Street".to_owned(),
        phone: "914-003-1132".to_owned(),
        website: "https://www.theduelingpianos.com".to_owned(),
        seeking_talent: false,
        seeking_description: None,
        image_link: Some(
            "https://images.unsplash.com/photo-1497032205916-ac775f0649ae?auto=format&fit=crop&w=750&q=80"
                .to_owned(),
        ),
        facebook_link: Some("https://www.facebook.com/theduelingpianos".to_owned()),
    }
}

fn park_square() -> NewVenue {
    NewVenue {
        name: "Park Square Live Music & Coffee".to_owned(),
        genres: Genres::from(vec!["Rock n Roll", "Jazz", "Classical", "Folk"]),
        city: "San Francisco".to_owned(),
        state: "CA".to_owned(),
        address: "34 Whiskey Moore Ave".to_owned(),
        phone: "415-000-1234".to_owned(),
        website: "https://www.parksquarelivemusicandcoffee.com".to_owned(),
        seeking_talent: false,
        seeking_description: None,
        image_link: Some(
            "https://images.unsplash.com/photo-1485686531765-ba63b07845a7?auto=format&fit=crop&w=747&q=80"
                .to_owned(),
        ),
        facebook_link: Some(
            "https://www.facebook.com/ParkSquareLiveMusicAndCoffee".to_owned(),
        ),
    }
}

fn guns_n_petals() -> NewArtist {
    NewArtist {
        name: "Guns N Petals".to_owned(),
        city: "San Francisco".to_owned(),
        state: "CA".to_owned(),
        phone: Some("326-123-5000".to_owned()),
        genres: Some(Genres::from(vec!["Rock n Roll"])),
        website: Some("https://www.gunsnpetalsband.com".to_owned()),
        seeking_venue: true,
        seeking_description: Some(
            "Looking for shows to perform at in the San Francisco Bay Area!".to_owned(),
        ),
        image_link: Some(
            "https://images.unsplash.com/photo-1549213783-8284d0336c4f?auto=format&fit=crop&w=300&q=80"
                .to_owned(),
        ),
        facebook_link: Some("https://www.facebook.com/GunsNPetals".to_owned()),
    }
}

fn matt_quevedo() -> NewArtist {
    NewArtist {
        name: "Matt Quevedo".to_owned(),
        city: "New York".to_owned(),
        state: "NY".to_owned(),
        phone: Some("300-400-5000".to_owned()),
        genres: Some(Genres::from(vec!["Jazz"])),
        website: None,
        seeking_venue: false,
        seeking_description: None,
        image_link: Some(
            "https://images.unsplash.com/photo-1495223153807-b916f75de8c5?auto=format&fit=crop&w=334&q=80"
                .to_owned(),
        ),
        facebook_link: Some("https://www.facebook.com/mattquevedo923251523".to_owned()),
    }
}

fn wild_sax_band() -> NewArtist {
    NewArtist {
        name: "The Wild Sax Band".to_owned(),
        city: "San Francisco".to_owned(),
        state: "CA".to_owned(),
        phone: Some("432-325-5432".to_owned()),
        genres: Some(Genres::from(vec!["Jazz", "Classical"])),
        website: None,
        seeking_venue: false,
        seeking_description: None,
        image_link: Some(
            "https://images.unsplash.com/photo-1558369981-f9ca78462e61?auto=format&fit=crop&w=794&q=80"
                .to_owned(),
        ),
        facebook_link: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::TestDb;

    #[test]
    fn seeds_once() {
        let db = TestDb::new();
        let conn = db.conn();
        assert!(seed(&conn).unwrap());
        assert!(!seed(&conn).unwrap());

        assert_eq!(venues::choices(&conn).unwrap().len(), 3);
        assert_eq!(artists::choices(&conn).unwrap().len(), 3);
        assert_eq!(shows::list(&conn).unwrap().len(), 5);

        let now = parse_start_time("2025-01-01 00:00").unwrap();
        let areas = venues::list_grouped_by_location(&conn, now).unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "San Francisco");
        assert_eq!(areas[0].venues.len(), 2);
        assert_eq!(areas[0].venues[1].num_upcoming_shows, 2);

        let found = artists::search(&conn, "A", now).unwrap();
        assert_eq!(found.count, 3);
    }
}
