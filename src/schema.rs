table! {
    artists (id) {
        id -> Integer,
        name -> Text,
        city -> Text,
        state -> Text,
        phone -> Nullable<Text>,
        genres -> Nullable<Text>,
        website -> Nullable<Text>,
        seeking_venue -> Bool,
        seeking_description -> Nullable<Text>,
        image_link -> Nullable<Text>,
        facebook_link -> Nullable<Text>,
    }
}

table! {
    shows (id) {
        id -> Integer,
        artist_id -> Integer,
        venue_id -> Integer,
        start_time -> Timestamp,
    }
}

table! {
    venues (id) {
        id -> Integer,
        name -> Text,
        genres -> Text,
        city -> Text,
        state -> Text,
        address -> Text,
        phone -> Text,
        website -> Text,
        seeking_talent -> Bool,
        seeking_description -> Nullable<Text>,
        image_link -> Nullable<Text>,
        facebook_link -> Nullable<Text>,
    }
}

joinable!(shows -> artists (artist_id));
joinable!(shows -> venues (venue_id));

allow_tables_to_appear_in_same_query!(artists, shows, venues,);
