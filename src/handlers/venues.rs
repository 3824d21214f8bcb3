use super::{
    context, index_with_notice, path_id, redirect, respond, respond_with, with_body, write_failed,
};
use crate::context::AppContext;
use crate::error::{Error, FieldErrors};
use crate::forms::{self, FormData, FormValues, SearchForm};
use crate::repository::venues;
use crate::templates;
use crate::views::{render_page, EntityForm, VenuePage};
use gotham::handler::HandlerFuture;
use gotham::state::State;
use hyper::{Body, Response, StatusCode};

const NEW_HEADING: &str = "List a new venue";
const EDIT_HEADING: &str = "Edit venue";

pub fn list(state: State) -> (State, Response<Body>) {
    let page = render_list(context(&state));
    let response = respond(&state, page);
    (state, response)
}

fn render_list(ctx: &AppContext) -> Result<Vec<u8>, Error> {
    let conn = ctx.connect()?;
    let areas = venues::list_grouped_by_location(&conn, ctx.now())?;
    Ok(render_page("Venues", |out| templates::venues(out, &areas))?)
}

pub fn search(state: State) -> Box<HandlerFuture> {
    with_body(state, |state, body| {
        let page = render_search(context(state), body);
        respond(state, page)
    })
}

fn render_search(ctx: &AppContext, body: &[u8]) -> Result<Vec<u8>, Error> {
    let form = SearchForm::parse(body)?;
    let conn = ctx.connect()?;
    let results = venues::search(&conn, &form.search_term, ctx.now())?;
    Ok(render_page("Venue search", |out| {
        templates::search(out, "venues", &form.search_term, &results)
    })?)
}

pub fn show(state: State) -> (State, Response<Body>) {
    let page = render_detail(context(&state), path_id(&state));
    let response = respond(&state, page);
    (state, response)
}

fn render_detail(ctx: &AppContext, id: i32) -> Result<Vec<u8>, Error> {
    let conn = ctx.connect()?;
    let page = VenuePage::new(&venues::detail(&conn, id, ctx.now())?);
    Ok(render_page(&page.venue.name, |out| {
        templates::venue(&mut *out, &page)?;
        templates::schedule(out, "artists", &page.schedule)
    })?)
}

pub fn create_form(state: State) -> (State, Response<Body>) {
    let form = EntityForm::new(NEW_HEADING, "/venues/create", FormValues::default());
    let response = respond(&state, render_form(&form));
    (state, response)
}

pub fn create(state: State) -> Box<HandlerFuture> {
    with_body(state, |state, body| {
        let form = FormData::parse(body);
        let new_venue = match forms::new_venue(&form) {
            Ok(new_venue) => new_venue,
            Err(Error::Validation(errors)) => {
                return rejected(state, NEW_HEADING, "/venues/create", &form, &errors)
            }
            Err(err) => return err.as_response(state),
        };
        match context(state)
            .connect()
            .and_then(|conn| venues::create(&conn, &new_venue))
        {
            Ok(venue) => index_with_notice(
                state,
                StatusCode::OK,
                &format!("Venue {} was successfully listed!", venue.name),
            ),
            Err(err) => write_failed(
                state,
                err,
                &format!("An error occurred. Venue {} could not be listed.", new_venue.name),
            ),
        }
    })
}

pub fn edit_form(state: State) -> (State, Response<Body>) {
    let id = path_id(&state);
    let page = context(&state)
        .connect()
        .and_then(|conn| venues::get(&conn, id))
        .and_then(|venue| {
            let action = format!("/venues/{}/edit", id);
            render_form(&EntityForm::new(
                EDIT_HEADING,
                &action,
                FormValues::from_venue(&venue),
            ))
        });
    let response = respond(&state, page);
    (state, response)
}

pub fn edit(state: State) -> Box<HandlerFuture> {
    let id = path_id(&state);
    with_body(state, move |state, body| {
        let form = FormData::parse(body);
        let action = format!("/venues/{}/edit", id);
        let changes = match forms::venue_changes(&form) {
            Ok(changes) => changes,
            Err(Error::Validation(errors)) => {
                return rejected(state, EDIT_HEADING, &action, &form, &errors)
            }
            Err(err) => return err.as_response(state),
        };
        match context(state)
            .connect()
            .and_then(|conn| venues::update(&conn, id, &changes))
        {
            Ok(venue) => redirect(state, &format!("/venues/{}", venue.id)),
            Err(err) => write_failed(
                state,
                err,
                &format!("An error occurred. Venue {} could not be updated.", id),
            ),
        }
    })
}

pub fn delete(state: State) -> (State, Response<Body>) {
    let id = path_id(&state);
    let response = match context(&state)
        .connect()
        .and_then(|conn| venues::delete(&conn, id))
    {
        Ok(true) => index_with_notice(
            &state,
            StatusCode::OK,
            &format!("Venue {} was successfully deleted.", id),
        ),
        Ok(false) => index_with_notice(
            &state,
            StatusCode::NOT_FOUND,
            &format!("Venue {} does not exist.", id),
        ),
        Err(err) => write_failed(
            &state,
            err,
            &format!("An error occurred. Venue {} could not be deleted.", id),
        ),
    };
    (state, response)
}

fn render_form(form: &EntityForm) -> Result<Vec<u8>, Error> {
    Ok(render_page(&form.heading, |out| templates::venue_form(out, form))?)
}

/// The submitted form again, with its problems listed.
fn rejected(
    state: &State,
    heading: &str,
    action: &str,
    form: &FormData,
    errors: &FieldErrors,
) -> Response<Body> {
    let view = EntityForm::new(heading, action, FormValues::from_form(form, "seeking_talent"))
        .with_errors(errors);
    respond_with(state, StatusCode::BAD_REQUEST, render_form(&view))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::models::NewShow;
    use crate::repository::{artists as artist_repo, fixtures, shows as show_repo, venues};
    use chrono::{NaiveDate, NaiveDateTime};
    use hyper::StatusCode;

    const HOP: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
                       &address=1015+Folsom+Street&phone=123-123-1234\
                       &genres=&genres=Jazz&genres=Reggae\
                       &website_link=https%3A%2F%2Fwww.themusicalhop.com\
                       &facebook_link=&image_link=\
                       &seeking_talent=n&seeking_talent=y\
                       &seeking_description=Looking+for+local+artists";

    #[test]
    fn created_venue_is_listed_under_its_city() {
        let (server, db) = server();
        let response = post_form(&server, "/venues/create", HOP);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).contains("Venue The Musical Hop was successfully listed!"));

        let conn = db.conn();
        let venue = venues::get(&conn, 1).unwrap();
        assert_eq!(venue.genres.0, vec!["Jazz", "Reggae"]);
        assert!(venue.seeking_talent);
        assert_eq!(venue.facebook_link, None);

        let body = body_text(get(&server, "/venues"));
        assert!(body.contains("San Francisco, CA"));
        assert!(body.contains("href=\"/venues/1\""));
    }

    #[test]
    fn invalid_venue_form_is_shown_again() {
        let (server, db) = server();
        let response = post_form(&server, "/venues/create", "name=Somewhere&state=ZZ");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response);
        assert!(body.contains("value=\"Somewhere\""));
        assert!(body.contains("city: is required"));
        assert!(body.contains("unknown state"));
        assert!(venues::choices(&db.conn()).unwrap().is_empty());
    }

    #[test]
    fn detail_page_splits_shows() {
        let (server, db) = server();
        let conn = db.conn();
        let venue = venues::create(&conn, &fixtures::venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        let artist = artist_repo::create(&conn, &fixtures::artist("Guns N Petals")).unwrap();
        for year in &[2019, 2035, 2036] {
            let start_time = NaiveDate::from_ymd_opt(*year, 5, 21).unwrap().and_hms_opt(21, 30, 0).unwrap();
            show_repo::create(&conn, &NewShow { artist_id: artist.id, venue_id: venue.id, start_time }).unwrap();
        }

        let response = get(&server, &format!("/venues/{}", venue.id));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response);
        assert!(body.contains("2 Upcoming Shows"));
        assert!(body.contains("1 Past Shows"));
        assert!(body.contains(&format!("href=\"/artists/{}\"", artist.id)));
        assert!(body.contains("Tue 05, 21, 2019 9:30PM"));
    }

    fn mid_2035() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2035, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn detail_page_splits_shows_at_the_context_clock() {
        let (server, db) = server_at(mid_2035);
        let conn = db.conn();
        let venue = venues::create(&conn, &fixtures::venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        let artist = artist_repo::create(&conn, &fixtures::artist("Guns N Petals")).unwrap();
        for year in &[2019, 2035, 2036] {
            let start_time = NaiveDate::from_ymd_opt(*year, 5, 21).unwrap().and_hms_opt(21, 30, 0).unwrap();
            show_repo::create(&conn, &NewShow { artist_id: artist.id, venue_id: venue.id, start_time }).unwrap();
        }

        let body = body_text(get(&server, &format!("/venues/{}", venue.id)));
        assert!(body.contains("1 Upcoming Shows"));
        assert!(body.contains("2 Past Shows"));
    }

    #[test]
    fn missing_venue_is_not_found() {
        let (server, _db) = server();
        assert_eq!(get(&server, "/venues/42").status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&server, "/venues/42/edit").status(), StatusCode::NOT_FOUND);
        let response = post_form(&server, "/venues/42/edit", "name=Nowhere");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn search_is_case_insensitive() {
        let (server, db) = server();
        let conn = db.conn();
        venues::create(&conn, &fixtures::venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        venues::create(&conn, &fixtures::venue("Park Square Live Music & Coffee", "San Francisco", "CA")).unwrap();
        venues::create(&conn, &fixtures::venue("The Dueling Pianos Bar", "New York", "NY")).unwrap();

        let body = body_text(post_form(&server, "/venues/search", "search_term=Music"));
        assert!(body.contains(": 2</h3>"));
        assert!(body.contains("The Musical Hop"));
        assert!(!body.contains("The Dueling Pianos Bar</a>"));
    }

    #[test]
    fn unreadable_search_body_is_a_bad_request() {
        let (server, _db) = server();
        let response = post_form(&server, "/venues/search", "search_term=a&search_term=b");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).contains("search_term"));
    }

    #[test]
    fn edit_prefills_and_redirects_to_detail() {
        let (server, db) = server();
        let conn = db.conn();
        let venue = venues::create(&conn, &fixtures::venue("The Musical Hop", "San Francisco", "CA")).unwrap();

        let body = body_text(get(&server, &format!("/venues/{}/edit", venue.id)));
        assert!(body.contains("value=\"The Musical Hop\""));
        assert!(body.contains("<option value=\"CA\" selected>"));

        let response = post_form(
            &server,
            &format!("/venues/{}/edit", venue.id),
            "name=The+Musical+Hop+Annex&phone=",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = post_form(
            &server,
            &format!("/venues/{}/edit", venue.id),
            "name=The+Musical+Hop+Annex&seeking_description=",
        );
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(hyper::header::LOCATION).unwrap(),
            &format!("/venues/{}", venue.id)
        );
        let updated = venues::get(&conn, venue.id).unwrap();
        assert_eq!(updated.name, "The Musical Hop Annex");
        assert_eq!(updated.city, "San Francisco");
        assert_eq!(updated.seeking_description, None);
    }

    #[test]
    fn delete_removes_venue_and_its_shows() {
        let (server, db) = server();
        let conn = db.conn();
        let venue = venues::create(&conn, &fixtures::venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        let artist = artist_repo::create(&conn, &fixtures::artist("Guns N Petals")).unwrap();
        let start_time = NaiveDate::from_ymd_opt(2035, 1, 1).unwrap().and_hms_opt(20, 0, 0).unwrap();
        show_repo::create(&conn, &NewShow { artist_id: artist.id, venue_id: venue.id, start_time }).unwrap();

        let response = post_form(&server, &format!("/venues/{}/delete", venue.id), "");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).contains("was successfully deleted"));
        assert!(show_repo::list(&conn).unwrap().is_empty());
        assert_eq!(get(&server, &format!("/venues/{}", venue.id)).status(), StatusCode::NOT_FOUND);

        let response = server
            .client()
            .delete(format!("http://localhost/venues/{}", venue.id))
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).contains("does not exist"));
    }
}
