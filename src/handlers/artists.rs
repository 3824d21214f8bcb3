use super::{
    context, index_with_notice, path_id, redirect, respond, respond_with, with_body, write_failed,
};
use crate::context::AppContext;
use crate::error::{Error, FieldErrors};
use crate::forms::{self, FormData, FormValues, SearchForm};
use crate::repository::artists;
use crate::templates;
use crate::views::{render_page, ArtistPage, EntityForm};
use gotham::handler::HandlerFuture;
use gotham::state::State;
use hyper::{Body, Response, StatusCode};

const NEW_HEADING: &str = "List a new artist";
const EDIT_HEADING: &str = "Edit artist";

pub fn list(state: State) -> (State, Response<Body>) {
    let page = render_list(context(&state));
    let response = respond(&state, page);
    (state, response)
}

fn render_list(ctx: &AppContext) -> Result<Vec<u8>, Error> {
    let conn = ctx.connect()?;
    let artists = artists::list(&conn, ctx.now())?;
    Ok(render_page("Artists", |out| templates::artists(out, &artists))?)
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
    let results = artists::search(&conn, &form.search_term, ctx.now())?;
    Ok(render_page("Artist search", |out| {
        templates::search(out, "artists", &form.search_term, &results)
    })?)
}

pub fn show(state: State) -> (State, Response<Body>) {
    let page = render_detail(context(&state), path_id(&state));
    let response = respond(&state, page);
    (state, response)
}

fn render_detail(ctx: &AppContext, id: i32) -> Result<Vec<u8>, Error> {
    let conn = ctx.connect()?;
    let page = ArtistPage::new(&artists::detail(&conn, id, ctx.now())?);
    Ok(render_page(&page.artist.name, |out| {
        templates::artist(&mut *out, &page)?;
        templates::schedule(out, "venues", &page.schedule)
    })?)
}

pub fn create_form(state: State) -> (State, Response<Body>) {
    let form = EntityForm::new(NEW_HEADING, "/artists/create", FormValues::default());
    let response = respond(&state, render_form(&form));
    (state, response)
}

pub fn create(state: State) -> Box<HandlerFuture> {
    with_body(state, |state, body| {
        let form = FormData::parse(body);
        let new_artist = match forms::new_artist(&form) {
            Ok(new_artist) => new_artist,
            Err(Error::Validation(errors)) => {
                return rejected(state, NEW_HEADING, "/artists/create", &form, &errors)
            }
            Err(err) => return err.as_response(state),
        };
        match context(state)
            .connect()
            .and_then(|conn| artists::create(&conn, &new_artist))
        {
            Ok(artist) => index_with_notice(
                state,
                StatusCode::OK,
                &format!("Artist {} was successfully listed!", artist.name),
            ),
            Err(err) => write_failed(
                state,
                err,
                &format!("An error occurred. Artist {} could not be listed.", new_artist.name),
            ),
        }
    })
}

pub fn edit_form(state: State) -> (State, Response<Body>) {
    let id = path_id(&state);
    let page = context(&state)
        .connect()
        .and_then(|conn| artists::get(&conn, id))
        .and_then(|artist| {
            let action = format!("/artists/{}/edit", id);
            render_form(&EntityForm::new(
                EDIT_HEADING,
                &action,
                FormValues::from_artist(&artist),
            ))
        });
    let response = respond(&state, page);
    (state, response)
}

pub fn edit(state: State) -> Box<HandlerFuture> {
    let id = path_id(&state);
    with_body(state, move |state, body| {
        let form = FormData::parse(body);
        let action = format!("/artists/{}/edit", id);
        let changes = match forms::artist_changes(&form) {
            Ok(changes) => changes,
            Err(Error::Validation(errors)) => {
                return rejected(state, EDIT_HEADING, &action, &form, &errors)
            }
            Err(err) => return err.as_response(state),
        };
        match context(state)
            .connect()
            .and_then(|conn| artists::update(&conn, id, &changes))
        {
            Ok(artist) => redirect(state, &format!("/artists/{}", artist.id)),
            Err(err) => write_failed(
                state,
                err,
                &format!("An error occurred. Artist {} could not be updated.", id),
            ),
        }
    })
}

pub fn delete(state: State) -> (State, Response<Body>) {
    let id = path_id(&state);
    let response = match context(&state)
        .connect()
        .and_then(|conn| artists::delete(&conn, id))
    {
        Ok(true) => index_with_notice(
            &state,
            StatusCode::OK,
            &format!("Artist {} was successfully deleted.", id),
        ),
        Ok(false) => index_with_notice(
            &state,
            StatusCode::NOT_FOUND,
            &format!("Artist {} does not exist.", id),
        ),
        Err(err) => write_failed(
            &state,
            err,
            &format!("An error occurred. Artist {} could not be deleted.", id),
        ),
    };
    (state, response)
}

fn render_form(form: &EntityForm) -> Result<Vec<u8>, Error> {
    Ok(render_page(&form.heading, |out| templates::artist_form(out, form))?)
}

fn rejected(
    state: &State,
    heading: &str,
    action: &str,
    form: &FormData,
    errors: &FieldErrors,
) -> Response<Body> {
    let view = EntityForm::new(heading, action, FormValues::from_form(form, "seeking_venue"))
        .with_errors(errors);
    respond_with(state, StatusCode::BAD_REQUEST, render_form(&view))
}
