use super::{context, index_with_notice, respond, respond_with, with_body, write_failed};
use crate::context::AppContext;
use crate::error::{Error, FieldErrors};
use crate::forms::{self, FormData};
use crate::repository::{artists, shows, venues};
use crate::templates;
use crate::views::{render_page, ShowForm, ShowRow};
use gotham::handler::HandlerFuture;
use gotham::state::State;
use hyper::{Body, Response, StatusCode};

pub fn list(state: State) -> (State, Response<Body>) {
    let page = render_list(context(&state));
    let response = respond(&state, page);
    (state, response)
}

fn render_list(ctx: &AppContext) -> Result<Vec<u8>, Error> {
    let conn = ctx.connect()?;
    let rows: Vec<ShowRow> = shows::list(&conn)?
        .iter()
        .map(ShowRow::from_listing)
        .collect();
    Ok(render_page("Shows", |out| templates::shows(out, &rows))?)
}

pub fn create_form(state: State) -> (State, Response<Body>) {
    let page = render_form(context(&state), &FormData::default(), None);
    let response = respond(&state, page);
    (state, response)
}

pub fn create(state: State) -> Box<HandlerFuture> {
    with_body(state, |state, body| {
        let form = FormData::parse(body);
        let result = forms::new_show(&form).and_then(|new_show| {
            let conn = context(state).connect()?;
            shows::create(&conn, &new_show)
        });
        match result {
            Ok(_) => index_with_notice(state, StatusCode::OK, "Show was successfully listed!"),
            Err(Error::Validation(errors)) => {
                let page = render_form(context(state), &form, Some(&errors));
                respond_with(state, StatusCode::BAD_REQUEST, page)
            }
            Err(err) => write_failed(state, err, "An error occurred. Show could not be listed."),
        }
    })
}

fn render_form(
    ctx: &AppContext,
    submitted: &FormData,
    errors: Option<&FieldErrors>,
) -> Result<Vec<u8>, Error> {
    let conn = ctx.connect()?;
    let mut form = ShowForm::new(artists::choices(&conn)?, venues::choices(&conn)?, submitted);
    if let Some(errors) = errors {
        form = form.with_errors(errors);
    }
    Ok(render_page("List a new show", |out| templates::show_form(out, &form))?)
}
