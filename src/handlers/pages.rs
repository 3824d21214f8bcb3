use super::{respond, StaticPath};
use crate::error::Error;
use crate::templates;
use crate::templates::statics::StaticFile;
use crate::views::render_page;
use gotham::helpers::http::response::{create_empty_response, create_response};
use gotham::state::{FromState, State};
use hyper::{Body, Response, StatusCode};

pub fn index(state: State) -> (State, Response<Body>) {
    let page = render_page("Home", |out| templates::index(out, None)).map_err(Error::from);
    let response = respond(&state, page);
    (state, response)
}

pub fn static_file(state: State) -> (State, Response<Body>) {
    let response = match StaticFile::get(&StaticPath::borrow_from(&state).name) {
        Some(file) => {
            let mime = if file.name.ends_with(".css") {
                mime::TEXT_CSS
            } else {
                mime::APPLICATION_OCTET_STREAM
            };
            create_response(&state, StatusCode::OK, mime, file.content)
        }
        None => create_empty_response(&state, StatusCode::NOT_FOUND),
    };
    (state, response)
}
