//! HTTP routes and the glue between requests, the repository and templates.

use crate::context::{AppContext, ContextMiddleware};
use crate::error::Error;
use crate::templates;
use crate::views::render_page;
use futures::{Future, Stream};
use gotham::handler::{Handler, HandlerFuture};
use gotham::helpers::http::response::{create_empty_response, create_response};
use gotham::pipeline::new_pipeline;
use gotham::pipeline::single::single_pipeline;
use gotham::router::{builder::*, Router};
use gotham::state::{FromState, State};
use gotham_derive::{StateData, StaticResponseExtender};
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Method, Response, StatusCode, Uri};
use serde_derive::Deserialize;
use std::time::Instant;
use tracing::info;

mod artists;
mod pages;
mod shows;
mod venues;

/// The router wrapped with request logging and error pages for the
/// responses the router produces on its own (unknown route, bad path).
#[derive(Clone)]
pub struct Site {
    router: Router,
}

impl Site {
    pub fn new(context: AppContext) -> Site {
        Site {
            router: router(context),
        }
    }
}

impl Handler for Site {
    fn handle(self, state: State) -> Box<HandlerFuture> {
        let method = Method::borrow_from(&state).clone();
        let path = Uri::borrow_from(&state).path().to_owned();
        let started = Instant::now();

        let f = self.router.handle(state).map(move |(state, response)| {
            let response = fill_empty_error(&state, response);
            info!(
                %method,
                path = path.as_str(),
                status = response.status().as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request"
            );
            (state, response)
        });
        Box::new(f)
    }
}

fn fill_empty_error(state: &State, response: Response<Body>) -> Response<Body> {
    if response.headers().contains_key(CONTENT_TYPE) {
        return response;
    }
    let rendered = match response.status() {
        StatusCode::BAD_REQUEST => {
            render_page("Bad request", |out| templates::bad_request(out, "Malformed request"))
        }
        StatusCode::NOT_FOUND => {
            render_page("Not found", |out| templates::not_found(out, "Page not found"))
        }
        StatusCode::INTERNAL_SERVER_ERROR => {
            render_page("Server error", |out| templates::server_error(out))
        }
        _ => return response,
    };
    match rendered {
        Ok(body) => create_response(state, response.status(), mime::TEXT_HTML_UTF_8, body),
        Err(_) => response,
    }
}

fn router(context: AppContext) -> Router {
    let (chain, pipelines) =
        single_pipeline(new_pipeline().add(ContextMiddleware::new(context)).build());

    build_router(chain, pipelines, |route| {
        route.get("/").to(pages::index);
        route
            .get("/static/:name")
            .with_path_extractor::<StaticPath>()
            .to(pages::static_file);

        route.get("/venues").to(venues::list);
        route.post("/venues/search").to(venues::search);
        route.get("/venues/create").to(venues::create_form);
        route.post("/venues/create").to(venues::create);
        route
            .get("/venues/:id")
            .with_path_extractor::<IdPath>()
            .to(venues::show);
        route
            .delete("/venues/:id")
            .with_path_extractor::<IdPath>()
            .to(venues::delete);
        route
            .post("/venues/:id/delete")
            .with_path_extractor::<IdPath>()
            .to(venues::delete);
        route
            .get("/venues/:id/edit")
            .with_path_extractor::<IdPath>()
            .to(venues::edit_form);
        route
            .post("/venues/:id/edit")
            .with_path_extractor::<IdPath>()
            .to(venues::edit);

        route.get("/artists").to(artists::list);
        route.post("/artists/search").to(artists::search);
        route.get("/artists/create").to(artists::create_form);
        route.post("/artists/create").to(artists::create);
        route
            .get("/artists/:id")
            .with_path_extractor::<IdPath>()
            .to(artists::show);
        route
            .delete("/artists/:id")
            .with_path_extractor::<IdPath>()
            .to(artists::delete);
        route
            .post("/artists/:id/delete")
            .with_path_extractor::<IdPath>()
            .to(artists::delete);
        route
            .get("/artists/:id/edit")
            .with_path_extractor::<IdPath>()
            .to(artists::edit_form);
        route
            .post("/artists/:id/edit")
            .with_path_extractor::<IdPath>()
            .to(artists::edit);

        route.get("/shows").to(shows::list);
        route.get("/shows/create").to(shows::create_form);
        route.post("/shows/create").to(shows::create);
    })
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
struct IdPath {
    id: i32,
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
struct StaticPath {
    name: String,
}

fn context(state: &State) -> &AppContext {
    AppContext::borrow_from(state)
}

fn path_id(state: &State) -> i32 {
    IdPath::borrow_from(state).id
}

/// An HTML page with status 200, or the error page for `err`.
fn respond(state: &State, page: Result<Vec<u8>, Error>) -> Response<Body> {
    respond_with(state, StatusCode::OK, page)
}

fn respond_with(state: &State, status: StatusCode, page: Result<Vec<u8>, Error>) -> Response<Body> {
    match page {
        Ok(body) => create_response(state, status, mime::TEXT_HTML_UTF_8, body),
        Err(err) => err.as_response(state),
    }
}

/// Reads the whole request body, then hands it to `handle`.
fn with_body<F>(mut state: State, handle: F) -> Box<HandlerFuture>
where
    F: FnOnce(&State, &[u8]) -> Response<Body> + Send + 'static,
{
    let f = Body::take_from(&mut state)
        .concat2()
        .then(move |body| match body {
            Ok(body) => {
                let response = handle(&state, &body.into_bytes());
                Ok((state, response))
            }
            Err(err) => {
                let response = Error::Inner(Box::new(err)).as_response(&state);
                Ok((state, response))
            }
        });
    Box::new(f)
}

fn redirect(state: &State, to: &str) -> Response<Body> {
    let mut response = create_empty_response(state, StatusCode::SEE_OTHER);
    match to.parse() {
        Ok(location) => {
            response
                .headers_mut()
                .insert(hyper::header::LOCATION, location);
            response
        }
        Err(err) => Error::Inner(Box::new(err)).as_response(state),
    }
}

/// The landing page carrying a one-line notice about what just happened.
fn index_with_notice(state: &State, status: StatusCode, notice: &str) -> Response<Body> {
    let page = render_page("Home", |out| templates::index(out, Some(notice)));
    respond_with(state, status, page.map_err(Error::from))
}

/// Notice for a write that failed for a reason other than bad input.
fn write_failed(state: &State, err: Error, notice: &str) -> Response<Body> {
    match err {
        Error::NotFound { .. } | Error::Validation(..) => err.as_response(state),
        err => {
            tracing::error!(error = ?err, "write failed");
            index_with_notice(state, err.status_code(), notice)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use hyper::StatusCode;

    #[test]
    fn landing_page_links_every_section() {
        let (server, _db) = server();
        let response = get(&server, "/");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response);
        assert!(body.contains("href=\"/venues/create\""));
        assert!(body.contains("href=\"/shows\""));
        assert!(body.contains("</html>"));
    }

    #[test]
    fn unknown_route_renders_not_found_page() {
        let (server, _db) = server();
        let response = get(&server, "/no/such/page");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).contains("404"));
    }

    #[test]
    fn stylesheet_is_served() {
        let (server, _db) = server();
        let body = body_text(get(&server, "/"));
        let start = body.find("/static/").expect("stylesheet link");
        let end = start + body[start..].find('"').expect("closing quote");
        let href = &body[start..end];

        let response = get(&server, href);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(hyper::header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
        assert_eq!(
            get(&server, "/static/missing.css").status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn malformed_id_is_a_bad_request() {
        let (server, _db) = server();
        let response = get(&server, "/venues/not-a-number");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).contains("400"));
    }
}
