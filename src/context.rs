use crate::config::Config;
use crate::db;
use crate::error::Error;
use chrono::{NaiveDateTime, Utc};
use diesel::sqlite::SqliteConnection;
use gotham::handler::HandlerFuture;
use gotham::middleware::Middleware;
use gotham::state::State;
use gotham_derive::{NewMiddleware, StateData};

/// Everything a request handler needs, put into gotham state for every
/// request by [`ContextMiddleware`].
#[derive(Clone, Debug, StateData)]
pub struct AppContext {
    config: Config,
    clock: fn() -> NaiveDateTime,
}

fn system_clock() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl AppContext {
    pub fn new(config: Config) -> AppContext {
        AppContext {
            config,
            clock: system_clock,
        }
    }

    /// Replaces the wall clock, so tests can pin what counts as upcoming.
    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> AppContext {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connect(&self) -> Result<SqliteConnection, Error> {
        db::connect(&self.config.database_url)
    }

    /// Reference time for splitting shows into past and upcoming.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

#[derive(Clone, NewMiddleware)]
pub struct ContextMiddleware {
    context: AppContext,
}

impl ContextMiddleware {
    pub fn new(context: AppContext) -> ContextMiddleware {
        ContextMiddleware { context }
    }
}

impl Middleware for ContextMiddleware {
    fn call<Chain>(self, mut state: State, chain: Chain) -> Box<HandlerFuture>
    where
        Chain: FnOnce(State) -> Box<HandlerFuture>,
    {
        state.put(self.context);
        chain(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_year_2030() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn now_reads_the_configured_clock() {
        let config = Config::for_database("unused.db");
        let pinned = AppContext::new(config.clone()).with_clock(new_year_2030);
        assert_eq!(pinned.now(), new_year_2030());

        let before = Utc::now().naive_utc();
        let now = AppContext::new(config).now();
        assert!(now >= before && now <= Utc::now().naive_utc());
    }
}
