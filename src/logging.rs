//! Console logging through `tracing`.
//!
//! `RUST_LOG` wins when set; otherwise the configured `log` level is used,
//! or `debug` when running with `--debug`.

use crate::error::Error;
use tracing_subscriber::EnvFilter;

pub fn init_tracing(log: &str, debug: bool) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(Error::Inner)
}

fn default_directive(log: &str, debug: bool) -> &str {
    if debug {
        "debug"
    } else {
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_overrides_configured_level() {
        assert_eq!(default_directive("warn", false), "warn");
        assert_eq!(default_directive("warn", true), "debug");
    }
}
