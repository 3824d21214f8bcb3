#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

use crate::config::Config;
use crate::context::AppContext;
use crate::error::Error;
use clap::{App, Arg, ArgMatches, SubCommand};
use tracing::{error, info};

mod config;
mod context;
mod db;
mod error;
mod forms;
mod handlers;
mod logging;
mod models;
mod repository;
mod schema;
mod seed;
mod views;

include!(concat!(env!("OUT_DIR"), "/templates.rs"));

fn main() {
    let matches = App::new("venue-booking")
        .about("Directory of live music venues, artists and the shows booked between them")
        .arg(
            Arg::with_name("settings")
                .long("settings")
                .value_name("PATH")
                .default_value("settings")
                .help("Settings file, without extension"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .value_name("PORT")
                .help("Port to listen on"),
        )
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Log at debug level unless RUST_LOG is set"),
        )
        .subcommand(SubCommand::with_name("serve").about("Serve the site (default)"))
        .subcommand(SubCommand::with_name("migrate").about("Apply database migrations and exit"))
        .subcommand(
            SubCommand::with_name("seed").about("Apply migrations and insert the demo directory"),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        error!(error = ?err, "exiting");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    dotenvy::dotenv().ok();

    let port = match matches.value_of("port") {
        Some(port) => Some(
            port.parse::<u16>()
                .map_err(|err| Error::Inner(Box::new(err)))?,
        ),
        None => None,
    };
    let config = Config::load(matches.value_of("settings").unwrap_or("settings"), port)?;
    logging::init_tracing(&config.log, matches.is_present("debug"))?;

    let conn = db::connect(&config.database_url)?;
    db::run_migrations(&conn)?;

    match matches.subcommand_name() {
        Some("migrate") => Ok(()),
        Some("seed") => {
            seed::seed(&conn)?;
            Ok(())
        }
        _ => {
            drop(conn);
            serve(config);
            Ok(())
        }
    }
}

fn serve(config: Config) {
    let context = AppContext::new(config);
    let addr = context.config().bind_address();
    let site = handlers::Site::new(context);
    info!(%addr, "listening");
    gotham::start(addr, move || Ok(site.clone()));
}
