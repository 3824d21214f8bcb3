use crate::error::Error;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use tracing::{debug, info};

embed_migrations!("migrations");

/// Opens a connection to the SQLite database at `database_url`, with foreign
/// key enforcement switched on.
pub fn connect(database_url: &str) -> Result<SqliteConnection, Error> {
    let path = database_url.trim_start_matches("sqlite://");
    debug!(path, "opening database connection");
    let conn = SqliteConnection::establish(path)?;
    conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
    Ok(conn)
}

pub fn run_migrations(conn: &SqliteConnection) -> Result<(), Error> {
    embedded_migrations::run(conn)?;
    info!("database schema is up to date");
    Ok(())
}
