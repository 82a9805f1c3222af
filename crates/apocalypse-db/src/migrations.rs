use rusqlite::Connection;
use tracing::info;

use crate::Result;

/// Timestamp expression used for both the column default and every update,
/// so rows always carry RFC 3339 UTC with millisecond precision.
pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (survivors table)");
        conn.execute_batch(&format!(
            "
            CREATE TABLE survivors (
                row_id      INTEGER PRIMARY KEY AUTOINCREMENT,
                id_number   TEXT NOT NULL,
                name        TEXT NOT NULL DEFAULT '',
                age         INTEGER NOT NULL DEFAULT 0,
                gender      TEXT NOT NULL DEFAULT '',
                longitude   REAL NOT NULL DEFAULT 0,
                latitude    REAL NOT NULL DEFAULT 0,
                water       REAL NOT NULL DEFAULT 0,
                food        TEXT NOT NULL DEFAULT '',
                medication  TEXT NOT NULL DEFAULT '',
                ammunition  INTEGER NOT NULL DEFAULT 0,
                infected    INTEGER NOT NULL DEFAULT 0,
                updated_at  TEXT NOT NULL DEFAULT ({NOW})
            );

            CREATE INDEX idx_survivors_id_number ON survivors(id_number);
            CREATE INDEX idx_survivors_infected ON survivors(infected);

            INSERT INTO schema_version (version) VALUES (1);
            "
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rerun_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
