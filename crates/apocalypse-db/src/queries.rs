use apocalypse_types::api::NewSurvivor;
use apocalypse_types::models::{Resources, Survivor};
use rusqlite::{Connection, params};

use crate::migrations::NOW;
use crate::models::{SURVIVOR_COLUMNS, SurvivorRow};
use crate::{Database, Result, UpdateOutcome};

impl Database {
    // -- Writes --

    /// Append a survivor row. No duplicate detection on `id`.
    pub fn insert_survivor(&self, survivor: &NewSurvivor) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO survivors (name, age, gender, id_number, longitude, latitude,
                                        water, food, medication, ammunition, infected)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    survivor.name,
                    survivor.age,
                    survivor.gender,
                    survivor.id,
                    survivor.longitude,
                    survivor.latitude,
                    survivor.water,
                    survivor.food,
                    survivor.medication,
                    survivor.ammunition,
                    survivor.infected,
                ],
            )?;
            Ok(())
        })
    }

    pub fn update_location(&self, id: &str, longitude: f64, latitude: f64) -> Result<UpdateOutcome> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                &format!(
                    "UPDATE survivors SET longitude = ?1, latitude = ?2, updated_at = {NOW}
                     WHERE id_number = ?3"
                ),
                params![longitude, latitude, id],
            )?;
            Ok(UpdateOutcome::from_changes(rows))
        })
    }

    pub fn update_resources(&self, id: &str, resources: &Resources) -> Result<UpdateOutcome> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                &format!(
                    "UPDATE survivors
                     SET water = ?1, food = ?2, medication = ?3, ammunition = ?4, updated_at = {NOW}
                     WHERE id_number = ?5"
                ),
                params![
                    resources.water,
                    resources.food,
                    resources.medication,
                    resources.ammunition,
                    id
                ],
            )?;
            Ok(UpdateOutcome::from_changes(rows))
        })
    }

    /// Mark a survivor infected. There is no way back.
    pub fn update_infected(&self, id: &str) -> Result<UpdateOutcome> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                &format!("UPDATE survivors SET infected = 1, updated_at = {NOW} WHERE id_number = ?1"),
                [id],
            )?;
            Ok(UpdateOutcome::from_changes(rows))
        })
    }

    // -- Reads --

    /// First row carrying `id`, if any.
    pub fn get_survivor(&self, id: &str) -> Result<Option<Survivor>> {
        self.with_conn(|conn| query_survivor_by_id(conn, id))
    }

    /// Full scan in store order. Callers must not rely on the ordering.
    pub fn get_all_survivors(&self) -> Result<Vec<Survivor>> {
        self.with_conn(|conn| {
            query_survivors(conn, &format!("SELECT {SURVIVOR_COLUMNS} FROM survivors"), [])
        })
    }

    pub fn get_survivors_by_infected(&self, infected: bool) -> Result<Vec<Survivor>> {
        self.with_conn(|conn| {
            query_survivors(
                conn,
                &format!("SELECT {SURVIVOR_COLUMNS} FROM survivors WHERE infected = ?1"),
                [infected],
            )
        })
    }

    pub fn count_by_infected(&self, infected: bool) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM survivors WHERE infected = ?1",
                [infected],
                |row| row.get(0),
            )?;
            u64::try_from(count)
                .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count).into())
        })
    }
}

fn query_survivor_by_id(conn: &Connection, id: &str) -> Result<Option<Survivor>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SURVIVOR_COLUMNS} FROM survivors WHERE id_number = ?1 ORDER BY row_id LIMIT 1"
    ))?;

    let row = stmt.query_row([id], SurvivorRow::from_row).optional()?;

    Ok(row.map(SurvivorRow::into_survivor))
}

fn query_survivors<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Survivor>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map(params, SurvivorRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(SurvivorRow::into_survivor).collect())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
