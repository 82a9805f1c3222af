use apocalypse_types::models::Survivor;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use tracing::warn;

/// Column list matching `SurvivorRow::from_row`.
pub(crate) const SURVIVOR_COLUMNS: &str = "name, age, gender, id_number, longitude, latitude, \
     water, food, medication, ammunition, infected, updated_at";

/// One row of the `survivors` table. Distinct from the API model so the
/// timestamp parsing stays in the DB layer.
pub struct SurvivorRow {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub id_number: String,
    pub longitude: f64,
    pub latitude: f64,
    pub water: f64,
    pub food: String,
    pub medication: String,
    pub ammunition: i64,
    pub infected: bool,
    pub updated_at: String,
}

impl SurvivorRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            age: row.get(1)?,
            gender: row.get(2)?,
            id_number: row.get(3)?,
            longitude: row.get(4)?,
            latitude: row.get(5)?,
            water: row.get(6)?,
            food: row.get(7)?,
            medication: row.get(8)?,
            ammunition: row.get(9)?,
            infected: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    pub fn into_survivor(self) -> Survivor {
        let timestamp = parse_timestamp(&self.updated_at).unwrap_or_else(|| {
            warn!("Corrupt updated_at '{}' on survivor '{}'", self.updated_at, self.id_number);
            DateTime::default()
        });

        Survivor {
            name: self.name,
            age: self.age,
            gender: self.gender,
            id: self.id_number,
            longitude: self.longitude,
            latitude: self.latitude,
            water: self.water,
            food: self.food,
            medication: self.medication,
            ammunition: self.ammunition,
            infected: self.infected,
            timestamp,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            // Rows written by hand with datetime('now') have no zone marker.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_millis() {
        let ts = parse_timestamp("2022-03-11T08:19:35.250Z").unwrap();
        assert_eq!(ts.year(), 2022);
        assert_eq!(ts.second(), 35);
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn parses_sqlite_datetime() {
        let ts = parse_timestamp("2022-03-11 08:19:35").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
