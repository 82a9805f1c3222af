use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A tracked survivor as stored and served by the API.
///
/// `id` is the external identity number supplied by the client. The store
/// does not enforce uniqueness on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survivor {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub water: f64,
    pub food: String,
    pub medication: String,
    pub ammunition: i64,
    pub infected: bool,
    /// Last write time, assigned by the store.
    pub timestamp: DateTime<Utc>,
}

/// The resource fields touched by a resources update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub water: f64,
    pub food: String,
    pub medication: String,
    pub ammunition: i64,
}

impl Survivor {
    pub fn resources(&self) -> Resources {
        Resources {
            water: self.water,
            food: self.food.clone(),
            medication: self.medication.clone(),
            ammunition: self.ammunition,
        }
    }
}

/// Robot CPU descriptor as published by the remote robot system.
/// Never persisted locally.
///
/// Missing or `null` fields decode to their defaults (the Unix epoch for the
/// date), so one sparse entry does not fail the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotCpu {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial_number: String,
    /// Keeps the upstream offset so it round-trips unchanged.
    #[serde(default, deserialize_with = "null_as_default")]
    pub manufactured_date: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
