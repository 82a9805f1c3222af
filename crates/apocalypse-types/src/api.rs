use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Resources;

// Request payloads decode missing fields to their zero values, the way the
// existing clients expect.

// -- Survivors --

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewSurvivor {
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
    /// Accepted on the wire but never stored; the store stamps its own time.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateLocationRequest {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateResourcesRequest {
    pub id: String,
    pub water: f64,
    pub food: String,
    pub medication: String,
    pub ammunition: i64,
}

impl UpdateResourcesRequest {
    pub fn into_parts(self) -> (String, Resources) {
        (
            self.id,
            Resources {
                water: self.water,
                food: self.food,
                medication: self.medication,
                ammunition: self.ammunition,
            },
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetInfectedRequest {
    pub id: String,
}

#[derive(Debug, Default)]
pub struct InfectedQuery {
    pub status: Option<String>,
}

impl InfectedQuery {
    /// Only the literal `"false"` selects healthy survivors. Anything else,
    /// including a missing or empty parameter, selects infected ones.
    pub fn infected(&self) -> bool {
        self.status.as_deref() != Some("false")
    }
}

// -- Stats --

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivorStats {
    pub healthy_percentage: f64,
    pub infected_percentage: f64,
}

impl SurvivorStats {
    pub fn from_counts(healthy: u64, infected: u64) -> Self {
        let total = (healthy + infected) as f64;
        if total == 0.0 {
            return Self {
                healthy_percentage: 0.0,
                infected_percentage: 0.0,
            };
        }
        Self {
            healthy_percentage: healthy as f64 / total * 100.0,
            infected_percentage: infected as f64 / total * 100.0,
        }
    }
}

// -- Robot roster --

#[derive(Debug, Default)]
pub struct RosterQuery {
    pub category: Option<String>,
    pub sortby: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_infected() {
        let q = |s: Option<&str>| InfectedQuery { status: s.map(String::from) };
        assert!(q(None).infected());
        assert!(q(Some("")).infected());
        assert!(q(Some("true")).infected());
        assert!(q(Some("FALSE")).infected());
        assert!(q(Some("no")).infected());
        assert!(!q(Some("false")).infected());
    }

    #[test]
    fn stats_on_empty_population_are_zero() {
        let stats = SurvivorStats::from_counts(0, 0);
        assert_eq!(stats.healthy_percentage, 0.0);
        assert_eq!(stats.infected_percentage, 0.0);
    }

    #[test]
    fn stats_split_percentages() {
        let stats = SurvivorStats::from_counts(1, 3);
        assert_eq!(stats.healthy_percentage, 25.0);
        assert_eq!(stats.infected_percentage, 75.0);

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["healthyPercentage"], 25.0);
        assert_eq!(json["infectedPercentage"], 75.0);
    }

    #[test]
    fn new_survivor_missing_fields_are_zeroed() {
        let s: NewSurvivor = serde_json::from_str(r#"{"id":"HD1","name":"Jane Doe"}"#).unwrap();
        assert_eq!(s.id, "HD1");
        assert_eq!(s.age, 0);
        assert_eq!(s.water, 0.0);
        assert!(!s.infected);
        assert!(s.timestamp.is_none());
    }

    #[test]
    fn new_survivor_rejects_wrong_types() {
        assert!(serde_json::from_str::<NewSurvivor>(r#"{"age":"old"}"#).is_err());
    }

    #[test]
    fn resources_request_splits() {
        let req: UpdateResourcesRequest = serde_json::from_str(
            r#"{"id":"HD1","water":0,"food":"Fish, Bread","medication":"Antibiotics"}"#,
        )
        .unwrap();
        let (id, res) = req.into_parts();
        assert_eq!(id, "HD1");
        assert_eq!(res.food, "Fish, Bread");
        assert_eq!(res.ammunition, 0);
    }
}
