//! Robot roster proxy.
//!
//! Fetches the robot CPU list from the remote robot system on every request,
//! then applies the optional `category` filter and `sortby` ordering.

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use tracing::{debug, warn};

use apocalypse_types::api::RosterQuery;
use apocalypse_types::models::RobotCpu;

use crate::error::ApiError;
use crate::extract::QueryParams;
use crate::state::AppState;
use crate::survivors::with_cors;

/// Outbound client for the robot CPU endpoint.
pub struct RosterClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RosterClient {
    /// `timeout` bounds the whole exchange, body included. Expiry is
    /// reported as an upstream failure.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch(&self) -> Result<Vec<RobotCpu>, ApiError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(ApiError::Upstream)?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Robot endpoint {} answered {}", self.endpoint, status);
        }

        let body = resp.bytes().await.map_err(ApiError::Upstream)?;
        serde_json::from_slice(&body).map_err(ApiError::UpstreamDecode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Flying,
    Land,
}

impl Category {
    /// Exact, case-sensitive match. Unknown values mean "no filter".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Flying" => Some(Self::Flying),
            "Land" => Some(Self::Land),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flying => "Flying",
            Self::Land => "Land",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Model,
    SerialNumber,
    ManufacturedDate,
    Category,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "model" => Some(Self::Model),
            "serialNumber" => Some(Self::SerialNumber),
            "manufacturedDate" => Some(Self::ManufacturedDate),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// Filter, then stable-sort ascending. Either step is skipped when `None`.
pub fn arrange(
    mut robots: Vec<RobotCpu>,
    category: Option<Category>,
    sort: Option<SortKey>,
) -> Vec<RobotCpu> {
    if let Some(category) = category {
        robots.retain(|r| r.category == category.as_str());
    }

    match sort {
        Some(SortKey::Model) => robots.sort_by(|a, b| a.model.cmp(&b.model)),
        Some(SortKey::SerialNumber) => robots.sort_by(|a, b| a.serial_number.cmp(&b.serial_number)),
        Some(SortKey::ManufacturedDate) => {
            robots.sort_by(|a, b| a.manufactured_date.cmp(&b.manufactured_date))
        }
        Some(SortKey::Category) => robots.sort_by(|a, b| a.category.cmp(&b.category)),
        None => {}
    }

    robots
}

/// GET /robotcpu?category=&sortby=
pub async fn robot_cpus(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<impl IntoResponse, ApiError> {
    let query = RosterQuery {
        category: params.first("category").map(str::to_owned),
        sortby: params.first("sortby").map(str::to_owned),
    };
    let robots = state.roster.fetch().await?;

    let category = query.category.as_deref().and_then(Category::parse);
    let sort = query.sortby.as_deref().and_then(SortKey::parse);
    let fetched = robots.len();
    let robots = arrange(robots, category, sort);

    debug!(
        ?category,
        ?sort,
        "Robot roster: {} fetched, {} returned",
        fetched,
        robots.len()
    );
    Ok(with_cors(Json(robots)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot(model: &str, serial: &str, date: &str, category: &str) -> RobotCpu {
        RobotCpu {
            model: model.into(),
            serial_number: serial.into(),
            manufactured_date: date.parse().unwrap(),
            category: category.into(),
        }
    }

    fn models(robots: &[RobotCpu]) -> Vec<&str> {
        robots.iter().map(|r| r.model.as_str()).collect()
    }

    fn fleet() -> Vec<RobotCpu> {
        vec![
            robot("Zeta", "S3", "2021-09-03T10:00:00Z", "Flying"),
            robot("Alpha", "S1", "2019-01-01T00:00:00+02:00", "Land"),
            robot("Mid", "S2", "2020-06-15T12:30:00Z", "Flying"),
        ]
    }

    #[test]
    fn category_filter_keeps_relative_order() {
        let out = arrange(fleet(), Some(Category::Flying), None);
        assert_eq!(models(&out), ["Zeta", "Mid"]);

        let out = arrange(fleet(), Some(Category::Land), None);
        assert_eq!(models(&out), ["Alpha"]);
    }

    #[test]
    fn unknown_category_passes_everything() {
        assert_eq!(Category::parse("flying"), None);
        assert_eq!(Category::parse("Underwater"), None);
        assert_eq!(Category::parse(""), None);

        let out = arrange(fleet(), Category::parse("Underwater"), None);
        assert_eq!(models(&out), ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn sort_by_model() {
        let out = arrange(fleet(), None, SortKey::parse("model"));
        assert_eq!(models(&out), ["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn sort_by_serial_number() {
        let out = arrange(fleet(), None, Some(SortKey::SerialNumber));
        assert_eq!(models(&out), ["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn sort_by_manufactured_date_is_chronological() {
        let mut robots = fleet();
        // Same instant as Alpha expressed in another offset, inserted first.
        robots.insert(0, robot("Twin", "S0", "2018-12-31T22:00:00Z", "Land"));

        let out = arrange(robots, None, Some(SortKey::ManufacturedDate));
        assert_eq!(models(&out), ["Twin", "Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn sort_by_category_is_stable() {
        let out = arrange(fleet(), None, Some(SortKey::Category));
        assert_eq!(models(&out), ["Zeta", "Mid", "Alpha"]);
    }

    #[test]
    fn unknown_sort_key_keeps_order() {
        assert_eq!(SortKey::parse("Model"), None);
        let out = arrange(fleet(), Some(Category::Flying), SortKey::parse("weight"));
        assert_eq!(models(&out), ["Zeta", "Mid"]);
    }

    #[test]
    fn filter_then_sort() {
        let out = arrange(fleet(), Some(Category::Flying), Some(SortKey::Model));
        assert_eq!(models(&out), ["Mid", "Zeta"]);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(&fleet()[1]).unwrap();
        assert_eq!(json["serialNumber"], "S1");
        assert_eq!(json["manufacturedDate"], "2019-01-01T00:00:00+02:00");
        assert_eq!(json["category"], "Land");
    }
}
