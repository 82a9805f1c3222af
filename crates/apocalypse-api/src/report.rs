use std::path::Path;

use axum::{extract::State, response::Html};
use thiserror::Error;
use tracing::{debug, info};

use apocalypse_types::models::Survivor;

use crate::error::ApiError;
use crate::state::AppState;

/// Placeholder in the report template that receives the table rows.
pub const ROWS_MARKER: &str = "<!-- survivors -->";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template {0} has no <!-- survivors --> marker")]
    MissingMarker(String),
}

/// A type that can be laid out as one row of the HTML report.
pub trait ReportRow {
    fn cells(&self) -> Vec<String>;
}

impl ReportRow for Survivor {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.age.to_string(),
            self.gender.clone(),
            self.id.clone(),
            self.longitude.to_string(),
            self.latitude.to_string(),
            self.water.to_string(),
            self.food.clone(),
            self.medication.clone(),
            self.ammunition.to_string(),
            self.infected.to_string(),
            self.timestamp.to_rfc3339(),
        ]
    }
}

/// HTML page split around `ROWS_MARKER`. Loaded once at startup.
pub struct ReportTemplate {
    name: String,
    head: String,
    tail: String,
}

impl ReportTemplate {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let template = Self::parse(path.display().to_string(), &source)?;
        info!("Report template loaded from {}", path.display());
        Ok(template)
    }

    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, TemplateError> {
        let name = name.into();
        let Some((head, tail)) = source.split_once(ROWS_MARKER) else {
            return Err(TemplateError::MissingMarker(name));
        };
        Ok(Self {
            head: head.to_string(),
            tail: tail.to_string(),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render<R: ReportRow>(&self, rows: &[R]) -> String {
        let mut out = String::with_capacity(self.head.len() + self.tail.len() + rows.len() * 256);
        out.push_str(&self.head);
        for row in rows {
            out.push_str("<tr>");
            for cell in row.cells() {
                out.push_str("<td>");
                push_escaped(&mut out, &cell);
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str(&self.tail);
        out
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

/// GET /reportweb
pub async fn report(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let survivors = state.with_db(|db| db.get_all_survivors()).await??;
    debug!("Rendering report {} with {} rows", state.report.name(), survivors.len());
    Ok(Html(state.report.render(&survivors)))
}
