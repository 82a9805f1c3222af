pub mod docs;
pub mod error;
pub mod extract;
pub mod report;
pub mod roster;
pub mod routes;
pub mod state;
pub mod survivors;

pub use error::ApiError;
pub use routes::{StaticAssets, router};
pub use state::{AppState, AppStateInner};
