//! Educational-tour survey report: load the form export, explode the
//! multi-select barriers, filter by Program and Section and aggregate into
//! report views.

pub mod aggregation;
pub mod barriers;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;
pub mod schema;
pub mod sentiment;
pub mod session;
pub mod visualization;

#[cfg(feature = "python")]
mod python;

pub use barriers::{BarrierMatch, BarrierVocabulary};
pub use cache::DatasetCache;
pub use config::ReportConfig;
pub use error::{Result, SurveyError};
pub use filter::{filter_responses, Selection};
pub use loader::{load_survey, SurveyDataset};
pub use model::SurveyModel;
pub use report::{build_report, SurveyReport};
pub use session::{AccessGate, Session};
