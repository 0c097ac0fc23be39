//! Docqa Core — shared types, configuration, errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DataPaths, DocqaConfig, Neo4jSettings};
pub use error::{Error, Result};
pub use types::{
    AnswerQualityWeights, QueryType, Violation, WorkflowContext, WorkflowResult, WorkflowType,
};
