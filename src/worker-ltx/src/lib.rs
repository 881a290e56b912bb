pub mod env;
pub mod errors;
pub mod service;

pub use env::{
    BLOB_DIR_VAR, CONTENT_SNAPSHOT_VAR, DATABASE_POOL_SIZE_VAR, DATABASE_URL_VAR, LLMS_CONFIG_VAR, service_from_env,
};
pub use errors::Error;
pub use service::{GenerationReport, GenerationService, LIVE_WORKSPACE, PublishOutcome};
