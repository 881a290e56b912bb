//! Functional core of the llms.txt service: the content model, the selection/categorization rules
//! and the markdown rendering of `llms.txt` and `llms-full.txt`, plus helpers shared by the binaries.

pub mod common;
pub mod content;
mod errors;
pub mod i18n;
pub mod rule_gen;

pub use common::{HostPortError, TimeUnit, api_base_url, api_socket_addr, poll_interval, setup_logging};
pub use content::{ContentSnapshot, ContentSource, ContentTree, JsonFileSource, PageId, Site, StaticSource};
pub use errors::Error;
pub use i18n::{LanguageDimension, RequestInfo, Translator};
pub use rule_gen::{Documents, GenerateOptions, Generator, LlmsConfig};

/// File name the index document is served and written as.
pub const INDEX_FILE_NAME: &str = "llms.txt";

/// File name the full-content document is served and written as.
pub const FULL_FILE_NAME: &str = "llms-full.txt";
