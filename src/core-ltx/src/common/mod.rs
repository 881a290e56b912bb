//! Process-level helpers shared by the binaries: logging setup and environment parsing.

mod hostname;
mod logging;
mod poll_interval;

pub use hostname::{HostPortError, api_base_url, api_socket_addr};
pub use logging::setup_logging;
pub use poll_interval::{TimeUnit, poll_interval};
