pub mod config;
pub mod error;
pub mod transport;

pub use config::{Config, ViewerConfig};
pub use error::{ArchiveError, ArchiveResult};
pub use transport::{ArchiveTransport, HttpResponse, HttpTransport};
