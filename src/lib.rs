pub mod config;
pub mod error;
pub mod mix;
pub mod ytm;

pub use error::{ErrorKind, ExtractionError, Result};
pub use mix::{MixDescriptor, MixPlaylistExtractor};
pub use ytm::client::{HttpTransport, Transport};
pub use ytm::models::{ITEM_COUNT_INFINITE, ItemsPage, Localization, MixMetadata, PageDescriptor, PlaylistEntry};
