//! Extraction of YouTube mixes: auto-generated playlists seeded from one
//! video that never end.

pub mod collector;
pub mod continuation;
pub mod descriptor;
pub mod extractor;
pub mod thumbnail;

pub use collector::{PanelVideoExtractor, StreamItemExtractor};
pub use descriptor::MixDescriptor;
pub use extractor::{MixPlaylistExtractor, MixState};
