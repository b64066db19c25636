pub mod assemble;
pub mod cache;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod paginate;
pub mod segment;
pub mod synth;

pub use assemble::{concat_in_order, write_audio};
pub use cache::AudioCache;
pub use encoding::{decode_body, resolve_encoding};
pub use error::{AuditoError, Result};
pub use extract::{Article, extract_article};
pub use fetch::{FetchConfig, FetchedPage, fetch_page};
pub use paginate::{NextLinks, assemble_article, find_next_link, scan_next_links};
pub use segment::{Segment, split_into_segments};
pub use synth::{SynthConfig, dispatch_segments, synthesize_segment, synthesize_to_file};
