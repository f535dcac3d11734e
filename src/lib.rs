pub mod error;
pub mod io_stream;
pub mod header;
pub mod recovery;
pub mod codec;
pub mod index;
pub mod slice;
pub mod table;
pub mod types;
pub mod sanitize;
pub mod strict;
pub mod variant;
pub mod archive;

pub use error::{NmoError, Result};
pub use header::{ContainerHeader, HeaderLayout, HEADER_SIZE};
pub use codec::{decompress_exact, StreamEncoding};
pub use index::{parse_component_table, ComponentRecord};
pub use slice::{build_object_slices, ObjectSlice};
pub use table::TableEntry;
pub use variant::{ContainerVariant, DecodedContainer};
pub use archive::{ExtractOptions, NmoArchive};
