//! Binary codec for cbuf messages.
//!
//! Three entry points, all operating against the read-only schema maps
//! built by `cbuf-resolve`:
//!
//! - [`serialized_message_size`] — exact framed size of a message
//! - [`serialize_message`] — message record → framed bytes
//! - [`deserialize_message`] — framed bytes → message record
//!
//! The wire format is little-endian with a 24-byte preamble per non-naked
//! struct (see `frame`). The codec holds no state of its own; callers may
//! decode concurrently against the same maps, but must not mutate a map
//! while a call is in flight.

pub mod decode;
pub mod encode;
pub mod error;
pub mod frame;
pub mod metadata;
pub mod size;

mod scalar;

pub use decode::deserialize_message;
pub use encode::serialize_message;
pub use error::{CodecError, Result};
pub use frame::{HEADER_SIZE, MAGIC};
pub use metadata::{METADATA_DEF, METADATA_HASH, METADATA_TYPE_NAME};
pub use size::{naked_size, serialized_message_size};
