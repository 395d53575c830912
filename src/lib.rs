//! A Protocol-Buffers-compatible wire encoder and schema reflection core:
//! a chunked, fork/reset/finish byte `Writer`, and a reflection tree
//! (`Namespace` → `Type`/`Enum`/`Service` → `Field`/`Method`) that resolves
//! symbolic type references and dispatches per-field encoding.

pub mod buffer_writer;
pub mod error;
mod longbits;
mod ordered_map;
pub mod reflection;
mod sink;
mod types_table;
mod varint;
mod wire_type;
pub mod writer;

pub use buffer_writer::BufferWriter;
pub use error::{Error, Result};
pub use longbits::LongBits;
pub use reflection::{Node, NodeId, NodeKind, OptionValue, Root};
pub use sink::ScalarWrite;
pub use wire_type::WireType;
pub use writer::Writer;
