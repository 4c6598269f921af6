//! Format decoders: raw collector record values in, rows out.
//!
//! Each wire format gets one [`RowDecoder`]; the [`RowParser`] holds the
//! ordered decoder chain and exposes the uniform value/stream entry points.

pub mod container;
pub mod envelope;
pub mod envelope_stream;
pub mod error;
pub mod parser;
pub mod text;
pub mod traits;
pub mod tree;
pub mod value;

pub use container::ContainerDecoder;
pub use envelope::{EnvelopeDecoder, EnvelopeEvent, EnvelopeEventReader, EnvelopeField, EnvelopeWriter};
pub use envelope_stream::{EnvelopeStreamDecoder, ENVELOPE_SUFFIX};
pub use error::CodecError;
pub use parser::RowParser;
pub use text::{LineStreamDecoder, TextDecoder, TEXT_TYPE};
pub use traits::{BufferedRowsReader, RowDecoder, StreamRowDecoder, DEFAULT_BUFFER_SIZE};
pub use tree::{TreeDecoder, TreeDocument, TreeStreamDecoder, TREE_SUFFIX};
pub use value::{ByteStream, RecordValue};
