//! Byte sources and the row file reader built on top of them.

pub mod error;
pub mod local;
pub mod reader;
pub mod traits;

pub use error::{first_line, ByteSourceError, ReaderError};
pub use local::LocalFileSystem;
pub use reader::{RowFileReader, RowFileReaderFactory};
pub use traits::{ByteSource, PathStat};
