//! `ts-io`: output streams for the tsfile writer.
//!
//! The writer never touches files or paths directly.  It is handed a
//! [`OutputStream`] opened from a [`Destination`]:
//!
//! | Destination            | Stream                 | Notes                          |
//! |------------------------|------------------------|--------------------------------|
//! | `Local(path)`          | [`LocalOutputStream`]  | buffered file, optional fsync  |
//! | `Memory(sink)`         | [`MemoryOutputStream`] | shared in-process buffer       |
//!
//! Remote schemes (`hdfs://`, `s3://`, …) are recognised by
//! [`Destination::resolve`] and rejected with `ErrorKind::Unsupported`.
//!
//! All failures are plain [`std::io::Error`]s: the stream contract is an I/O
//! contract and callers classify errors by [`std::io::ErrorKind`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use ts_io::{Destination, StreamConfig};
//!
//! let dest = Destination::resolve("file:///data/out.tsfile")?;
//! let mut stream = ts_io::open(&dest, &StreamConfig::default(), false)?;
//! stream.write_all(b"...")?;
//! stream.close()?;
//! ```

pub mod config;
pub mod destination;
pub mod guard;
pub mod stream;


pub use config::StreamConfig;
pub use destination::Destination;
pub use guard::PartialFileGuard;
pub use stream::{open, LocalOutputStream, MemoryOutputStream, MemorySink, OutputStream};
