// Library exports for fiveprime
pub mod alignment;
pub mod cigar;
pub mod error;
pub mod format;
pub mod read;
pub mod stream;

pub use alignment::{AlignmentParser, Strand};
pub use error::{ReadError, Result};
pub use format::{detect_format, AlignmentFormat};
pub use read::{Parsed, Read, Rendering};
pub use stream::{extract_five_prime_bases, ExtractConfig, StreamSummary};
