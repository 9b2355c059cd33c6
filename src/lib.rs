//! # xmlcursor
//!
//! Cursor-based ("pull") navigation over XML. A single cursor walks the
//! document node by node in document order; nothing is built in memory
//! beyond the node under the cursor, its attributes and the namespace
//! scopes of the open elements.
//!
//! ## Quick Start
//!
//! ```
//! use xmlcursor::{XmlCursor, XmlNodeType};
//!
//! let mut cursor = XmlCursor::new("<root><child>Hello</child></root>");
//! assert!(cursor.read_element());
//! assert_eq!(cursor.name(), Some("root"));
//! assert!(cursor.read_element());
//! assert_eq!(cursor.read_string(), "Hello");
//! assert_eq!(cursor.node_type(), XmlNodeType::Text);
//! ```
//!
//! The cursor is driven by a [`tokenizer::TokenSource`]. The bundled
//! [`tokenizer::Tokenizer`] checks well-formedness and expands references;
//! any other source of raw tokens can be plugged in through
//! [`XmlCursor::from_source`].

pub mod cursor;
pub mod encoding;
pub mod error;
pub mod tokenizer;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use cursor::{CursorOptions, ReadState, XmlCursor, XmlNodeType};
pub use encoding::TextEncoding;
