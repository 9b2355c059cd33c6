//! Name helpers shared by the tokenizer and the cursor.
//!
//! Contains the XML character classes with the `Name` / `Nmtoken`
//! predicates, and `QName` handling.

pub mod chars;
pub mod qname;
