//! Core parsing primitives
//!
//! The building blocks shared by the document builder and the DTD parser:
//! - Encoding: byte order mark detection and code unit width
//! - Scanner: code unit cursor over the raw input
//! - Entities: the fixed named-reference table
//! - Tokenizer: single pass from code units to classified tokens
//! - Cursor: lookahead over the token stream
//! - ContentModel: element content-model grammar
//! - DTD: element declarations and array queries

pub mod content_model;
pub mod cursor;
pub mod dtd;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
