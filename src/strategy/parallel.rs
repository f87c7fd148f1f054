//! Parallel Batch Parsing
//!
//! Uses Rayon to parse independent documents concurrently. Each parse
//! owns its tokens and tree; the only shared value is the `Parser`, whose
//! loader is `Sync`.

use rayon::prelude::*;

use crate::dom::Document;
use crate::error::ParseErrors;
use crate::parser::Parser;

/// Parse each input, returning results in input order
pub fn parse_batch(parser: &Parser<'_>, inputs: &[&[u8]]) -> Vec<Result<Document, ParseErrors>> {
    log::debug!(target: "glyphxml::parallel", "parsing batch of {}", inputs.len());
    inputs.par_iter().map(|input| parser.parse(input)).collect()
}

/// Parse each input and map successful documents
pub fn parse_map<F, T>(
    parser: &Parser<'_>,
    inputs: &[&[u8]],
    mapper: F,
) -> Vec<Result<T, ParseErrors>>
where
    F: Fn(&Document) -> T + Sync + Send,
    T: Send,
{
    inputs
        .par_iter()
        .map(|input| parser.parse(input).map(|doc| mapper(&doc)))
        .collect()
}
