// Resume screening engine.
// Implements: document text extraction, résumé / JD parsing, match scoring,
// report compilation, and the four-stage pipeline that chains them.
// All model calls go through llm_client::ModelInvoker.

pub mod documents;
pub mod extractor;
pub mod handlers;
pub mod matcher;
pub mod pipeline;
pub mod prompts;
pub mod recovery;
pub mod report;
pub mod schema;
