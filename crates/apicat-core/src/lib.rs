pub mod aggregate;
pub mod classify;
pub mod dedupe;
pub mod document;
pub mod error;
pub mod extract;
pub mod method;
pub mod naming;
pub mod options;
pub mod project;
pub mod resolve;

pub use document::SpecDocument;
pub use error::ParseError;
pub use method::HttpMethod;
pub use options::OptionsIndex;
pub use project::{build_catalog, Catalog};
