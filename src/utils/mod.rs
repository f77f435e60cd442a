// URL handling utilities
pub mod query_string;
pub mod url_builder;
pub mod url_parser;

// JSON utilities
pub mod json_converter;

pub use json_converter::value_to_short_string;
pub use query_string::build_query_string;
pub use url_builder::absolute_url;
pub use url_parser::hostname_from_url;
