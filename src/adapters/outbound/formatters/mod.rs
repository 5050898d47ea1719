/// Formatter adapters for the supported output formats
mod json_formatter;
mod table_formatter;
mod yaml_formatter;

pub use json_formatter::JsonFormatter;
pub use table_formatter::TableFormatter;
pub use yaml_formatter::YamlFormatter;
