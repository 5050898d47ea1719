use crate::adapters::outbound::formatters::{JsonFormatter, TableFormatter, YamlFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::ReportFormatter;

/// Factory for creating output formatters
///
/// This factory encapsulates the creation logic for different formatter implementations,
/// following the Factory Pattern. It belongs in the application layer as it orchestrates
/// the selection of infrastructure adapters based on application needs.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified output format
    ///
    /// # Examples
    /// ```
    /// use hrbcli::application::dto::OutputFormat;
    /// use hrbcli::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Json);
    /// ```
    pub fn create(format: OutputFormat) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Table => Box::new(TableFormatter::new()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Yaml => Box::new(YamlFormatter::new()),
        }
    }

    /// Formatter for report files written to an output directory
    ///
    /// Report files hold structured data, so the table format maps to JSON.
    pub fn create_for_files(format: OutputFormat) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Yaml => Box::new(YamlFormatter::new()),
            OutputFormat::Table | OutputFormat::Json => Box::new(JsonFormatter::new()),
        }
    }
}
