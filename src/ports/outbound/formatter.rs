use crate::application::read_models::OutputDocument;
use crate::shared::Result;

/// ReportFormatter port for rendering output documents
///
/// This port abstracts the output encoding (table, JSON, YAML) so use cases
/// and commands stay independent of how results are printed.
pub trait ReportFormatter {
    /// Formats a read model
    ///
    /// # Arguments
    /// * `document` - Structured data plus its tabular projection
    ///
    /// # Returns
    /// The rendered text, terminated by a newline
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, document: &OutputDocument) -> Result<String>;
}
