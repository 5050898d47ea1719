use crate::application::read_models::OutputDocument;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// JsonFormatter adapter emitting pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Renders any serializable value the way command output is rendered
    pub fn render<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, document: &OutputDocument) -> Result<String> {
        Self::render(&document.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::read_models::TableView;
    use serde_json::json;

    #[test]
    fn test_format_pretty_prints_data() {
        let doc = OutputDocument {
            data: json!({"repository": "app", "critical": 1}),
            table: TableView::default(),
        };
        let output = JsonFormatter::new().format(&doc).unwrap();
        assert!(output.contains("\"repository\": \"app\""));
        assert!(output.ends_with("}\n"));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["critical"], 1);
    }
}
