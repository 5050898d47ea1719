use crate::application::read_models::OutputDocument;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// YamlFormatter adapter emitting YAML via serde_yaml_ng
pub struct YamlFormatter;

impl YamlFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn render<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_yaml_ng::to_string(value)?)
    }
}

impl Default for YamlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for YamlFormatter {
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
    fn test_format_yaml() {
        let doc = OutputDocument {
            data: json!([{"repository": "app", "reference": "v1"}]),
            table: TableView::default(),
        };
        let output = YamlFormatter::new().format(&doc).unwrap();
        assert!(output.contains("repository: app"));
        assert!(output.contains("reference: v1"));

        let parsed: serde_json::Value = serde_yaml_ng::from_str(&output).unwrap();
        assert_eq!(parsed[0]["reference"], "v1");
    }
}
