use crate::application::dto::OutputFormat;

/// Rendering options resolved once per invocation and passed to every command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub no_color: bool,
    pub debug: bool,
}

impl OutputSettings {
    pub fn new(format: OutputFormat, no_color: bool, debug: bool) -> Self {
        Self {
            format,
            no_color,
            debug,
        }
    }
}
