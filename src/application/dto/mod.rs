/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod output_format;
mod output_settings;
mod reports_request;

pub use output_format::OutputFormat;
pub use output_settings::OutputSettings;
pub use reports_request::ReportsRequest;
