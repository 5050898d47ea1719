/// Ports module defining interfaces for hexagonal architecture
///
/// Only driven ports exist: commands call use cases directly, and use cases
/// reach the Harbor API, console and file system through these traits.
pub mod outbound;
