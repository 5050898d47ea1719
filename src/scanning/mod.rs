//! Scanning domain: artifact references, severities, reports and the
//! pure services that filter and order them. Nothing here performs I/O.
pub mod domain;
pub mod policies;
pub mod services;
