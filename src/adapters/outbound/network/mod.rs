/// Network adapters for the Harbor REST API
mod api_client;
mod harbor_repository;

pub use api_client::{ClientOptions, HarborClient};
pub use harbor_repository::HarborRepository;
