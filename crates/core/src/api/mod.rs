pub mod client;
pub mod navigator;
pub mod transport;

pub use client::ApiClient;
pub use navigator::{ChannelNavigator, LoggingNavigator, Navigator, LANDING_ROUTE};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
