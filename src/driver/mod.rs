pub mod chrome;
pub mod http;
pub mod hybrid;

pub use chrome::ChromeDriver;
pub use http::HttpDriver;
pub use hybrid::{DriverMode, HybridDriver};
