pub mod driver;
pub mod manager;

pub use driver::{DriverInfo, DriverKind, DriverTrait};
pub use manager::{DriverManager, ScopedDriver};
