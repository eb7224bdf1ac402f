pub mod element;
pub mod wait;

pub use element::ElementHandler;
pub use wait::{wait_until, WaitHandler, WaitOptions};
