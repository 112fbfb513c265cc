pub mod chrome;

pub use chrome::{ChromeDriver, LaunchOptions};
