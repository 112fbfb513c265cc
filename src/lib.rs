pub mod browser;
pub mod error;
pub mod locator;
pub mod probe;
pub mod verdict;
pub mod visibility;

// Re-export commonly used items
pub use browser::chrome::{ChromeDriver, LaunchOptions};
pub use error::ProbeError;
pub use locator::{default_candidates, LocatorCandidate, ResolvedCta, Resolution, Strategy};
pub use probe::ProbeConfig;
pub use verdict::{Outcome, Verdict};
pub use visibility::{BoundingBox, CheckPoint, ContainmentPolicy, CtaSnapshot, Phase, ViewportSize};
