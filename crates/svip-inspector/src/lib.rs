pub mod client;
pub mod delay;
pub mod error;

pub use client::{ImageDimensions, ImageInspector};
pub use delay::ProcessingDelay;
pub use error::InspectorError;
