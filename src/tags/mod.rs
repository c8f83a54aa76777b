//! Tags

pub mod string;

pub use string::StringTagCollection;
