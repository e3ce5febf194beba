pub mod release;

pub use release::{Channel, Release, ReleaseKey};
