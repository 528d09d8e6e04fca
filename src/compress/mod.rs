//! The two compression strategies and their progress reporting

pub mod aggressive;
pub mod progress;
pub mod smart;

pub use aggressive::{compress_aggressive, AggressiveReport};
pub use progress::{ProgressSink, Recorder, Silent, Stage, StatusLine};
pub use smart::{compress_smart, SkippedImage, SmartReport};
