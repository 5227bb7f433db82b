pub mod bland_altman;
pub mod categorize;
pub mod mirrored_histogram;
pub mod ticks;
