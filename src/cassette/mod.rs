//! Cassette format for recording and replaying completion calls.

pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
