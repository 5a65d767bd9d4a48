pub mod compose;
pub mod emoji;
pub mod format;
pub mod response;
