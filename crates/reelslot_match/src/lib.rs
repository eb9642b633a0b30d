pub mod error;
pub mod keywords;
pub mod matching;
pub mod slots;
pub mod smart;
