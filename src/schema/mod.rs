pub mod gender;
pub mod geometry;
pub mod story;
