pub mod document;
pub mod map;
pub mod visualize;
