pub mod blocks;
pub mod compose;
pub mod export;
pub mod layout;
