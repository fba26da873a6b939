pub mod color;
pub mod error;
pub mod path;
pub mod time;
pub mod value;
