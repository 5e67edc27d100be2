pub mod rows;
pub mod time;
