pub mod align;
pub mod serve;
