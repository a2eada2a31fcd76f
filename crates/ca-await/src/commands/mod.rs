pub mod check;
pub mod validate;
pub mod wait;
