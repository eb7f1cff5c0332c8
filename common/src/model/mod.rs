pub mod energy;
pub mod member;
