pub mod assign;
pub mod serve;
