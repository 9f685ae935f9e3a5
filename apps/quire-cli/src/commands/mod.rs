pub mod edit;
pub mod info;
pub mod serve;
