pub mod gateway;
pub mod listener;
