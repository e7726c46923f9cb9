pub mod export;
pub mod hub;
pub mod sync;
