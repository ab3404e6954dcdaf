pub mod poll;
pub mod serde;
