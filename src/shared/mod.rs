pub mod errors;
pub mod fs_atomic;
pub mod ids;
pub mod serde_ext;
pub mod time;
