pub mod buffer;
pub mod mp;
