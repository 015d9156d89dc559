pub mod dodge;

pub use dodge::Dodge;
