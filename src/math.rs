//! Math types for susurrus

pub use glam::Vec3;
