pub mod compositor;
pub mod layout;
pub mod lint;
pub mod morph;
pub mod render;
pub mod rules;
pub mod shaping;
