pub mod entity;
pub mod geometry;
pub mod levels;
pub mod timer;
pub mod toast;
