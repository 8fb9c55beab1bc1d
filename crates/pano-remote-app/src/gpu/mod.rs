pub mod context;
pub mod fullscreen_quad;
pub mod panorama;

pub use context::GpuContext;
