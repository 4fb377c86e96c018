mod context;
mod layer;
mod render;

pub use context::GpuContext;
pub use layer::{Layer, LayerParams};
pub use render::CompositePipeline;
