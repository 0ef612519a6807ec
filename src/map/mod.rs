pub mod layers;
pub mod projection;
pub mod viewport;

pub use layers::BaseLayer;
pub use layers::LayerVisibility;
pub use viewport::View;
pub use viewport::Viewport;
