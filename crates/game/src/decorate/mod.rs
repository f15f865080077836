mod ground;
mod props;

pub use ground::{paint_ground, GroundReport};
pub use props::{place_props, PropError, PropKind, PropReport};
