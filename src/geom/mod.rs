mod bbox;
mod geom;
mod proj;
mod rings;

use bbox::BoundingBox;
pub(crate) use bbox::bounds_of;
pub use geom::Geometries;
pub use proj::Projector;
pub use rings::{assemble_multipolygon, stitch_rings};
