mod network;
mod tags;

pub use network::{RawNode, RawStreetGraph, StreetEdge, StreetNetwork, StreetNode};
pub use tags::{has_sidewalk, TagValue};
