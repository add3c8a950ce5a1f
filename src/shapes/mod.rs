mod polygon;
mod pocket;

pub use self::polygon::{Cushion, CushionData, Edge, Polygon};
pub use self::pocket::{Pocket, PocketData};
