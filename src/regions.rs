//! Region masks and photometric statistics over channel planes.

pub mod angles;
pub mod mask;
pub mod path;
pub mod rectangle;
pub mod statistics;

pub use angles::{AngularSpan, normalize_angle_deg};
pub use mask::{RegionMask, RegionSpec, annular_sector, build_mask, circle, closed_path, sector};
pub use path::{parse_path, point_in_polygon};
pub use rectangle::{Rectangle, rectangle_sector};
pub use statistics::{ChannelExtraction, ExtractionOutput, reduce, reduce_channels};
