pub mod city;
pub mod colors;
pub mod danger;
pub mod dataset;
pub mod detail;
pub mod geo;
pub mod governorates;
pub mod hover;
pub mod marker;
pub mod tile_source;

pub use city::{CityId, CityRecord};
pub use danger::{DANGER_THRESHOLD, DangerClass, classify};
pub use dataset::{Dataset, DatasetKey, DetailLabels};
pub use detail::DetailView;
pub use hover::{HoverSelection, MarkerPointerEvent, pointer_transition};
pub use marker::{MarkerAppearance, MarkerSpec, MarkerStyle, layout_markers};
pub use tile_source::TileSource;
