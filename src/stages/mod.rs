pub mod stage0_rosters;
pub mod stage1_segment;
pub mod stage2_resolve;
pub mod stage3_render;

pub use stage0_rosters::*;
pub use stage1_segment::*;
pub use stage2_resolve::*;
pub use stage3_render::*;
