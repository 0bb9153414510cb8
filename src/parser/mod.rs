pub mod catalog;
pub mod filename;
pub mod html;
pub mod roster;
pub mod scanned;
pub mod segmenter;

pub use filename::{roster_order, working_group_info};
pub use roster::parse_member_list;
pub use scanned::ScannedConfig;
pub use segmenter::{SegmentState, SpeechAssembler};

/// How a transcript document was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Published as HTML
    Html,
    /// Converted from PDF
    Scanned,
}
