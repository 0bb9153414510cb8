pub mod error;
pub mod io;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod stages;

pub use error::{Error, Result};
pub use io::{
    load_member_list_file, load_minutes_file, CsvEncoding, DownloadConfig, DownloadReport,
    Downloader, KhCoderText, SpeakerTable,
};
pub use models::{normalize_label, MemberList, Minutes, Person, Rosters, Speaker, Speech};
pub use parser::{parse_member_list, DocumentKind, ScannedConfig};
pub use resolver::{resolve, Resolution, Similarity};
pub use stages::{
    execute_stage0, execute_stage1, execute_stage2, execute_stage3, Stage1Config, Stage3Config,
};
