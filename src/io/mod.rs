pub mod download;
pub mod input;
pub mod output;

pub use download::{DownloadConfig, DownloadReport, Downloader, COUNCIL_INDEX_URL};
pub use input::{list_html_files, load_member_list_file, load_minutes_file, load_working_groups};
pub use output::{write_json, CsvEncoding, KhCoderText, SpeakerTable};
