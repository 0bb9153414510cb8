pub mod minutes;
pub mod person;
pub mod working_group;

pub use minutes::*;
pub use person::*;
pub use working_group::*;
