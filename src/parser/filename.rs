use std::sync::LazyLock;

use regex::Regex;

use crate::models::Minutes;

static WORKING_GROUP_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"no([0-9]{2})wg([0-9]{3})-.+htm").expect("working group file name pattern")
});

static ROSTER_ORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"no([0-9]{2})").expect("roster order pattern"));

/// Order and identifier encoded in a downloaded file name
///
/// `no03wg057-1234.htm` yields `("03", "057")`.
pub fn working_group_info(file_name: &str) -> Option<(String, String)> {
    let caps = WORKING_GROUP_INFO.captures(file_name)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Working-group order of a roster file name (`no03wg057-meibo.htm` -> "03")
pub fn roster_order(file_name: &str) -> Option<String> {
    ROSTER_ORDER
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// Fill order and id on `minutes`; leaves them empty when the name does not match
pub(crate) fn apply_working_group_info(minutes: &mut Minutes, file_name: &str) {
    if let Some((order, id)) = working_group_info(file_name) {
        minutes.working_group_order = order;
        minutes.working_group_id = id;
    }
}
