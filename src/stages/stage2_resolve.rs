use tracing::{debug, info, warn};

use crate::models::{Minutes, Rosters};
use crate::resolver::resolve;

/// Result of Stage 2 resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage2Result {
    pub speakers_resolved: usize,
    pub speakers_unresolved: usize,
    /// Transcripts whose working group has no roster
    pub minutes_without_roster: usize,
}

/// Execute Stage 2: resolve every speaker against its working group's roster
///
/// Successful resolutions write the member id and score back into the
/// speaker. Failures are logged and leave the speaker unresolved.
pub fn execute_stage2(minutes: &mut [Minutes], rosters: &Rosters) -> Stage2Result {
    let mut result = Stage2Result::default();

    for m in minutes.iter_mut() {
        let Some(member_list) = rosters.get(&m.working_group_order) else {
            debug!("No roster for {:?} (order {:?})", m.title, m.working_group_order);
            result.minutes_without_roster += 1;
            continue;
        };

        for speaker in m.speakers.iter_mut() {
            let resolution = resolve(member_list, &speaker.label);
            match resolution.check() {
                Ok((person, score)) => {
                    debug!("Resolved {} -> {} ({}, {:.3})", speaker.label, person.label, person.id, score);
                    speaker.person = Some(person.id);
                    speaker.resolution_score = score;
                    result.speakers_resolved += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    speaker.person = None;
                    speaker.resolution_score = 0.0;
                    result.speakers_unresolved += 1;
                }
            }
        }
    }

    info!(
        "Stage 2: {} speakers resolved, {} unresolved, {} transcripts without roster",
        result.speakers_resolved, result.speakers_unresolved, result.minutes_without_roster
    );
    result
}
