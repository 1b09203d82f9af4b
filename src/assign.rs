//! Assignee resolution
//!
//! Decides which household member is responsible for one occurrence of a
//! chore. Rotation is a pure function of (template, day): a polynomial
//! hash of the template id plus the epoch day index, reduced modulo the
//! member count. No ledger read, no state, so every device computes the
//! same answer for the same day without any synchronization.

use crate::calendar::{day_index, parse_day_key};
use crate::database::{AssigneeMode, ChoreTemplate, Member};

/// Base-31 polynomial hash over the template id's characters, folded
/// into a u32 with wrapping arithmetic
fn template_hash(template_id: &str) -> u32 {
    template_id
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

/// Resolve the member responsible for `template` on `day_key`.
///
/// - `Anyone`: no specific member; anyone may act.
/// - `Fixed`: the configured member, or `None` when that member has left
///   the household.
/// - `Rotating`: deterministic rotation through `members` in order; the
///   ordering of the slice is significant input.
///
/// An empty member list or an unparseable day key degrades to a total
/// result rather than an error.
pub fn resolve_assignee<'a>(
    template: &ChoreTemplate,
    day_key: &str,
    members: &'a [Member],
) -> Option<&'a Member> {
    match template.assignee_mode {
        AssigneeMode::Anyone => None,
        AssigneeMode::Fixed => {
            let fixed_id = template.fixed_assignee_id.as_deref()?;
            members.iter().find(|m| m.id == fixed_id)
        }
        AssigneeMode::Rotating => {
            if members.is_empty() {
                return None;
            }
            let day = parse_day_key(day_key).map(day_index).unwrap_or(0);
            let index =
                (template_hash(&template.id) as i64 + day).rem_euclid(members.len() as i64);
            members.get(index as usize)
        }
    }
}

/// Display name for an optional assignee; empty when anyone may act
pub fn assignee_label(assignee: Option<&Member>) -> String {
    assignee.map(|m| m.name.clone()).unwrap_or_default()
}
