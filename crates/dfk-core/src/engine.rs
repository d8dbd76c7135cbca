use crate::model::{Selection, SelectionRequest};
use crate::relax::relax;
use crate::rng::choose;

/// Select one option for the request's reference day.
///
/// Runs the relaxation loop, then the seeded tie-break over the survivors.
/// Returns `None` only when the catalog is empty ("no option available");
/// any non-empty catalog always yields a selection from it.
pub fn pick(request: &SelectionRequest) -> Option<Selection> {
    let relaxation = relax(
        &request.catalog,
        &request.history,
        request.rule,
        request.reference_day,
    )?;
    let chosen = choose(&relaxation.candidates, request.seed)?;
    Some(Selection {
        option_id: chosen.id,
        level: relaxation.level(),
        reason: relaxation.reason,
    })
}
