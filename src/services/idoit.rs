//! i-doit export reducer

use tracing::debug;

use crate::models::{IdoitAction, IdoitOutcome, Rule};
use crate::services::reducer::{OutcomeReducer, ReduceContext};
use crate::utils::AppResult;

/// First matching rule wins per field
#[derive(Debug, Clone, Copy, Default)]
pub struct IdoitReducer;

impl OutcomeReducer for IdoitReducer {
    type Action = IdoitAction;
    type Outcome = IdoitOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<IdoitAction>,
        _ctx: &mut ReduceContext<'_>,
        outcome: &mut IdoitOutcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            match action {
                IdoitAction::IdDeviceTypeSync(attribute) => {
                    let attribute = attribute.trim();
                    if outcome.id_device_type_sync.is_none() && !attribute.is_empty() {
                        outcome.id_device_type_sync = Some(attribute.to_string());
                    }
                }
                IdoitAction::IgnoreHost => outcome.ignore_host = true,
                IdoitAction::Unknown { action, .. } => {
                    debug!("Rule '{}': unknown action '{}' skipped", rule.name, action);
                }
            }
        }
        Ok(())
    }
}
