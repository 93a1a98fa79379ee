use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mvi::{Action, ReduceError};
use crate::slices::session::state::TransactionKind;
use crate::slices::user::LOGOUT;

pub const SET_FILTER: &str = "session/setFilter";
pub const SET_PAGE: &str = "session/setPage";
pub const RESET: &str = "session/reset";

/// The complete filter of the transaction listing.
///
/// It replaces the previous filter as a whole: an absent `kind` lists all
/// kinds and an absent `search` matches everything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPayload {
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePayload {
    pub page: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionIntent {
    SetFilter(FilterPayload),
    SetPage(PagePayload),
    /// Explicit reset, or the user signed out.
    Reset,
}

impl SessionIntent {
    pub fn from_action(action: &Action) -> Result<Option<Self>, ReduceError> {
        let intent = match action.kind() {
            SET_FILTER => Self::SetFilter(action.payload_as()?),
            SET_PAGE => Self::SetPage(action.payload_as()?),
            RESET | LOGOUT => Self::Reset,
            _ => return Ok(None),
        };
        Ok(Some(intent))
    }
}

impl From<SessionIntent> for Action {
    fn from(intent: SessionIntent) -> Self {
        match intent {
            SessionIntent::SetFilter(filter) => Action::new(SET_FILTER)
                .with_payload(serde_json::to_value(filter).unwrap_or(Value::Null)),
            SessionIntent::SetPage(page) => Action::new(SET_PAGE)
                .with_payload(serde_json::to_value(page).unwrap_or(Value::Null)),
            SessionIntent::Reset => Action::new(RESET),
        }
    }
}
