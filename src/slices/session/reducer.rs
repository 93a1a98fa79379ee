use std::sync::Arc;

use crate::mvi::{Action, ReduceError, Reducer};
use crate::slices::session::intent::{SessionIntent, SET_PAGE};
use crate::slices::session::state::SessionState;

pub struct SessionReducer;

impl Reducer for SessionReducer {
    const KEY: &'static str = "session";
    type State = SessionState;

    fn reduce(state: Arc<Self::State>, action: &Action) -> Result<Arc<Self::State>, ReduceError> {
        let Some(intent) = SessionIntent::from_action(action)? else {
            return Ok(state);
        };

        match intent {
            SessionIntent::SetFilter(filter) => {
                let mut next = (*state).clone();
                next.kind = filter.kind;
                next.search = filter
                    .search
                    .map(|search| search.trim().to_string())
                    .unwrap_or_default();
                // A new filter invalidates the page the user was on.
                next.page = 1;
                Ok(Arc::new(next))
            }
            SessionIntent::SetPage(page) => {
                if page.page == 0 || page.page_size == Some(0) {
                    return Err(ReduceError::Rejected {
                        action: SET_PAGE.to_string(),
                        reason: "page and page size start at 1".to_string(),
                    });
                }
                let mut next = (*state).clone();
                next.page = page.page;
                if let Some(size) = page.page_size {
                    next.page_size = size;
                }
                Ok(Arc::new(next))
            }
            SessionIntent::Reset => Ok(Arc::new(SessionState::default())),
        }
    }
}
