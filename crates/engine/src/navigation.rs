//! Page navigation over the ordered page list.
//!
//! Pages are ordered by `sort_order` (ties keep their published order) and
//! never by `page_number`. The virtual `Start` and `End` positions frame the
//! form and carry no fields.

use formfill_types::{Field, Page, PageId};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::store::ResponseStore;
use crate::validation::{ValidationFailure, first_failure};

/// Route value selecting the leading sentinel page.
pub const START_ROUTE: &str = "start";
/// Route value selecting the trailing sentinel page.
pub const END_ROUTE: &str = "end";

/// Where the respondent currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "position", content = "index")]
pub enum NavPosition {
    Start,
    /// Index into the sorted page list.
    Page(usize),
    End,
}

/// Result of a navigation request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Advanced(NavPosition),
    Retreated(NavPosition),
    /// `next` on the last page; nothing moved.
    StayedOnLastPage,
    /// `back` on the first page; nothing moved.
    StayedOnFirstPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{0}")]
    Validation(#[from] ValidationFailure),
}

#[derive(Debug, Clone)]
pub struct PageNavigator {
    pages: Vec<Page>,
    position: NavPosition,
}

impl PageNavigator {
    /// Order `pages` and pick the initial position from `route`.
    ///
    /// `route` may be `start`, `end` or a page id. Anything else, including
    /// no route, selects the lowest-`sort_order` page.
    pub fn new(mut pages: Vec<Page>, route: Option<&str>) -> Self {
        pages.sort_by_key(|page| page.sort_order);

        let first = if pages.is_empty() {
            NavPosition::Start
        } else {
            NavPosition::Page(0)
        };
        let position = match route.map(str::trim) {
            Some(START_ROUTE) => NavPosition::Start,
            Some(END_ROUTE) => NavPosition::End,
            Some(route) => pages
                .iter()
                .position(|page| page.id.as_str() == route)
                .map(NavPosition::Page)
                .unwrap_or(first),
            None => first,
        };

        Self { pages, position }
    }

    /// Pages in navigation order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn position(&self) -> NavPosition {
        self.position
    }

    pub fn current_page(&self) -> Option<&Page> {
        match self.position {
            NavPosition::Page(index) => self.pages.get(index),
            NavPosition::Start | NavPosition::End => None,
        }
    }

    pub fn current_page_id(&self) -> Option<&PageId> {
        self.current_page().map(|page| &page.id)
    }

    /// Validate the current page and move to the next one.
    ///
    /// Only required fields whose `page_id` matches the current page are
    /// checked. On failure the position is unchanged. A form without pages
    /// validates every field and stays where it is.
    pub fn next(&mut self, fields: &[Field], store: &ResponseStore) -> Result<NavOutcome, NavigationError> {
        if self.pages.is_empty() {
            first_failure(fields, store)?;
            return Ok(NavOutcome::StayedOnLastPage);
        }

        let outcome = match self.position {
            NavPosition::Start => self.move_to(NavPosition::Page(0), NavOutcome::Advanced),
            NavPosition::Page(index) => {
                let page_id = &self.pages[index].id;
                first_failure(fields.iter().filter(|field| field.is_on_page(page_id)), store)?;
                if index + 1 < self.pages.len() {
                    self.move_to(NavPosition::Page(index + 1), NavOutcome::Advanced)
                } else {
                    NavOutcome::StayedOnLastPage
                }
            }
            NavPosition::End => NavOutcome::StayedOnLastPage,
        };
        debug!(?outcome, "navigation next");
        Ok(outcome)
    }

    /// Move to the previous page. Never validates.
    pub fn back(&mut self) -> NavOutcome {
        let outcome = match self.position {
            NavPosition::Page(index) if index > 0 => self.move_to(NavPosition::Page(index - 1), NavOutcome::Retreated),
            NavPosition::End if !self.pages.is_empty() => {
                self.move_to(NavPosition::Page(self.pages.len() - 1), NavOutcome::Retreated)
            }
            _ => NavOutcome::StayedOnFirstPage,
        };
        debug!(?outcome, "navigation back");
        outcome
    }

    /// Jump to the trailing sentinel after a successful submission.
    pub fn finish(&mut self) {
        self.position = NavPosition::End;
    }

    fn move_to(&mut self, position: NavPosition, outcome: fn(NavPosition) -> NavOutcome) -> NavOutcome {
        self.position = position;
        outcome(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_types::{FieldKind, ResponseValue};
    use formfill_util::InMemoryDraftStore;
    use std::sync::Arc;

    /// page_number runs opposite to sort_order.
    fn pages() -> Vec<Page> {
        vec![Page::new("p3", 1, 30), Page::new("p1", 3, 10), Page::new("p2", 2, 20)]
    }

    fn store() -> ResponseStore {
        ResponseStore::new("1", Arc::new(InMemoryDraftStore::new()))
    }

    fn ids(navigator: &PageNavigator) -> Vec<&str> {
        navigator.pages().iter().map(|page| page.id.as_str()).collect()
    }

    #[test]
    fn orders_by_sort_order_not_page_number() {
        let navigator = PageNavigator::new(pages(), None);
        assert_eq!(ids(&navigator), vec!["p1", "p2", "p3"]);
        assert_eq!(navigator.current_page_id(), Some(&PageId::from("p1")));
    }

    #[test]
    fn next_and_back_walk_sorted_pages() {
        let mut navigator = PageNavigator::new(pages(), None);
        let store = store();

        assert_eq!(navigator.next(&[], &store).unwrap(), NavOutcome::Advanced(NavPosition::Page(1)));
        assert_eq!(navigator.next(&[], &store).unwrap(), NavOutcome::Advanced(NavPosition::Page(2)));
        assert_eq!(navigator.next(&[], &store).unwrap(), NavOutcome::StayedOnLastPage);
        assert_eq!(navigator.current_page_id(), Some(&PageId::from("p3")));

        assert_eq!(navigator.back(), NavOutcome::Retreated(NavPosition::Page(1)));
        assert_eq!(navigator.back(), NavOutcome::Retreated(NavPosition::Page(0)));
        assert_eq!(navigator.back(), NavOutcome::StayedOnFirstPage);
    }

    #[test]
    fn route_selects_initial_page() {
        assert_eq!(PageNavigator::new(pages(), Some("p2")).position(), NavPosition::Page(1));
        assert_eq!(PageNavigator::new(pages(), Some("start")).position(), NavPosition::Start);
        assert_eq!(PageNavigator::new(pages(), Some("end")).position(), NavPosition::End);
        assert_eq!(PageNavigator::new(pages(), Some("missing")).position(), NavPosition::Page(0));
    }

    #[test]
    fn start_sentinel_advances_without_validation() {
        let mut navigator = PageNavigator::new(pages(), Some("start"));
        let fields = vec![Field::new("1", FieldKind::Checkbox).with_required(true).with_page("p1")];

        assert_eq!(
            navigator.next(&fields, &store()).unwrap(),
            NavOutcome::Advanced(NavPosition::Page(0))
        );
    }

    #[test]
    fn unanswered_required_checkbox_blocks_next() {
        let mut navigator = PageNavigator::new(pages(), None);
        let store = store();
        let fields = vec![Field::new("1", FieldKind::Checkbox).with_required(true).with_page("p1")];

        let NavigationError::Validation(failure) = navigator.next(&fields, &store).unwrap_err();
        assert_eq!(failure.field_id.as_str(), "1");
        assert_eq!(navigator.position(), NavPosition::Page(0));
        assert!(store.is_empty());
    }

    #[test]
    fn only_current_page_fields_are_validated() {
        let mut navigator = PageNavigator::new(pages(), None);
        let mut store = store();
        let fields = vec![
            Field::new("1", FieldKind::ShortAnswer).with_required(true).with_page("p1"),
            Field::new("2", FieldKind::ShortAnswer).with_required(true).with_page("p2"),
        ];
        store
            .set("1".into(), FieldKind::ShortAnswer, ResponseValue::Text("done".into()))
            .unwrap();

        assert_eq!(
            navigator.next(&fields, &store).unwrap(),
            NavOutcome::Advanced(NavPosition::Page(1))
        );
        assert!(navigator.next(&fields, &store).is_err());
    }

    #[test]
    fn ties_keep_published_order() {
        let navigator = PageNavigator::new(vec![Page::new("b", 1, 0), Page::new("a", 2, 0)], None);
        assert_eq!(ids(&navigator), vec!["b", "a"]);
    }

    #[test]
    fn back_from_end_returns_to_last_page() {
        let mut navigator = PageNavigator::new(pages(), None);
        navigator.finish();
        assert_eq!(navigator.back(), NavOutcome::Retreated(NavPosition::Page(2)));
    }
}
