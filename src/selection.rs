use crate::model::PrimaryView;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    slots: [Option<String>; 5],
}

impl SelectionStore {
    pub fn selection(&self, view: PrimaryView) -> Option<&str> {
        self.slots[view.index()].as_deref()
    }

    pub fn set_selection(&mut self, view: PrimaryView, text: Option<String>) {
        self.slots[view.index()] = text;
    }

    pub fn clear(&mut self, view: PrimaryView) {
        self.slots[view.index()] = None;
    }

    /// The Namespace slot is scoping state rather than a row pick and survives.
    pub fn clear_on_focus(&mut self, focused: PrimaryView) {
        for view in PrimaryView::ALL {
            if view == focused || view == PrimaryView::Namespace {
                continue;
            }
            if self.slots[view.index()].take().is_some() {
                debug!("cleared selection of {view} after focusing {focused}");
            }
        }
    }

    pub fn namespace_selection(&self) -> Option<&str> {
        self.selection(PrimaryView::Namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionStore;
    use crate::model::PrimaryView;

    fn populated() -> SelectionStore {
        let mut store = SelectionStore::default();
        for view in PrimaryView::ALL {
            store.set_selection(view, Some(format!("{} row", view.title())));
        }
        store
    }

    #[test]
    fn focus_clears_siblings_but_keeps_namespace() {
        let mut store = populated();
        store.clear_on_focus(PrimaryView::Pod);

        assert_eq!(store.selection(PrimaryView::Pod), Some("Pods row"));
        assert_eq!(store.namespace_selection(), Some("Namespaces row"));
        assert_eq!(store.selection(PrimaryView::Service), None);
        assert_eq!(store.selection(PrimaryView::Deployment), None);
        assert_eq!(store.selection(PrimaryView::ClusterInfo), None);
    }

    #[test]
    fn focusing_any_panel_never_clears_namespace() {
        for view in PrimaryView::ALL {
            let mut store = populated();
            store.clear_on_focus(view);
            assert_eq!(store.namespace_selection(), Some("Namespaces row"));
        }
    }

    #[test]
    fn clearing_is_idempotent() {
        let mut store = SelectionStore::default();
        store.clear_on_focus(PrimaryView::Service);
        store.clear_on_focus(PrimaryView::Service);
        store.clear(PrimaryView::Pod);
        assert_eq!(store.selection(PrimaryView::Pod), None);
    }
}
