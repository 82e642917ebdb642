use crate::model::PrimaryView;
use crate::selection::SelectionStore;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SelectionContext {
    pub namespace: String,
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Resolution {
    Unselected { resource: &'static str },
    Resolved(SelectionContext),
}

pub fn resolve(view: PrimaryView, store: &SelectionStore) -> Resolution {
    let unselected = Resolution::Unselected {
        resource: view.resource_label(),
    };
    let Some(kind) = view.resource_kind() else {
        return unselected;
    };
    let Some(selected) = store.selection(view) else {
        return unselected;
    };

    match store.namespace_selection() {
        Some(namespace_row) => {
            let namespace = selected_namespace(namespace_row);
            let name = field(selected, 0);
            if namespace.is_empty() || name.is_empty() {
                return unselected;
            }
            Resolution::Resolved(SelectionContext {
                namespace,
                kind,
                name,
            })
        }
        None => {
            let namespace = field(selected, 0);
            let name = field(selected, 1);
            if name.is_empty() {
                return unselected;
            }
            Resolution::Resolved(SelectionContext {
                namespace,
                kind,
                name,
            })
        }
    }
}

pub fn is_selected_row(view: PrimaryView, store: &SelectionStore, row: &str) -> bool {
    let Some(selected) = store.selection(view) else {
        return false;
    };
    // All-namespaces listings lead with the namespace, so the name is the second field.
    let key_fields = match (view.resource_kind(), store.namespace_selection()) {
        (Some(_), None) => 2,
        _ => 1,
    };
    !field(selected, 0).is_empty()
        && (0..key_fields).all(|index| field(selected, index) == field(row, index))
}

pub fn selected_namespace(row: &str) -> String {
    field(row, 0)
}

pub fn field(row: &str, index: usize) -> String {
    row.split_whitespace()
        .nth(index)
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{Resolution, SelectionContext, field, is_selected_row, resolve};
    use crate::model::PrimaryView;
    use crate::selection::SelectionStore;

    #[test]
    fn all_namespaces_row_yields_namespace_and_name() {
        let mut store = SelectionStore::default();
        store.set_selection(
            PrimaryView::Pod,
            Some("kube-system   mypod-abc123   1/1   Running".to_string()),
        );

        assert_eq!(
            resolve(PrimaryView::Pod, &store),
            Resolution::Resolved(SelectionContext {
                namespace: "kube-system".to_string(),
                kind: "pod",
                name: "mypod-abc123".to_string(),
            })
        );
    }

    #[test]
    fn namespace_scoped_row_uses_first_field_as_name() {
        let mut store = SelectionStore::default();
        store.set_selection(
            PrimaryView::Namespace,
            Some("kube-system   Active   12d".to_string()),
        );
        store.set_selection(
            PrimaryView::Deployment,
            Some("web-deploy   3/3   3   3   4d".to_string()),
        );

        assert_eq!(
            resolve(PrimaryView::Deployment, &store),
            Resolution::Resolved(SelectionContext {
                namespace: "kube-system".to_string(),
                kind: "deployment",
                name: "web-deploy".to_string(),
            })
        );
    }

    #[test]
    fn missing_row_is_unselected_regardless_of_namespace() {
        let mut store = SelectionStore::default();
        assert_eq!(
            resolve(PrimaryView::Service, &store),
            Resolution::Unselected {
                resource: "service"
            }
        );

        store.set_selection(PrimaryView::Namespace, Some("default".to_string()));
        assert_eq!(
            resolve(PrimaryView::Service, &store),
            Resolution::Unselected {
                resource: "service"
            }
        );
    }

    #[test]
    fn single_field_row_in_all_namespaces_mode_is_unselected() {
        let mut store = SelectionStore::default();
        store.set_selection(PrimaryView::Pod, Some("lonely".to_string()));
        assert_eq!(
            resolve(PrimaryView::Pod, &store),
            Resolution::Unselected { resource: "pod" }
        );
    }

    #[test]
    fn blank_namespace_row_is_unselected() {
        let mut store = SelectionStore::default();
        store.set_selection(PrimaryView::Namespace, Some("   ".to_string()));
        store.set_selection(PrimaryView::Pod, Some("web-1   1/1".to_string()));
        assert_eq!(
            resolve(PrimaryView::Pod, &store),
            Resolution::Unselected { resource: "pod" }
        );
    }

    #[test]
    fn field_splits_on_whitespace_runs() {
        assert_eq!(field("a \t  b   c", 1), "b");
        assert_eq!(field("a", 3), "");
    }

    #[test]
    fn preselected_namespace_matches_its_listing_row() {
        let mut store = SelectionStore::default();
        store.set_selection(PrimaryView::Namespace, Some("team-a".to_string()));

        assert!(is_selected_row(
            PrimaryView::Namespace,
            &store,
            "team-a   Active   3d"
        ));
        assert!(!is_selected_row(
            PrimaryView::Namespace,
            &store,
            "team-b   Active   3d"
        ));
    }

    #[test]
    fn stored_row_keeps_matching_after_columns_change() {
        let mut store = SelectionStore::default();
        store.set_selection(PrimaryView::Namespace, Some("ops   Active   9d".to_string()));
        store.set_selection(PrimaryView::Pod, Some("web-1   1/1   Running   5m".to_string()));

        assert!(is_selected_row(
            PrimaryView::Pod,
            &store,
            "web-1   1/1   Running   6m"
        ));
        assert!(!is_selected_row(
            PrimaryView::Pod,
            &store,
            "web-2   1/1   Running   5m"
        ));
    }

    #[test]
    fn all_namespaces_rows_match_on_namespace_and_name() {
        let mut store = SelectionStore::default();
        store.set_selection(
            PrimaryView::Deployment,
            Some("ops   api   1/1   1   1   2d".to_string()),
        );

        assert!(is_selected_row(
            PrimaryView::Deployment,
            &store,
            "ops   api   1/1   1   1   3d"
        ));
        assert!(!is_selected_row(
            PrimaryView::Deployment,
            &store,
            "ops   web   1/1   1   1   2d"
        ));
        assert!(!is_selected_row(PrimaryView::Service, &store, "ops   api"));
    }
}
