use tracing::debug;

use crate::labels::{extract_label_terms, selector_query};
use crate::model::{NavigationPath, PrimaryView, SecondaryOption};
use crate::navigation::NavigationController;
use crate::panels::DetailPane;
use crate::query::{QueryRequest, ResourceQuery};
use crate::resolver::{Resolution, SelectionContext, resolve, selected_namespace};
use crate::selection::SelectionStore;

pub const DEFAULT_LOGS_TAIL: u32 = 200;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RenderRoutine {
    ClusterNodes,
    TopNodes,
    NamespaceListing { kind: &'static str, wide: bool },
    Config,
    Describe,
    PodLog,
    PodTop,
    SelectorPods,
    SelectorLogs,
    SelectorTopPods,
}

pub fn route(path: NavigationPath) -> Option<RenderRoutine> {
    use PrimaryView as V;
    use SecondaryOption as O;

    let routine = match (path.view, path.option) {
        (V::ClusterInfo, O::Nodes) => RenderRoutine::ClusterNodes,
        (V::ClusterInfo, O::TopNodes) => RenderRoutine::TopNodes,
        (V::Namespace, O::Config) => RenderRoutine::Config,
        (V::Namespace, O::Deployments) => RenderRoutine::NamespaceListing {
            kind: "deployments",
            wide: false,
        },
        (V::Namespace, O::Pods) => RenderRoutine::NamespaceListing {
            kind: "pods",
            wide: true,
        },
        (V::Service | V::Deployment | V::Pod, O::Config) => RenderRoutine::Config,
        (V::Deployment | V::Pod, O::Describe) => RenderRoutine::Describe,
        (V::Service | V::Deployment, O::Pods) => RenderRoutine::SelectorPods,
        (V::Service | V::Deployment, O::PodsLog) => RenderRoutine::SelectorLogs,
        (V::Service | V::Deployment, O::TopPods) => RenderRoutine::SelectorTopPods,
        (V::Pod, O::Log) => RenderRoutine::PodLog,
        (V::Pod, O::Top) => RenderRoutine::PodTop,
        _ => return None,
    };
    Some(routine)
}

pub fn please_select(resource: &str) -> String {
    format!("Please select a {resource}.")
}

#[derive(Debug, Clone)]
pub struct DetailDispatcher {
    logs_tail: u32,
}

impl Default for DetailDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_LOGS_TAIL)
    }
}

impl DetailDispatcher {
    pub fn new(logs_tail: u32) -> Self {
        Self { logs_tail }
    }

    pub async fn refresh<Q: ResourceQuery>(
        &self,
        nav: &NavigationController,
        store: &SelectionStore,
        query: &Q,
        pane: &mut DetailPane,
    ) {
        pane.clear();
        let Some(path) = nav.active_path() else {
            return;
        };
        let Some(routine) = route(path) else {
            debug!("no render routine bound to {path}");
            return;
        };

        debug!("rendering {path} via {routine:?}");
        let text = self.render(routine, path.view, store, query).await;
        pane.paint(&text, store.selection(path.view));
    }

    async fn render<Q: ResourceQuery>(
        &self,
        routine: RenderRoutine,
        view: PrimaryView,
        store: &SelectionStore,
        query: &Q,
    ) -> String {
        match routine {
            RenderRoutine::ClusterNodes => query.execute(&QueryRequest::get("nodes")).await,
            RenderRoutine::TopNodes => query.execute(&QueryRequest::top_node()).await,
            RenderRoutine::NamespaceListing { kind, wide } => {
                let mut request = QueryRequest::get(kind);
                if wide {
                    request = request.flag("output", "wide");
                }
                request = match store.namespace_selection().map(selected_namespace) {
                    Some(namespace) if !namespace.is_empty() => request.in_namespace(&namespace),
                    _ => request.flag("all-namespaces", "true"),
                };
                query.execute(&request).await
            }
            RenderRoutine::Config if view == PrimaryView::Namespace => {
                namespace_config(store, query).await
            }
            RenderRoutine::Config => {
                single_resource(view, store, query, |ctx| {
                    QueryRequest::get_named(ctx.kind, &ctx.name).flag("output", "yaml")
                })
                .await
            }
            RenderRoutine::Describe => {
                single_resource(view, store, query, |ctx| {
                    QueryRequest::describe(ctx.kind, &ctx.name)
                })
                .await
            }
            RenderRoutine::PodLog => {
                single_resource(PrimaryView::Pod, store, query, |ctx| {
                    self.tailed_logs(QueryRequest::logs(Some(&ctx.name)))
                })
                .await
            }
            RenderRoutine::PodTop => {
                single_resource(PrimaryView::Pod, store, query, |ctx| {
                    QueryRequest::top_pod(Some(&ctx.name))
                })
                .await
            }
            RenderRoutine::SelectorPods => {
                by_selector(view, store, query, |namespace, selector| {
                    QueryRequest::get("pods")
                        .in_namespace(namespace)
                        .flag("selector", selector)
                        .flag("output", "wide")
                })
                .await
            }
            RenderRoutine::SelectorLogs => {
                by_selector(view, store, query, |namespace, selector| {
                    self.tailed_logs(QueryRequest::logs(None))
                        .in_namespace(namespace)
                        .flag("selector", selector)
                })
                .await
            }
            RenderRoutine::SelectorTopPods => {
                by_selector(view, store, query, |namespace, selector| {
                    QueryRequest::top_pod(None)
                        .in_namespace(namespace)
                        .flag("selector", selector)
                })
                .await
            }
        }
    }

    fn tailed_logs(&self, request: QueryRequest) -> QueryRequest {
        request
            .flag("all-containers", "true")
            .flag("tail", self.logs_tail.to_string())
            .flag("prefix", "true")
    }
}

async fn namespace_config<Q: ResourceQuery>(store: &SelectionStore, query: &Q) -> String {
    let namespace = store
        .namespace_selection()
        .map(selected_namespace)
        .unwrap_or_default();
    if namespace.is_empty() {
        return please_select(PrimaryView::Namespace.resource_label());
    }
    query
        .execute(&QueryRequest::get_named("namespaces", &namespace).flag("output", "yaml"))
        .await
}

async fn single_resource<Q, F>(
    view: PrimaryView,
    store: &SelectionStore,
    query: &Q,
    build: F,
) -> String
where
    Q: ResourceQuery,
    F: FnOnce(&SelectionContext) -> QueryRequest,
{
    match resolve(view, store) {
        Resolution::Unselected { resource } => please_select(resource),
        Resolution::Resolved(ctx) => {
            let request = build(&ctx).in_namespace(&ctx.namespace);
            query.execute(&request).await
        }
    }
}

fn selector_template(view: PrimaryView) -> Option<&'static str> {
    match view {
        PrimaryView::Service => Some("jsonpath='{.spec.selector}'"),
        PrimaryView::Deployment => Some("jsonpath='{.spec.selector.matchLabels}'"),
        _ => None,
    }
}

async fn by_selector<Q, F>(view: PrimaryView, store: &SelectionStore, query: &Q, build: F) -> String
where
    Q: ResourceQuery,
    F: FnOnce(&str, &str) -> QueryRequest,
{
    let Some(template) = selector_template(view) else {
        return String::new();
    };
    let ctx = match resolve(view, store) {
        Resolution::Unselected { resource } => return please_select(resource),
        Resolution::Resolved(ctx) => ctx,
    };

    let raw = query
        .execute(
            &QueryRequest::get_named(ctx.kind, &ctx.name)
                .in_namespace(&ctx.namespace)
                .flag("output", template),
        )
        .await;
    if raw.trim().is_empty() {
        return "Pods not found.".to_string();
    }

    let terms = extract_label_terms(&raw);
    if terms.is_empty() {
        return please_select(ctx.kind);
    }

    let request = build(&ctx.namespace, &selector_query(&terms));
    query.execute(&request).await
}
