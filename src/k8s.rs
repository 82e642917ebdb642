use anyhow::{Context, Result};
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Namespace, Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client, Config, Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

use crate::model::NamespaceScope;
use crate::query::{QueryRequest, QueryVerb, ResourceQuery};

const COLUMN_GAP: &str = "   ";
const QUERY_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
    cluster: String,
    default_namespace: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum ResourceKind {
    Node,
    Namespace,
    Service,
    Deployment,
    Pod,
}

impl ResourceKind {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "no" | "node" | "nodes" => Some(Self::Node),
            "ns" | "namespace" | "namespaces" => Some(Self::Namespace),
            "svc" | "service" | "services" => Some(Self::Service),
            "deploy" | "deployment" | "deployments" => Some(Self::Deployment),
            "po" | "pod" | "pods" => Some(Self::Pod),
            _ => None,
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Self::Node => "nodes",
            Self::Namespace => "namespaces",
            Self::Service => "services",
            Self::Deployment => "deployments",
            Self::Pod => "pods",
        }
    }

    fn namespaced(self) -> bool {
        !matches!(self, Self::Node | Self::Namespace)
    }

    fn headers(self, wide: bool) -> Vec<&'static str> {
        let mut headers = match self {
            Self::Node => vec!["NAME", "STATUS", "ROLES", "AGE", "VERSION"],
            Self::Namespace => vec!["NAME", "STATUS", "AGE"],
            Self::Service => vec![
                "NAME",
                "TYPE",
                "CLUSTER-IP",
                "EXTERNAL-IP",
                "PORT(S)",
                "AGE",
            ],
            Self::Deployment => vec!["NAME", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"],
            Self::Pod => vec!["NAME", "READY", "STATUS", "RESTARTS", "AGE"],
        };
        if wide {
            match self {
                Self::Node => headers.extend(["INTERNAL-IP", "OS-IMAGE"]),
                Self::Service => headers.push("SELECTOR"),
                Self::Deployment => headers.extend(["CONTAINERS", "IMAGES", "SELECTOR"]),
                Self::Pod => headers.extend(["IP", "NODE"]),
                Self::Namespace => {}
            }
        }
        headers
    }
}

impl KubeGateway {
    pub async fn new(context: Option<String>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().ok();

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if context.is_some() {
                anyhow::bail!("kubeconfig not found; --context is unavailable in this environment");
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let cluster = config.cluster_url.to_string();
        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;
        let context = context
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());

        Ok(Self {
            client,
            context,
            cluster,
            default_namespace,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    async fn run(&self, request: &QueryRequest) -> Result<String> {
        match request.verb {
            QueryVerb::Get => self.get(request).await,
            QueryVerb::Describe => self.describe(request).await,
            QueryVerb::Logs => self.logs(request).await,
            QueryVerb::TopNode => self.top_node().await,
            QueryVerb::TopPod => self.top_pod(request).await,
        }
    }

    fn namespace_for(&self, request: &QueryRequest) -> String {
        request
            .namespace
            .clone()
            .unwrap_or_else(|| self.default_namespace.clone())
    }

    fn scope_for(&self, request: &QueryRequest) -> NamespaceScope {
        if request.flag_enabled("all-namespaces") {
            NamespaceScope::All
        } else {
            NamespaceScope::Named(self.namespace_for(request))
        }
    }

    fn namespaced_api<K>(&self, scope: &NamespaceScope) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(namespace) => Api::namespaced(self.client.clone(), namespace),
        }
    }

    async fn get(&self, request: &QueryRequest) -> Result<String> {
        let kind = request_kind(request)?;
        let scope = self.scope_for(request);
        let name = request.name.as_deref();
        let selector = request.flag_value("selector");

        match kind {
            ResourceKind::Node => {
                let api: Api<Node> = Api::all(self.client.clone());
                let items = collect(api, name, selector).await?;
                render_get(&items, request, kind, &scope, node_columns)
            }
            ResourceKind::Namespace => {
                let api: Api<Namespace> = Api::all(self.client.clone());
                let items = collect(api, name, selector).await?;
                render_get(&items, request, kind, &scope, namespace_columns)
            }
            ResourceKind::Service => {
                let items = collect(self.namespaced_api::<Service>(&scope), name, selector).await?;
                render_get(&items, request, kind, &scope, service_columns)
            }
            ResourceKind::Deployment => {
                let items =
                    collect(self.namespaced_api::<Deployment>(&scope), name, selector).await?;
                render_get(&items, request, kind, &scope, deployment_columns)
            }
            ResourceKind::Pod => {
                let items = collect(self.namespaced_api::<Pod>(&scope), name, selector).await?;
                render_get(&items, request, kind, &scope, pod_columns)
            }
        }
    }

    async fn describe(&self, request: &QueryRequest) -> Result<String> {
        let kind = request_kind(request)?;
        let name = request
            .name
            .as_deref()
            .context("describe requires a resource name")?;
        let namespace = self.namespace_for(request);
        let scope = NamespaceScope::Named(namespace.clone());

        let value = match kind {
            ResourceKind::Node => get_value(Api::<Node>::all(self.client.clone()), name).await?,
            ResourceKind::Namespace => {
                get_value(Api::<Namespace>::all(self.client.clone()), name).await?
            }
            ResourceKind::Service => {
                get_value(self.namespaced_api::<Service>(&scope), name).await?
            }
            ResourceKind::Deployment => {
                get_value(self.namespaced_api::<Deployment>(&scope), name).await?
            }
            ResourceKind::Pod => get_value(self.namespaced_api::<Pod>(&scope), name).await?,
        };

        let mut out = describe_value(&value);
        if kind.namespaced() {
            out.push_str(&self.describe_events(&namespace, name).await);
        }
        Ok(out)
    }

    async fn describe_events(&self, namespace: &str, name: &str) -> String {
        let events: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let params = list_params().fields(&format!("involvedObject.name={name}"));
        let mut list = match events.list(&params).await {
            Ok(list) => list.items,
            Err(error) => {
                warn!("failed to list events for {namespace}/{name}: {error}");
                return "Events:       <unavailable>\n".to_string();
            }
        };
        if list.is_empty() {
            return "Events:       <none>\n".to_string();
        }

        list.sort_by_key(event_timestamp_seconds);
        let rows = list
            .iter()
            .map(|event| {
                vec![
                    event.type_.clone().unwrap_or_else(|| "-".to_string()),
                    event.reason.clone().unwrap_or_else(|| "-".to_string()),
                    event_age(event),
                    event
                        .source
                        .as_ref()
                        .and_then(|source| source.component.clone())
                        .or_else(|| event.reporting_component.clone())
                        .unwrap_or_else(|| "-".to_string()),
                    event.message.clone().unwrap_or_default().trim().to_string(),
                ]
            })
            .collect::<Vec<_>>();
        let table = format_table(&["Type", "Reason", "Age", "From", "Message"], &rows);

        let mut out = "Events:\n".to_string();
        for line in table.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    async fn logs(&self, request: &QueryRequest) -> Result<String> {
        let namespace = self.namespace_for(request);
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &namespace);
        let targets = match (request.name.as_deref(), request.flag_value("selector")) {
            (Some(name), _) => vec![
                pods.get(name)
                    .await
                    .with_context(|| format!("failed to fetch pod {namespace}/{name}"))?,
            ],
            (None, Some(selector)) => {
                pods.list(&list_params().labels(selector))
                    .await
                    .with_context(|| {
                        format!("failed to list pods matching {selector} in {namespace}")
                    })?
                    .items
            }
            (None, None) => anyhow::bail!("logs requires a pod name or a label selector"),
        };
        if targets.is_empty() {
            return Ok(format!("No resources found in {namespace} namespace.\n"));
        }

        let tail_lines = request
            .flag_value("tail")
            .and_then(|tail| tail.parse::<i64>().ok());
        let prefix = request.flag_enabled("prefix");
        let all_containers = request.flag_enabled("all-containers");

        let mut out = String::new();
        for pod in &targets {
            let pod_name = pod.name_any();
            let mut containers = pod
                .spec
                .as_ref()
                .map(|spec| {
                    spec.containers
                        .iter()
                        .map(|container| container.name.clone())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            if !all_containers {
                containers.truncate(1);
            }

            for container in containers {
                let params = LogParams {
                    container: Some(container.clone()),
                    tail_lines,
                    ..LogParams::default()
                };
                let text = match pods.logs(&pod_name, &params).await {
                    Ok(text) => text,
                    Err(error) => format!("error: failed to load logs: {error}\n"),
                };
                if prefix {
                    out.push_str(&prefix_lines(&text, &pod_name, &container));
                } else {
                    out.push_str(&text);
                }
            }
        }
        Ok(out)
    }

    async fn top_node(&self) -> Result<String> {
        let gvk = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "NodeMetrics");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "nodes");
        let metrics_api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        let metrics = metrics_api
            .list(&list_params())
            .await
            .context("Metrics API not available")?;

        let nodes: Api<Node> = Api::all(self.client.clone());
        let capacity = nodes
            .list(&list_params())
            .await?
            .into_iter()
            .map(|node| {
                let allocatable = node
                    .status
                    .as_ref()
                    .and_then(|status| status.allocatable.as_ref());
                let cpu = allocatable
                    .and_then(|map| map.get("cpu"))
                    .and_then(|quantity| parse_cpu_millicores(&quantity.0))
                    .unwrap_or(0);
                let memory = allocatable
                    .and_then(|map| map.get("memory"))
                    .and_then(|quantity| parse_memory_bytes(&quantity.0))
                    .unwrap_or(0);
                (node.name_any(), (cpu, memory))
            })
            .collect::<HashMap<_, _>>();

        let mut rows = metrics
            .into_iter()
            .map(|metric| {
                let name = metric.name_any();
                let (cpu, memory) = parse_usage_from_value(&metric.data["usage"]);
                let (cpu_capacity, memory_capacity) =
                    capacity.get(&name).copied().unwrap_or((0, 0));
                vec![
                    name,
                    format!("{cpu}m"),
                    percent(cpu, cpu_capacity),
                    format_mebibytes(memory),
                    percent(memory, memory_capacity),
                ]
            })
            .collect::<Vec<_>>();
        rows.sort();

        Ok(format_table(
            &["NAME", "CPU(cores)", "CPU%", "MEMORY(bytes)", "MEMORY%"],
            &rows,
        ))
    }

    async fn top_pod(&self, request: &QueryRequest) -> Result<String> {
        let namespace = self.namespace_for(request);
        let gvk = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "pods");
        let metrics_api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &namespace, &resource);

        let metrics = match (request.name.as_deref(), request.flag_value("selector")) {
            (Some(name), _) => vec![
                metrics_api
                    .get(name)
                    .await
                    .with_context(|| format!("metrics not available for pod {namespace}/{name}"))?,
            ],
            (None, selector) => {
                let mut params = list_params();
                if let Some(selector) = selector {
                    params = params.labels(selector);
                }
                metrics_api
                    .list(&params)
                    .await
                    .context("Metrics API not available")?
                    .items
            }
        };
        if metrics.is_empty() {
            return Ok(format!("No resources found in {namespace} namespace.\n"));
        }

        let mut rows = metrics
            .into_iter()
            .map(|metric| {
                let (cpu, memory) = parse_pod_metrics_usage(&metric.data);
                vec![metric.name_any(), format!("{cpu}m"), format_mebibytes(memory)]
            })
            .collect::<Vec<_>>();
        rows.sort();

        Ok(format_table(&["NAME", "CPU(cores)", "MEMORY(bytes)"], &rows))
    }
}

impl ResourceQuery for KubeGateway {
    async fn execute(&self, request: &QueryRequest) -> String {
        debug!("query: {request}");
        match timeout(QUERY_TIMEOUT, self.run(request)).await {
            Ok(Ok(text)) => text,
            Ok(Err(error)) => {
                warn!("query '{request}' failed: {error:#}");
                format!("Error from server: {error:#}\n")
            }
            Err(_) => {
                warn!("query '{request}' timed out");
                format!(
                    "Error from server: request timed out after {}s\n",
                    QUERY_TIMEOUT.as_secs()
                )
            }
        }
    }
}

fn request_kind(request: &QueryRequest) -> Result<ResourceKind> {
    let token = request.kind.as_deref().unwrap_or_default();
    ResourceKind::from_token(token)
        .with_context(|| format!("the server doesn't have a resource type \"{token}\""))
}

async fn collect<K>(api: Api<K>, name: Option<&str>, selector: Option<&str>) -> Result<Vec<K>>
where
    K: Clone + DeserializeOwned + Debug,
{
    if let Some(name) = name {
        let item = api
            .get(name)
            .await
            .with_context(|| format!("failed to fetch \"{name}\""))?;
        return Ok(vec![item]);
    }

    let mut params = list_params();
    if let Some(selector) = selector {
        params = params.labels(selector);
    }
    Ok(api.list(&params).await?.items)
}

async fn get_value<K>(api: Api<K>, name: &str) -> Result<Value>
where
    K: Clone + DeserializeOwned + Debug + Serialize,
{
    let item = api
        .get(name)
        .await
        .with_context(|| format!("failed to fetch \"{name}\""))?;
    serde_json::to_value(&item).context("failed to encode resource")
}

fn render_get<K>(
    items: &[K],
    request: &QueryRequest,
    kind: ResourceKind,
    scope: &NamespaceScope,
    columns: fn(&K, bool) -> Vec<String>,
) -> Result<String>
where
    K: Serialize + Resource,
{
    let output = request.flag_value("output").unwrap_or_default();
    if output == "yaml" {
        let docs = items
            .iter()
            .map(serde_yaml::to_string)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to format yaml")?;
        return Ok(docs.join("---\n"));
    }
    if let Some(template) = output.strip_prefix("jsonpath=") {
        let mut out = String::new();
        for item in items {
            let value = serde_json::to_value(item).context("failed to encode resource")?;
            out.push_str(&evaluate_jsonpath(template, &value));
        }
        return Ok(out);
    }

    if items.is_empty() {
        return Ok(match (kind.namespaced(), scope) {
            (true, NamespaceScope::Named(namespace)) => {
                format!("No resources found in {namespace} namespace.\n")
            }
            _ => "No resources found\n".to_string(),
        });
    }

    let wide = output == "wide";
    let with_namespace = kind.namespaced() && *scope == NamespaceScope::All;
    let mut headers = kind.headers(wide);
    if with_namespace {
        headers.insert(0, "NAMESPACE");
    }
    let rows = items
        .iter()
        .map(|item| {
            let mut row = columns(item, wide);
            if with_namespace {
                row.insert(0, item.namespace().unwrap_or_else(|| "-".to_string()));
            }
            row
        })
        .collect::<Vec<_>>();
    debug!("rendered {} {}", rows.len(), kind.plural());
    Ok(format_table(&headers, &rows))
}

fn node_columns(node: &Node, wide: bool) -> Vec<String> {
    let ready = node
        .status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .and_then(|conditions| {
            conditions
                .iter()
                .find(|condition| condition.type_ == "Ready")
        })
        .map(|condition| match condition.status.as_str() {
            "True" => "Ready",
            "False" => "NotReady",
            _ => "Unknown",
        })
        .unwrap_or("Unknown");
    let info = node.status.as_ref().and_then(|status| status.node_info.as_ref());
    let mut row = vec![
        node.name_any(),
        ready.to_string(),
        node_roles(node),
        human_age(node.metadata.creation_timestamp.as_ref()),
        info.map(|info| info.kubelet_version.clone())
            .unwrap_or_else(|| "-".to_string()),
    ];
    if wide {
        let internal_ip = node
            .status
            .as_ref()
            .and_then(|status| status.addresses.as_ref())
            .and_then(|addresses| {
                addresses
                    .iter()
                    .find(|address| address.type_ == "InternalIP")
            })
            .map(|address| address.address.clone())
            .unwrap_or_else(|| "<none>".to_string());
        row.push(internal_ip);
        row.push(
            info.map(|info| info.os_image.clone())
                .unwrap_or_else(|| "<unknown>".to_string()),
        );
    }
    row
}

fn namespace_columns(namespace: &Namespace, _wide: bool) -> Vec<String> {
    vec![
        namespace.name_any(),
        namespace
            .status
            .as_ref()
            .and_then(|status| status.phase.clone())
            .unwrap_or_else(|| "Active".to_string()),
        human_age(namespace.metadata.creation_timestamp.as_ref()),
    ]
}

fn service_columns(service: &Service, wide: bool) -> Vec<String> {
    let spec = service.spec.as_ref();
    let external = service
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .map(|ingress| {
            ingress
                .iter()
                .filter_map(|entry| entry.ip.clone().or_else(|| entry.hostname.clone()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|value| !value.is_empty())
        .or_else(|| {
            spec.and_then(|spec| spec.external_ips.as_ref())
                .map(|ips| ips.join(","))
        })
        .unwrap_or_else(|| "<none>".to_string());
    let ports = spec
        .and_then(|spec| spec.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|port| {
                    let protocol = port.protocol.clone().unwrap_or_else(|| "TCP".to_string());
                    match port.node_port {
                        Some(node_port) => format!("{}:{}/{}", port.port, node_port, protocol),
                        None => format!("{}/{}", port.port, protocol),
                    }
                })
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "<none>".to_string());

    let mut row = vec![
        service.name_any(),
        spec.and_then(|spec| spec.type_.clone())
            .unwrap_or_else(|| "ClusterIP".to_string()),
        spec.and_then(|spec| spec.cluster_ip.clone())
            .unwrap_or_else(|| "<none>".to_string()),
        external,
        ports,
        human_age(service.metadata.creation_timestamp.as_ref()),
    ];
    if wide {
        row.push(
            spec.and_then(|spec| spec.selector.as_ref())
                .map(label_pairs)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "<none>".to_string()),
        );
    }
    row
}

fn deployment_columns(deployment: &Deployment, wide: bool) -> Vec<String> {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();
    let desired = spec.and_then(|spec| spec.replicas).unwrap_or(1);
    let ready = status.and_then(|status| status.ready_replicas).unwrap_or(0);
    let updated = status.and_then(|status| status.updated_replicas).unwrap_or(0);
    let available = status
        .and_then(|status| status.available_replicas)
        .unwrap_or(0);

    let mut row = vec![
        deployment.name_any(),
        format!("{ready}/{desired}"),
        updated.to_string(),
        available.to_string(),
        human_age(deployment.metadata.creation_timestamp.as_ref()),
    ];
    if wide {
        let containers = spec
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod_spec| pod_spec.containers.as_slice())
            .unwrap_or(&[]);
        row.push(
            containers
                .iter()
                .map(|container| container.name.clone())
                .collect::<Vec<_>>()
                .join(","),
        );
        row.push(
            containers
                .iter()
                .filter_map(|container| container.image.clone())
                .collect::<Vec<_>>()
                .join(","),
        );
        row.push(
            spec.and_then(|spec| spec.selector.match_labels.as_ref())
                .map(label_pairs)
                .unwrap_or_else(|| "<none>".to_string()),
        );
    }
    row
}

fn pod_columns(pod: &Pod, wide: bool) -> Vec<String> {
    let status = pod.status.as_ref();
    let (ready, total, restarts) = status.map(pod_readiness).unwrap_or((0, 0, 0));
    let waiting_reason = status
        .and_then(|status| status.container_statuses.as_ref())
        .and_then(|statuses| {
            statuses.iter().find_map(|container| {
                container
                    .state
                    .as_ref()
                    .and_then(|state| state.waiting.as_ref())
                    .and_then(|waiting| waiting.reason.clone())
            })
        });
    let phase = waiting_reason
        .or_else(|| status.and_then(|status| status.phase.clone()))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut row = vec![
        pod.name_any(),
        format!("{ready}/{total}"),
        phase,
        restarts.to_string(),
        human_age(pod.metadata.creation_timestamp.as_ref()),
    ];
    if wide {
        row.push(
            status
                .and_then(|status| status.pod_ip.clone())
                .unwrap_or_else(|| "<none>".to_string()),
        );
        row.push(
            pod.spec
                .as_ref()
                .and_then(|spec| spec.node_name.clone())
                .unwrap_or_else(|| "<none>".to_string()),
        );
    }
    row
}

fn format_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.as_ref().chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_cells = headers
        .iter()
        .map(|header| header.as_ref().to_string())
        .collect::<Vec<_>>();
    for cells in std::iter::once(&header_cells).chain(rows.iter()) {
        let last = cells.len().saturating_sub(1);
        let mut line = String::new();
        for (index, cell) in cells.iter().enumerate() {
            line.push_str(cell);
            if index < last {
                let width = widths.get(index).copied().unwrap_or(0);
                let pad = width.saturating_sub(cell.chars().count());
                line.push_str(&" ".repeat(pad));
                line.push_str(COLUMN_GAP);
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn evaluate_jsonpath(template: &str, value: &Value) -> String {
    let mut out = String::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let path = after[..close].trim();
        let found = path
            .trim_start_matches('.')
            .split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(value, |current, segment| current.get(segment));
        match found {
            Some(Value::String(text)) => out.push_str(text),
            Some(Value::Null) | None => {}
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn prefix_lines(text: &str, pod: &str, container: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        out.push_str(&format!("[pod/{pod}/{container}] {line}\n"));
    }
    out
}

fn describe_value(value: &Value) -> String {
    let mut out = String::new();
    let metadata = &value["metadata"];
    let spec = &value["spec"];
    let status = &value["status"];

    push_field(&mut out, "Name", metadata["name"].as_str().unwrap_or("-"));
    if let Some(namespace) = metadata["namespace"].as_str() {
        push_field(&mut out, "Namespace", namespace);
    }
    push_map(&mut out, "Labels", &metadata["labels"]);
    push_map(&mut out, "Annotations", &metadata["annotations"]);
    if let Some(created) = metadata["creationTimestamp"].as_str() {
        push_field(&mut out, "Created", created);
    }

    let selector = if spec["selector"]["matchLabels"].is_object() {
        &spec["selector"]["matchLabels"]
    } else {
        &spec["selector"]
    };
    if let Some(map) = selector.as_object() {
        let pairs = map
            .iter()
            .map(|(key, value)| format!("{key}={}", value.as_str().unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(",");
        push_field(&mut out, "Selector", &pairs);
    }
    if let Some(desired) = spec["replicas"].as_i64() {
        let count = |key: &str| status[key].as_i64().unwrap_or(0);
        push_field(
            &mut out,
            "Replicas",
            &format!(
                "{desired} desired | {} updated | {} total | {} available",
                count("updatedReplicas"),
                count("replicas"),
                count("availableReplicas")
            ),
        );
    }
    if let Some(node) = spec["nodeName"].as_str() {
        push_field(&mut out, "Node", node);
    }
    if let Some(phase) = status["phase"].as_str() {
        push_field(&mut out, "Status", phase);
    }
    if let Some(ip) = status["podIP"].as_str() {
        push_field(&mut out, "IP", ip);
    }
    if let Some(service_type) = spec["type"].as_str() {
        push_field(&mut out, "Type", service_type);
    }
    if let Some(cluster_ip) = spec["clusterIP"].as_str() {
        push_field(&mut out, "IP", cluster_ip);
    }
    if let Some(ports) = spec["ports"].as_array() {
        for port in ports {
            push_field(
                &mut out,
                "Port",
                &format!(
                    "{} {}/{}",
                    port["name"].as_str().unwrap_or("<unset>"),
                    port["port"],
                    port["protocol"].as_str().unwrap_or("TCP")
                ),
            );
        }
    }

    let containers = spec["containers"]
        .as_array()
        .or_else(|| spec["template"]["spec"]["containers"].as_array());
    if let Some(containers) = containers {
        out.push_str("Containers:\n");
        for container in containers {
            out.push_str(&format!(
                "  {}:\n",
                container["name"].as_str().unwrap_or("-")
            ));
            out.push_str(&format!(
                "    Image:  {}\n",
                container["image"].as_str().unwrap_or("-")
            ));
            if let Some(ports) = container["ports"].as_array() {
                let ports = ports
                    .iter()
                    .map(|port| {
                        format!(
                            "{}/{}",
                            port["containerPort"],
                            port["protocol"].as_str().unwrap_or("TCP")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("    Ports:  {ports}\n"));
            }
        }
    }

    if let Some(conditions) = status["conditions"].as_array() {
        let rows = conditions
            .iter()
            .map(|condition| {
                vec![
                    condition["type"].as_str().unwrap_or("-").to_string(),
                    condition["status"].as_str().unwrap_or("-").to_string(),
                    condition["reason"].as_str().unwrap_or("").to_string(),
                ]
            })
            .collect::<Vec<_>>();
        out.push_str("Conditions:\n");
        for line in format_table(&["Type", "Status", "Reason"], &rows).lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn push_field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{:<14}{value}\n", format!("{label}:")));
}

fn push_map(out: &mut String, label: &str, value: &Value) {
    let Some(map) = value.as_object().filter(|map| !map.is_empty()) else {
        push_field(out, label, "<none>");
        return;
    };
    for (index, (key, value)) in map.iter().enumerate() {
        let pair = format!("{key}={}", value.as_str().unwrap_or_default());
        if index == 0 {
            push_field(out, label, &pair);
        } else {
            out.push_str(&format!("{:<14}{pair}\n", ""));
        }
    }
}

fn label_pairs(labels: &std::collections::BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_pod_metrics_usage(data: &Value) -> (u64, u64) {
    let Some(containers) = data.get("containers").and_then(Value::as_array) else {
        return (0, 0);
    };

    containers
        .iter()
        .fold((0u64, 0u64), |(cpu, memory), container| {
            let (container_cpu, container_memory) = container
                .get("usage")
                .map(parse_usage_from_value)
                .unwrap_or((0, 0));
            (
                cpu.saturating_add(container_cpu),
                memory.saturating_add(container_memory),
            )
        })
}

fn parse_usage_from_value(value: &Value) -> (u64, u64) {
    let cpu = value
        .get("cpu")
        .and_then(Value::as_str)
        .and_then(parse_cpu_millicores)
        .unwrap_or(0);
    let memory = value
        .get("memory")
        .and_then(Value::as_str)
        .and_then(parse_memory_bytes)
        .unwrap_or(0);
    (cpu, memory)
}

fn parse_cpu_millicores(value: &str) -> Option<u64> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, multiplier) = if let Some(number) = raw.strip_suffix('m') {
        (number, 1.0)
    } else if let Some(number) = raw.strip_suffix('u') {
        (number, 0.001)
    } else if let Some(number) = raw.strip_suffix('n') {
        (number, 0.000001)
    } else {
        (raw, 1000.0)
    };

    let numeric = number.parse::<f64>().ok()?;
    let millicores = (numeric * multiplier).round();
    if !millicores.is_finite() || millicores < 0.0 {
        return None;
    }
    Some(millicores as u64)
}

fn parse_memory_bytes(value: &str) -> Option<u64> {
    const UNITS: [(&str, f64); 12] = [
        ("Ei", 1_152_921_504_606_846_976.0),
        ("Pi", 1_125_899_906_842_624.0),
        ("Ti", 1_099_511_627_776.0),
        ("Gi", 1_073_741_824.0),
        ("Mi", 1_048_576.0),
        ("Ki", 1_024.0),
        ("E", 1_000_000_000_000_000_000.0),
        ("P", 1_000_000_000_000_000.0),
        ("T", 1_000_000_000_000.0),
        ("G", 1_000_000_000.0),
        ("M", 1_000_000.0),
        ("k", 1_000.0),
    ];

    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            raw.strip_suffix(suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((raw, 1.0));
    let bytes = (number.parse::<f64>().ok()? * multiplier).round();
    if !bytes.is_finite() || bytes < 0.0 {
        return None;
    }
    Some(bytes as u64)
}

fn format_mebibytes(bytes: u64) -> String {
    format!("{}Mi", bytes / 1_048_576)
}

fn percent(used: u64, capacity: u64) -> String {
    if capacity == 0 {
        return "<unknown>".to_string();
    }
    format!("{}%", used.saturating_mul(100) / capacity)
}

fn list_params() -> ListParams {
    ListParams::default().limit(500)
}

fn pod_readiness(status: &k8s_openapi::api::core::v1::PodStatus) -> (usize, usize, i32) {
    let container_statuses = status.container_statuses.as_deref().unwrap_or(&[]);
    let total = container_statuses.len();
    let ready = container_statuses
        .iter()
        .filter(|container| container.ready)
        .count();
    let restarts = container_statuses
        .iter()
        .map(|container| container.restart_count)
        .sum();

    (ready, total, restarts)
}

fn node_roles(node: &Node) -> String {
    let Some(labels) = node.metadata.labels.as_ref() else {
        return "<none>".to_string();
    };

    let mut roles = labels
        .keys()
        .filter_map(|key| key.strip_prefix("node-role.kubernetes.io/"))
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if roles.is_empty() {
        "<none>".to_string()
    } else {
        roles.sort();
        roles.dedup();
        roles.join(",")
    }
}

fn event_age(event: &Event) -> String {
    if let Some(event_time) = event.event_time.as_ref() {
        return human_age_timestamp(event_time.0);
    }

    if let Some(last_timestamp) = event.last_timestamp.as_ref() {
        return human_age(Some(last_timestamp));
    }

    human_age(event.metadata.creation_timestamp.as_ref())
}

fn event_timestamp_seconds(event: &Event) -> i64 {
    event
        .event_time
        .as_ref()
        .map(|time| time.0.as_second())
        .or_else(|| event.last_timestamp.as_ref().map(|time| time.0.as_second()))
        .or_else(|| {
            event
                .metadata
                .creation_timestamp
                .as_ref()
                .map(|time| time.0.as_second())
        })
        .unwrap_or(0)
}

fn human_age(timestamp: Option<&Time>) -> String {
    let Some(timestamp) = timestamp else {
        return "<unknown>".to_string();
    };

    human_age_timestamp(timestamp.0)
}

fn human_age_timestamp(ts: k8s_openapi::jiff::Timestamp) -> String {
    let elapsed_seconds = (k8s_openapi::jiff::Timestamp::now().as_second() - ts.as_second()).max(0);
    format_elapsed_seconds(elapsed_seconds)
}

fn format_elapsed_seconds(seconds: i64) -> String {
    if seconds >= 86_400 {
        return format!("{}d", seconds / 86_400);
    }

    if seconds >= 3_600 {
        return format!("{}h", seconds / 3_600);
    }

    if seconds >= 60 {
        return format!("{}m", seconds / 60);
    }

    format!("{seconds}s")
}

#[cfg(test)]
mod tests {
    use super::{
        ResourceKind, describe_value, evaluate_jsonpath, format_elapsed_seconds, format_table,
        parse_cpu_millicores, parse_memory_bytes, parse_pod_metrics_usage, percent, pod_columns,
        prefix_lines, render_get,
    };
    use crate::model::NamespaceScope;
    use crate::query::QueryRequest;
    use k8s_openapi::api::core::v1::Pod;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;

    #[test]
    fn listing_scope_controls_namespace_column_and_empty_message() {
        let request = QueryRequest::get("pods");
        let named = NamespaceScope::Named("ops".to_string());

        let empty: Vec<Pod> = Vec::new();
        assert_eq!(
            render_get(&empty, &request, ResourceKind::Pod, &named, pod_columns).unwrap(),
            "No resources found in ops namespace.\n"
        );
        assert_eq!(
            render_get(&empty, &request, ResourceKind::Pod, &NamespaceScope::All, pod_columns)
                .unwrap(),
            "No resources found\n"
        );

        let pods = vec![Pod {
            metadata: ObjectMeta {
                name: Some("web-1".to_string()),
                namespace: Some("ops".to_string()),
                ..ObjectMeta::default()
            },
            ..Pod::default()
        }];
        let all = render_get(&pods, &request, ResourceKind::Pod, &NamespaceScope::All, pod_columns)
            .unwrap();
        let lines = all.lines().collect::<Vec<_>>();
        assert!(lines[0].starts_with("NAMESPACE"));
        assert_eq!(lines[1].split_whitespace().take(2).collect::<Vec<_>>(), ["ops", "web-1"]);

        let scoped = render_get(&pods, &request, ResourceKind::Pod, &named, pod_columns).unwrap();
        assert!(scoped.lines().nth(1).unwrap().starts_with("web-1"));
    }

    #[test]
    fn jsonpath_keeps_literal_quotes_around_selector() {
        let service = json!({"spec": {"selector": {"app": "web"}}});
        assert_eq!(
            evaluate_jsonpath("'{.spec.selector}'", &service),
            "'{\"app\":\"web\"}'"
        );

        let deployment = json!({"spec": {"selector": {"matchLabels": {"app": "api"}}}});
        assert_eq!(
            evaluate_jsonpath("'{.spec.selector.matchLabels}'", &deployment),
            "'{\"app\":\"api\"}'"
        );
    }

    #[test]
    fn jsonpath_missing_field_prints_nothing() {
        let value = json!({"metadata": {"name": "x"}});
        assert_eq!(evaluate_jsonpath("'{.spec.selector}'", &value), "''");
        assert_eq!(evaluate_jsonpath("{.metadata.name}", &value), "x");
    }

    #[test]
    fn table_aligns_columns_with_three_space_gap() {
        let table = format_table(
            &["NAMESPACE", "NAME", "READY"],
            &[
                vec!["kube-system".to_string(), "dns".to_string(), "1/1".to_string()],
                vec!["app".to_string(), "web-frontend".to_string(), "0/1".to_string()],
            ],
        );
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "NAMESPACE     NAME           READY");
        assert_eq!(lines[1], "kube-system   dns            1/1");
        assert_eq!(lines[2], "app           web-frontend   0/1");
        assert_eq!(lines[1].split_whitespace().nth(1), Some("dns"));
    }

    #[test]
    fn log_lines_get_pod_and_container_prefix() {
        assert_eq!(
            prefix_lines("a\nb\n", "web-1", "nginx"),
            "[pod/web-1/nginx] a\n[pod/web-1/nginx] b\n"
        );
    }

    #[test]
    fn describe_lists_metadata_selector_and_containers() {
        let deployment = json!({
            "metadata": {"name": "api", "namespace": "ops", "labels": {"app": "api", "tier": "be"}},
            "spec": {
                "replicas": 2,
                "selector": {"matchLabels": {"app": "api"}},
                "template": {"spec": {"containers": [{"name": "main", "image": "api:1"}]}}
            },
            "status": {"replicas": 2, "updatedReplicas": 2, "availableReplicas": 1}
        });

        let text = describe_value(&deployment);
        assert!(text.contains("Name:         api\n"));
        assert!(text.contains("Namespace:    ops\n"));
        assert!(text.contains("Labels:       app=api\n              tier=be\n"));
        assert!(text.contains("Annotations:  <none>\n"));
        assert!(text.contains("Selector:     app=api\n"));
        assert!(text.contains("Replicas:     2 desired | 2 updated | 2 total | 1 available\n"));
        assert!(text.contains("    Image:  api:1\n"));
    }

    #[test]
    fn quantities_parse_to_millicores_and_bytes() {
        assert_eq!(parse_cpu_millicores("250m"), Some(250));
        assert_eq!(parse_cpu_millicores("2"), Some(2_000));
        assert_eq!(parse_cpu_millicores("2000000n"), Some(2));
        assert_eq!(parse_memory_bytes("128Mi"), Some(134_217_728));
        assert_eq!(parse_memory_bytes("1k"), Some(1_000));
        assert_eq!(parse_memory_bytes("512"), Some(512));
        assert_eq!(parse_memory_bytes("lots"), None);

        let usage = json!({"containers": [
            {"usage": {"cpu": "100m", "memory": "1Mi"}},
            {"usage": {"cpu": "50m", "memory": "1Mi"}}
        ]});
        assert_eq!(parse_pod_metrics_usage(&usage), (150, 2_097_152));
        assert_eq!(percent(50, 200), "25%");
        assert_eq!(percent(50, 0), "<unknown>");
    }

    #[test]
    fn kind_tokens_accept_kubectl_aliases() {
        assert_eq!(ResourceKind::from_token("svc"), Some(ResourceKind::Service));
        assert_eq!(
            ResourceKind::from_token("Deployments"),
            Some(ResourceKind::Deployment)
        );
        assert_eq!(ResourceKind::from_token("po"), Some(ResourceKind::Pod));
        assert_eq!(ResourceKind::from_token("ingress"), None);
        assert!(!ResourceKind::Namespace.namespaced());
        assert_eq!(ResourceKind::Pod.headers(true).last(), Some(&"NODE"));
    }

    #[test]
    fn elapsed_seconds_use_largest_unit() {
        assert_eq!(format_elapsed_seconds(59), "59s");
        assert_eq!(format_elapsed_seconds(3_600), "1h");
        assert_eq!(format_elapsed_seconds(200_000), "2d");
    }
}
