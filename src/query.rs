use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum QueryVerb {
    Get,
    Describe,
    Logs,
    TopNode,
    TopPod,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct QueryRequest {
    pub verb: QueryVerb,
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub flags: BTreeMap<String, String>,
}

impl QueryRequest {
    fn new(verb: QueryVerb, kind: Option<&str>, name: Option<&str>) -> Self {
        Self {
            verb,
            kind: kind.map(str::to_string),
            name: name.map(str::to_string),
            namespace: None,
            flags: BTreeMap::new(),
        }
    }

    pub fn get(kind: &str) -> Self {
        Self::new(QueryVerb::Get, Some(kind), None)
    }

    pub fn get_named(kind: &str, name: &str) -> Self {
        Self::new(QueryVerb::Get, Some(kind), Some(name))
    }

    pub fn describe(kind: &str, name: &str) -> Self {
        Self::new(QueryVerb::Describe, Some(kind), Some(name))
    }

    pub fn logs(pod: Option<&str>) -> Self {
        Self::new(QueryVerb::Logs, Some("pod"), pod)
    }

    pub fn top_node() -> Self {
        Self::new(QueryVerb::TopNode, Some("node"), None)
    }

    pub fn top_pod(pod: Option<&str>) -> Self {
        Self::new(QueryVerb::TopPod, Some("pod"), pod)
    }

    pub fn flag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.flags.insert(key.to_string(), value.into());
        self
    }

    pub fn in_namespace(mut self, namespace: &str) -> Self {
        if !namespace.trim().is_empty() {
            self.namespace = Some(namespace.trim().to_string());
        }
        self
    }

    pub fn flag_value(&self, key: &str) -> Option<&str> {
        self.flags.get(key).map(String::as_str)
    }

    pub fn flag_enabled(&self, key: &str) -> bool {
        self.flag_value(key) == Some("true")
    }
}

impl Display for QueryRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let verb = match self.verb {
            QueryVerb::Get => "get",
            QueryVerb::Describe => "describe",
            QueryVerb::Logs => "logs",
            QueryVerb::TopNode => "top node",
            QueryVerb::TopPod => "top pod",
        };
        write!(f, "{verb}")?;
        if !matches!(self.verb, QueryVerb::Logs | QueryVerb::TopNode | QueryVerb::TopPod)
            && let Some(kind) = &self.kind
        {
            write!(f, " {kind}")?;
        }
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, " -n {namespace}")?;
        }
        for (key, value) in &self.flags {
            write!(f, " --{key}={value}")?;
        }
        Ok(())
    }
}

/// Implementations never fail outward: errors are rendered into the
/// returned text the same way a CLI would print them.
pub trait ResourceQuery {
    async fn execute(&self, request: &QueryRequest) -> String;
}


#[cfg(test)]
mod tests {
    use super::QueryRequest;

    #[test]
    fn display_reads_like_a_cli_invocation() {
        let request = QueryRequest::get_named("deployment", "web")
            .in_namespace("kube-system")
            .flag("output", "yaml");
        assert_eq!(
            request.to_string(),
            "get deployment web -n kube-system --output=yaml"
        );
    }

    #[test]
    fn blank_namespace_keeps_ambient_scope() {
        let request = QueryRequest::logs(Some("web-1")).in_namespace("  ");
        assert_eq!(request.namespace, None);
        assert_eq!(request.to_string(), "logs web-1");
    }
}
