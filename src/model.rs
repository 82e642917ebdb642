use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PrimaryView {
    ClusterInfo,
    Namespace,
    Service,
    Deployment,
    Pod,
}

impl PrimaryView {
    pub const ALL: [Self; 5] = [
        Self::ClusterInfo,
        Self::Namespace,
        Self::Service,
        Self::Deployment,
        Self::Pod,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::ClusterInfo => 0,
            Self::Namespace => 1,
            Self::Service => 2,
            Self::Deployment => 3,
            Self::Pod => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ClusterInfo => "Cluster Info",
            Self::Namespace => "Namespaces",
            Self::Service => "Services",
            Self::Deployment => "Deployments",
            Self::Pod => "Pods",
        }
    }

    pub fn resource_label(self) -> &'static str {
        match self {
            Self::ClusterInfo => "cluster",
            Self::Namespace => "namespace",
            Self::Service => "service",
            Self::Deployment => "deployment",
            Self::Pod => "pod",
        }
    }

    pub fn resource_kind(self) -> Option<&'static str> {
        match self {
            Self::Service => Some("service"),
            Self::Deployment => Some("deployment"),
            Self::Pod => Some("pod"),
            Self::ClusterInfo | Self::Namespace => None,
        }
    }

    pub fn listing_kind(self) -> Option<&'static str> {
        match self {
            Self::ClusterInfo => None,
            Self::Namespace => Some("namespaces"),
            Self::Service => Some("services"),
            Self::Deployment => Some("deployments"),
            Self::Pod => Some("pods"),
        }
    }

    pub fn options(self) -> &'static [SecondaryOption] {
        use SecondaryOption::*;
        match self {
            Self::ClusterInfo => &[Nodes, TopNodes],
            Self::Namespace => &[Config, Deployments, Pods],
            Self::Service => &[Config, Pods, PodsLog, TopPods],
            Self::Deployment => &[Config, Pods, PodsLog, Describe, TopPods],
            Self::Pod => &[Log, Config, Top, Describe],
        }
    }
}

impl Display for PrimaryView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SecondaryOption {
    Nodes,
    TopNodes,
    Config,
    Deployments,
    Pods,
    PodsLog,
    TopPods,
    Describe,
    Log,
    Top,
}

impl SecondaryOption {
    pub fn label(self) -> &'static str {
        match self {
            Self::Nodes => "Nodes",
            Self::TopNodes => "Top Nodes",
            Self::Config => "Config",
            Self::Deployments => "Deployments",
            Self::Pods => "Pods",
            Self::PodsLog => "Pods Log",
            Self::TopPods => "Top Pods",
            Self::Describe => "Describe",
            Self::Log => "Log",
            Self::Top => "Top",
        }
    }

    /// Options whose output changes on its own and is re-rendered on every tick.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            Self::TopNodes | Self::TopPods | Self::Top | Self::Log | Self::PodsLog
        )
    }
}

impl Display for SecondaryOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct NavigationPath {
    pub view: PrimaryView,
    pub option: SecondaryOption,
}

impl NavigationPath {
    pub fn new(view: PrimaryView, option: SecondaryOption) -> Self {
        Self { view, option }
    }
}

impl Display for NavigationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {}", self.view.title(), self.option.label())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NamespaceScope {
    All,
    Named(String),
}

#[cfg(test)]
mod tests {
    use super::{PrimaryView, SecondaryOption};

    #[test]
    fn every_view_starts_with_a_default_option() {
        for view in PrimaryView::ALL {
            assert!(!view.options().is_empty(), "{view} has no options");
        }
        assert_eq!(PrimaryView::Pod.options()[0], SecondaryOption::Log);
        assert_eq!(
            PrimaryView::ClusterInfo.options()[0],
            SecondaryOption::Nodes
        );
    }

    #[test]
    fn view_index_round_trips() {
        for view in PrimaryView::ALL {
            assert_eq!(PrimaryView::from_index(view.index()), Some(view));
        }
        assert_eq!(PrimaryView::from_index(5), None);
    }

    #[test]
    fn only_workload_views_carry_a_resource_kind() {
        assert_eq!(PrimaryView::Service.resource_kind(), Some("service"));
        assert_eq!(PrimaryView::Deployment.resource_kind(), Some("deployment"));
        assert_eq!(PrimaryView::Pod.resource_kind(), Some("pod"));
        assert_eq!(PrimaryView::ClusterInfo.resource_kind(), None);
        assert_eq!(PrimaryView::Namespace.resource_kind(), None);
    }
}
