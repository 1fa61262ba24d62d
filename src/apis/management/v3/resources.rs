//! Names of every kind the management client knows about.

use kube::core::{GroupVersionKind, GroupVersionResource};
use serde::Serialize;

use super::{GROUP_NAME, VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub kind: &'static str,
    /// Resource name as used in URLs, e.g. `clusterloggings`.
    pub name: &'static str,
    pub singular_name: &'static str,
    pub namespaced: bool,
}

impl ResourceDescriptor {
    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(GROUP_NAME, VERSION, self.kind)
    }

    pub fn group_version_resource(&self) -> GroupVersionResource {
        GroupVersionResource::gvr(GROUP_NAME, VERSION, self.name)
    }
}

macro_rules! descriptors {
    ($($kind:literal, $name:literal, $singular:literal, $namespaced:literal;)+) => {
        pub const RESOURCES: &[ResourceDescriptor] = &[
            $(ResourceDescriptor {
                kind: $kind,
                name: $name,
                singular_name: $singular,
                namespaced: $namespaced,
            },)+
        ];
    };
}

descriptors! {
    "Machine", "machines", "machine", true;
    "MachineDriver", "machinedrivers", "machinedriver", false;
    "MachineTemplate", "machinetemplates", "machinetemplate", true;
    "Project", "projects", "project", true;
    "GlobalRole", "globalroles", "globalrole", false;
    "GlobalRoleBinding", "globalrolebindings", "globalrolebinding", false;
    "RoleTemplate", "roletemplates", "roletemplate", false;
    "PodSecurityPolicyTemplate", "podsecuritypolicytemplates", "podsecuritypolicytemplate", false;
    "ClusterRoleTemplateBinding", "clusterroletemplatebindings", "clusterroletemplatebinding", true;
    "ProjectRoleTemplateBinding", "projectroletemplatebindings", "projectroletemplatebinding", true;
    "Cluster", "clusters", "cluster", false;
    "ClusterEvent", "clusterevents", "clusterevent", true;
    "ClusterRegistrationToken", "clusterregistrationtokens", "clusterregistrationtoken", true;
    "Catalog", "catalogs", "catalog", false;
    "Template", "templates", "template", false;
    "TemplateVersion", "templateversions", "templateversion", false;
    "Group", "groups", "group", false;
    "GroupMember", "groupmembers", "groupmember", false;
    "Principal", "principals", "principal", false;
    "User", "users", "user", false;
    "AuthConfig", "authconfigs", "authconfig", false;
    "Token", "tokens", "token", false;
    "DynamicSchema", "dynamicschemas", "dynamicschema", false;
    "Preference", "preferences", "preference", true;
    "ClusterLogging", "clusterloggings", "clusterlogging", true;
    "ProjectLogging", "projectloggings", "projectlogging", true;
    "ListenConfig", "listenconfigs", "listenconfig", false;
    "Setting", "settings", "setting", false;
}

pub fn find_by_kind(kind: &str) -> Option<&'static ResourceDescriptor> {
    RESOURCES.iter().find(|r| r.kind == kind)
}

pub fn find_by_name(name: &str) -> Option<&'static ResourceDescriptor> {
    RESOURCES.iter().find(|r| r.name == name)
}

/// Resource string used in cache-miss errors: the kind with a lowercase
/// first letter, e.g. `clusterLogging`.
pub fn lower_camel_kind(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
