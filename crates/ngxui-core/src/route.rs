// ABOUTME: The static route table binding every API method + path template to a named handler.
// ABOUTME: Keeps the public/protected boundary auditable in one place; the server builds its router from it.

use HandlerId as H;
use RouteMethod::{Delete, Get, Post};

/// Prefix every API route lives under.
pub const API_PREFIX: &str = "/api";

/// HTTP methods used by the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteMethod {
    Get,
    Post,
    Delete,
}

impl RouteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Delete => "DELETE",
        }
    }
}

/// Whether a route sits behind the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Protected,
}

/// Names of the external handlers the table dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerId {
    InstallLockCheck,
    InstallNginxUi,
    Login,
    Logout,
    Analytic,
    GetUsers,
    GetUser,
    AddUser,
    EditUser,
    DeleteUser,
    GetDomains,
    GetDomain,
    EditDomain,
    EnableDomain,
    DisableDomain,
    DeleteDomain,
    GetConfigs,
    GetConfig,
    AddConfig,
    EditConfig,
    GetFileBackupList,
    GetFileBackup,
    GetTemplate,
    IssueCert,
    CertInfo,
    AddDomainToAutoCert,
    RemoveDomainFromAutoCert,
}

impl HandlerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerId::InstallLockCheck => "install_lock_check",
            HandlerId::InstallNginxUi => "install_nginx_ui",
            HandlerId::Login => "login",
            HandlerId::Logout => "logout",
            HandlerId::Analytic => "analytic",
            HandlerId::GetUsers => "get_users",
            HandlerId::GetUser => "get_user",
            HandlerId::AddUser => "add_user",
            HandlerId::EditUser => "edit_user",
            HandlerId::DeleteUser => "delete_user",
            HandlerId::GetDomains => "get_domains",
            HandlerId::GetDomain => "get_domain",
            HandlerId::EditDomain => "edit_domain",
            HandlerId::EnableDomain => "enable_domain",
            HandlerId::DisableDomain => "disable_domain",
            HandlerId::DeleteDomain => "delete_domain",
            HandlerId::GetConfigs => "get_configs",
            HandlerId::GetConfig => "get_config",
            HandlerId::AddConfig => "add_config",
            HandlerId::EditConfig => "edit_config",
            HandlerId::GetFileBackupList => "get_file_backup_list",
            HandlerId::GetFileBackup => "get_file_backup",
            HandlerId::GetTemplate => "get_template",
            HandlerId::IssueCert => "issue_cert",
            HandlerId::CertInfo => "cert_info",
            HandlerId::AddDomainToAutoCert => "add_domain_to_auto_cert",
            HandlerId::RemoveDomainFromAutoCert => "remove_domain_from_auto_cert",
        }
    }
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: RouteMethod,
    /// Path template; `{name}` segments are passed to the handler verbatim.
    pub path: &'static str,
    pub access: Access,
    pub handler: HandlerId,
}

const fn public(method: RouteMethod, path: &'static str, handler: HandlerId) -> RouteEntry {
    RouteEntry {
        method,
        path,
        access: Access::Public,
        handler,
    }
}

const fn protected(method: RouteMethod, path: &'static str, handler: HandlerId) -> RouteEntry {
    RouteEntry {
        method,
        path,
        access: Access::Protected,
        handler,
    }
}

/// Every API route the server exposes.
pub static ROUTES: &[RouteEntry] = &[
    public(Get, "/api/install", H::InstallLockCheck),
    public(Post, "/api/install", H::InstallNginxUi),
    public(Post, "/api/login", H::Login),
    public(Delete, "/api/logout", H::Logout),
    protected(Get, "/api/analytic", H::Analytic),
    // users
    protected(Get, "/api/users", H::GetUsers),
    protected(Get, "/api/user/{id}", H::GetUser),
    protected(Post, "/api/user", H::AddUser),
    protected(Post, "/api/user/{id}", H::EditUser),
    protected(Delete, "/api/user/{id}", H::DeleteUser),
    // domains
    protected(Get, "/api/domains", H::GetDomains),
    protected(Get, "/api/domain/{name}", H::GetDomain),
    protected(Post, "/api/domain/{name}", H::EditDomain),
    protected(Post, "/api/domain/{name}/enable", H::EnableDomain),
    protected(Post, "/api/domain/{name}/disable", H::DisableDomain),
    protected(Delete, "/api/domain/{name}", H::DeleteDomain),
    // configs
    protected(Get, "/api/configs", H::GetConfigs),
    protected(Get, "/api/config/{name}", H::GetConfig),
    protected(Post, "/api/config", H::AddConfig),
    protected(Post, "/api/config/{name}", H::EditConfig),
    // backups
    protected(Get, "/api/backups", H::GetFileBackupList),
    protected(Get, "/api/backup/{id}", H::GetFileBackup),
    protected(Get, "/api/template/{name}", H::GetTemplate),
    // certificates
    protected(Get, "/api/cert/issue/{domain}", H::IssueCert),
    protected(Get, "/api/cert/{domain}/info", H::CertInfo),
    protected(Post, "/api/cert/{domain}", H::AddDomainToAutoCert),
    protected(Delete, "/api/cert/{domain}", H::RemoveDomainFromAutoCert),
];

/// Entries with the given access level, in table order.
pub fn routes_with(access: Access) -> impl Iterator<Item = &'static RouteEntry> {
    ROUTES.iter().filter(move |entry| entry.access == access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn method_and_path_pairs_are_unique() {
        let mut seen = HashSet::new();
        for entry in ROUTES {
            assert!(
                seen.insert((entry.method, entry.path)),
                "duplicate route {} {}",
                entry.method.as_str(),
                entry.path
            );
        }
    }

    #[test]
    fn every_route_lives_under_api_prefix() {
        for entry in ROUTES {
            assert!(
                entry.path.starts_with(&format!("{API_PREFIX}/")),
                "{} is outside {API_PREFIX}",
                entry.path
            );
        }
    }

    #[test]
    fn groups_never_share_a_path() {
        let public: HashSet<_> = routes_with(Access::Public).map(|e| e.path).collect();
        for entry in routes_with(Access::Protected) {
            assert!(
                !public.contains(entry.path),
                "{} is both public and protected",
                entry.path
            );
        }
    }

    #[test]
    fn public_surface_is_install_login_logout() {
        let public: Vec<_> = routes_with(Access::Public)
            .map(|e| (e.method, e.path))
            .collect();

        assert_eq!(
            public,
            vec![
                (Get, "/api/install"),
                (Post, "/api/install"),
                (Post, "/api/login"),
                (Delete, "/api/logout"),
            ]
        );
    }

    #[test]
    fn each_handler_is_bound_once() {
        let mut seen = HashSet::new();
        for entry in ROUTES {
            assert!(seen.insert(entry.handler), "{:?} bound twice", entry.handler);
        }
        assert_eq!(seen.len(), 27);
    }

    #[test]
    fn certificate_routes_are_protected() {
        let cert: Vec<_> = ROUTES
            .iter()
            .filter(|e| e.path.starts_with("/api/cert"))
            .collect();
        assert_eq!(cert.len(), 4);
        assert!(cert.iter().all(|e| e.access == Access::Protected));
    }
}
