//! Role-to-route permission table.
//!
//! A table maps route prefixes to the roles allowed under them. Lookups
//! pick the longest prefix that matches on whole path segments, so
//! `/admin` covers `/admin` and `/admin/users` but not `/administrators`.

use scholarlink_models::Role;
use strum::IntoEnumIterator;

/// Where unauthenticated users are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// The landing route of each role, used when a navigation is refused.
pub fn home_route(role: Role) -> &'static str {
    match role {
        Role::Scholar => "/scholar",
        Role::Supervisor => "/supervisor",
        Role::ProgramChair => "/program-chair",
        Role::Administrator | Role::AdministratorReadonly => "/admin",
    }
}

/// What to do with a path no table entry covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoutePolicy {
    /// Unmapped paths are open to every role.
    #[default]
    DefaultOpen,
    /// Unmapped paths are refused unless under one of these public prefixes.
    DefaultDeny {
        /// Prefixes reachable by any authenticated role.
        public: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    prefix: String,
    roles: Vec<Role>,
}

/// Static mapping from route prefix to allowed roles.
///
/// # Examples
///
/// ```
/// use scholarlink_guard::RouteTable;
/// use scholarlink_models::Role;
///
/// let table = RouteTable::default().allow("/admin", [Role::Administrator]);
/// assert!(table.is_allowed(Role::Administrator, "/admin/users"));
/// assert!(!table.is_allowed(Role::Scholar, "/admin/users"));
/// assert!(table.is_allowed(Role::Scholar, "/library"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<Entry>,
    policy: RoutePolicy,
}

impl RouteTable {
    /// An empty table with the given policy for unmapped paths.
    pub fn new(policy: RoutePolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    /// The ScholarLink section layout: one section per role family.
    pub fn standard(policy: RoutePolicy) -> Self {
        Self::new(policy)
            .allow("/scholar", [Role::Scholar])
            .allow("/supervisor", [Role::Supervisor])
            .allow("/program-chair", [Role::ProgramChair])
            .allow("/admin", Role::iter().filter(|r| r.is_administrative()))
    }

    /// Restrict `prefix` to `roles`, replacing any previous entry for it.
    #[must_use]
    pub fn allow(mut self, prefix: &str, roles: impl IntoIterator<Item = Role>) -> Self {
        let prefix = normalize(prefix);
        let roles: Vec<Role> = roles.into_iter().collect();
        match self.entries.iter_mut().find(|e| e.prefix == prefix) {
            Some(entry) => entry.roles = roles,
            None => self.entries.push(Entry { prefix, roles }),
        }
        self
    }

    /// The policy applied to unmapped paths.
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// The roles allowed under the longest prefix matching `path`, if any.
    pub fn roles_for(&self, path: &str) -> Option<&[Role]> {
        let path = normalize(path);
        self.entries
            .iter()
            .filter(|e| covers(&e.prefix, &path))
            .max_by_key(|e| e.prefix.len())
            .map(|e| e.roles.as_slice())
    }

    /// The single authorization decision: may `role` open `path`?
    ///
    /// The login route is open to everyone whatever the table says.
    pub fn is_allowed(&self, role: Role, path: &str) -> bool {
        if covers(LOGIN_ROUTE, &normalize(path)) {
            return true;
        }
        match self.roles_for(path) {
            Some(roles) => roles.contains(&role),
            None => self.is_unmapped_allowed(path),
        }
    }

    /// Whether `path` is reachable without any identity.
    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        if covers(LOGIN_ROUTE, &path) {
            return true;
        }
        match &self.policy {
            RoutePolicy::DefaultOpen => false,
            RoutePolicy::DefaultDeny { public } => {
                public.iter().any(|p| covers(&normalize(p), &path))
            }
        }
    }

    fn is_unmapped_allowed(&self, path: &str) -> bool {
        match &self.policy {
            RoutePolicy::DefaultOpen => true,
            RoutePolicy::DefaultDeny { .. } => self.is_public(path),
        }
    }
}

/// Drop query and fragment, collapse the trailing slash, ensure a leading one.
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim().trim_matches('/');
    format!("/{trimmed}")
}

/// Segment-aware prefix test on normalized paths.
fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scholar_is_kept_out_of_admin() {
        let table = RouteTable::default().allow("/admin", [Role::Administrator]);
        assert!(!table.is_allowed(Role::Scholar, "/admin/x"));
        assert!(!table.is_allowed(Role::Scholar, "/admin"));
        assert!(table.is_allowed(Role::Administrator, "/admin/x"));
    }

    #[test]
    fn matching_is_segment_aware() {
        let table = RouteTable::default().allow("/admin", [Role::Administrator]);
        assert!(table.roles_for("/admin/").is_some());
        assert!(table.roles_for("/admin?tab=users").is_some());
        assert!(table.roles_for("/administrators").is_none());
        assert!(table.is_allowed(Role::Scholar, "/administrators"));
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::default()
            .allow("/admin", [Role::Administrator, Role::AdministratorReadonly])
            .allow("/admin/settings", [Role::Administrator]);

        assert!(table.is_allowed(Role::AdministratorReadonly, "/admin/users"));
        assert!(!table.is_allowed(Role::AdministratorReadonly, "/admin/settings/keys"));
        assert!(table.is_allowed(Role::Administrator, "/admin/settings/keys"));
    }

    #[test]
    fn allow_replaces_existing_entry() {
        let table = RouteTable::default()
            .allow("/reports", [Role::Supervisor])
            .allow("/reports/", [Role::ProgramChair]);
        assert_eq!(table.roles_for("/reports"), Some(&[Role::ProgramChair][..]));
    }

    #[test]
    fn default_open_allows_unmapped_paths() {
        let table = RouteTable::standard(RoutePolicy::DefaultOpen);
        for role in Role::iter() {
            assert!(table.is_allowed(role, "/calendar"));
        }
    }

    #[test]
    fn default_deny_only_allows_public_unmapped_paths() {
        let table = RouteTable::standard(RoutePolicy::DefaultDeny {
            public: vec!["/help".into()],
        });
        assert!(!table.is_allowed(Role::Administrator, "/calendar"));
        assert!(table.is_allowed(Role::Scholar, "/help/faq"));
        assert!(table.is_allowed(Role::Scholar, LOGIN_ROUTE));
        assert!(table.is_allowed(Role::Scholar, "/scholar/thesis"));
    }

    #[test]
    fn every_role_may_open_its_home() {
        let table = RouteTable::standard(RoutePolicy::DefaultDeny { public: Vec::new() });
        for role in Role::iter() {
            assert!(table.is_allowed(role, home_route(role)), "{role}");
        }
    }

    #[test]
    fn login_route_survives_a_root_entry() {
        let table = RouteTable::default().allow("/", [Role::Administrator]);
        assert!(table.is_allowed(Role::Scholar, LOGIN_ROUTE));
        assert!(table.is_allowed(Role::Scholar, "/login?next=/admin"));
        assert!(!table.is_allowed(Role::Scholar, home_route(Role::Scholar)));
    }

    #[test]
    fn root_prefix_covers_everything() {
        let table = RouteTable::default().allow("/", [Role::Administrator]);
        assert!(!table.is_allowed(Role::Scholar, "/anything"));
        assert!(table.is_allowed(Role::Administrator, "/"));
    }
}
