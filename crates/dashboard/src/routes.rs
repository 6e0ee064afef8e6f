use std::fmt;

/// Navigable locations of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    /// Clients of one process; `None` when the path carried no id.
    Clients(Option<String>),
    Errors(Option<String>),
    AllClients,
    Health,
}

impl Route {
    /// Parses a path. Unknown paths redirect to the dashboard.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] | ["dashboard"] => Self::Dashboard,
            ["dashboard", "clients"] => Self::Clients(None),
            ["dashboard", "clients", id] => Self::Clients(Some((*id).to_string())),
            ["dashboard", "errors"] => Self::Errors(None),
            ["dashboard", "errors", id] => Self::Errors(Some((*id).to_string())),
            ["clientes"] => Self::AllClients,
            ["health"] => Self::Health,
            _ => {
                tracing::debug!(path, "unknown route, redirecting to /dashboard");
                Self::Dashboard
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Dashboard => "/dashboard".to_string(),
            Self::Clients(Some(id)) => format!("/dashboard/clients/{id}"),
            Self::Clients(None) => "/dashboard/clients".to_string(),
            Self::Errors(Some(id)) => format!("/dashboard/errors/{id}"),
            Self::Errors(None) => "/dashboard/errors".to_string(),
            Self::AllClients => "/clientes".to_string(),
            Self::Health => "/health".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
