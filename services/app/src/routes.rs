//! Route table of the ticket app

use serde::Serialize;

/// Path of the login page; guards redirect here
pub const LOGIN_PATH: &str = "/auth/login";

/// A page of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
    Tickets,
    NotFound,
}

struct RouteDef {
    path: &'static str,
    route: Route,
    requires_auth: bool,
}

const ROUTES: &[RouteDef] = &[
    RouteDef {
        path: "/",
        route: Route::Home,
        requires_auth: false,
    },
    RouteDef {
        path: LOGIN_PATH,
        route: Route::Login,
        requires_auth: false,
    },
    RouteDef {
        path: "/auth/signup",
        route: Route::Signup,
        requires_auth: false,
    },
    RouteDef {
        path: "/dashboard",
        route: Route::Dashboard,
        requires_auth: true,
    },
    RouteDef {
        path: "/tickets",
        route: Route::Tickets,
        requires_auth: true,
    },
];

impl Route {
    /// Match a location against the route table
    ///
    /// Query string, fragment and trailing slashes are ignored.
    pub fn resolve(location: &str) -> Route {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };

        ROUTES
            .iter()
            .find(|def| def.path == path)
            .map(|def| def.route)
            .unwrap_or(Route::NotFound)
    }

    fn def(&self) -> Option<&'static RouteDef> {
        ROUTES.iter().find(|def| def.route == *self)
    }

    /// Canonical path, `None` for the not-found page
    pub fn path(&self) -> Option<&'static str> {
        self.def().map(|def| def.path)
    }

    /// Whether navigating here needs a valid session
    pub fn requires_auth(&self) -> bool {
        self.def().is_some_and(|def| def.requires_auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_paths() {
        assert_eq!(Route::resolve("/"), Route::Home);
        assert_eq!(Route::resolve(""), Route::Home);
        assert_eq!(Route::resolve("/auth/login"), Route::Login);
        assert_eq!(Route::resolve("/auth/signup/"), Route::Signup);
        assert_eq!(Route::resolve("/dashboard"), Route::Dashboard);
        assert_eq!(Route::resolve("/tickets?page=2"), Route::Tickets);
        assert_eq!(Route::resolve("/auth/login?m=session_expired"), Route::Login);
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        assert_eq!(Route::resolve("/tickets/t_1"), Route::NotFound);
        assert_eq!(Route::resolve("/admin"), Route::NotFound);
        assert_eq!(Route::NotFound.path(), None);
        assert!(!Route::NotFound.requires_auth());
    }

    #[test]
    fn test_only_dashboard_pages_are_protected() {
        let protected: Vec<_> = [
            Route::Home,
            Route::Login,
            Route::Signup,
            Route::Dashboard,
            Route::Tickets,
        ]
        .into_iter()
        .filter(Route::requires_auth)
        .collect();
        assert_eq!(protected, vec![Route::Dashboard, Route::Tickets]);
    }

    #[test]
    fn test_path_round_trips() {
        assert_eq!(Route::Tickets.path(), Some("/tickets"));
        assert_eq!(Route::resolve(Route::Signup.path().unwrap()), Route::Signup);
    }
}
