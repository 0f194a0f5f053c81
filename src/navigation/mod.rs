// Client routes, navigation and route guards

pub mod guard;
pub mod route;

use std::sync::{Mutex, PoisonError};

pub use guard::{auth_guard, guest_guard, AuthStatus};
pub use route::Route;

/// Anything that can move the user to another route
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// In-process router: remembers the current route and every navigation made
#[derive(Debug)]
pub struct Router {
    state: Mutex<RouterState>,
}

#[derive(Debug)]
struct RouterState {
    current: Route,
    history: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            state: Mutex::new(RouterState {
                current: initial,
                history: Vec::new(),
            }),
        }
    }

    pub fn current(&self) -> Route {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Every route navigated to, oldest first
    pub fn history(&self) -> Vec<Route> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }

    /// Count of navigations to `route`
    pub fn visits(&self, route: &Route) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .iter()
            .filter(|r| *r == route)
            .count()
    }

    /// Attempt to enter `route`, running the guard that protects it.
    /// Returns false when the guard redirected elsewhere.
    pub fn activate(&self, route: Route, auth: &dyn AuthStatus) -> bool {
        let allowed = if route.requires_auth() {
            auth_guard(auth, self)
        } else {
            guest_guard(auth, self)
        };

        if allowed {
            self.navigate(route);
        }
        allowed
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigate to {}", route.path());
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current = route.clone();
        state.history.push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    impl AuthStatus for Fixed {
        fn is_authenticated(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_activate_protected_route_when_logged_out() {
        let router = Router::new(Route::Login);
        assert!(!router.activate(Route::Projects, &Fixed(false)));
        assert_eq!(router.current(), Route::Login);
        assert_eq!(router.history(), vec![Route::Login]);
    }

    #[test]
    fn test_activate_guest_route_when_logged_in() {
        let router = Router::default();
        assert!(!router.activate(Route::Register, &Fixed(true)));
        assert_eq!(router.current(), Route::Dashboard);

        assert!(router.activate(Route::Project { id: 4 }, &Fixed(true)));
        assert_eq!(router.current(), Route::Project { id: 4 });
        assert_eq!(router.visits(&Route::Dashboard), 1);
    }
}
