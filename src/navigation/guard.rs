use super::{Navigator, Route};

/// Read side of the session as seen by guards
pub trait AuthStatus {
    fn is_authenticated(&self) -> bool;
}

/// Allow authenticated users; everyone else is sent to the login page
pub fn auth_guard(auth: &dyn AuthStatus, navigator: &dyn Navigator) -> bool {
    if auth.is_authenticated() {
        return true;
    }
    navigator.navigate(Route::Login);
    false
}

/// Allow anonymous users; a signed-in user is sent to the dashboard
pub fn guest_guard(auth: &dyn AuthStatus, navigator: &dyn Navigator) -> bool {
    if !auth.is_authenticated() {
        return true;
    }
    navigator.navigate(Route::Dashboard);
    false
}
