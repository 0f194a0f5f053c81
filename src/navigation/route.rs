use std::fmt;

/// Client-side routes of the tracker UI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Projects,
    Project { id: i64 },
    Board { project_id: i64, board_id: i64 },
    Analytics { project_id: i64 },
    Team { project_id: i64 },
    Notifications,
    Settings,
    Pricing,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/auth/login".to_string(),
            Route::Register => "/auth/register".to_string(),
            Route::ForgotPassword => "/auth/forgot-password".to_string(),
            Route::ResetPassword => "/auth/reset-password".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::Project { id } => format!("/projects/{}", id),
            Route::Board {
                project_id,
                board_id,
            } => format!("/projects/{}/board/{}", project_id, board_id),
            Route::Analytics { project_id } => format!("/analytics/{}", project_id),
            Route::Team { project_id } => format!("/team/{}", project_id),
            Route::Notifications => "/notifications".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Pricing => "/pricing".to_string(),
        }
    }

    /// Resolve a path; unknown authenticated paths fall through to the dashboard
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["auth"] | ["auth", "login"] => Route::Login,
            ["auth", "register"] => Route::Register,
            ["auth", "forgot-password"] => Route::ForgotPassword,
            ["auth", "reset-password"] => Route::ResetPassword,
            ["projects"] => Route::Projects,
            ["projects", id] => id
                .parse()
                .map(|id| Route::Project { id })
                .unwrap_or(Route::Dashboard),
            ["projects", project_id, "board", board_id] => {
                match (project_id.parse(), board_id.parse()) {
                    (Ok(project_id), Ok(board_id)) => Route::Board {
                        project_id,
                        board_id,
                    },
                    _ => Route::Dashboard,
                }
            }
            ["analytics", id] => id
                .parse()
                .map(|project_id| Route::Analytics { project_id })
                .unwrap_or(Route::Dashboard),
            ["team", id] => id
                .parse()
                .map(|project_id| Route::Team { project_id })
                .unwrap_or(Route::Dashboard),
            ["notifications"] => Route::Notifications,
            ["settings"] => Route::Settings,
            ["pricing"] => Route::Pricing,
            _ => Route::Dashboard,
        }
    }

    /// Guest-only routes are the `/auth/*` pages
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Route::Login | Route::Register | Route::ForgotPassword | Route::ResetPassword
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/auth"), Route::Login);
        assert_eq!(Route::parse("/auth/reset-password?token=abc"), Route::ResetPassword);
        assert_eq!(
            Route::parse("/projects/3/board/12"),
            Route::Board {
                project_id: 3,
                board_id: 12
            }
        );
        assert_eq!(Route::parse("/team/3"), Route::Team { project_id: 3 });
    }

    #[test]
    fn test_unknown_paths_redirect_to_dashboard() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse("/projects/abc"), Route::Dashboard);
        assert_eq!(Route::parse("/nowhere"), Route::Dashboard);
    }

    #[test]
    fn test_path_roundtrip() {
        let routes = [
            Route::Login,
            Route::Projects,
            Route::Board {
                project_id: 1,
                board_id: 2,
            },
            Route::Analytics { project_id: 5 },
            Route::Pricing,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
        assert!(!Route::Login.requires_auth());
        assert!(Route::Pricing.requires_auth());
    }
}
