pub mod guard;

pub use guard::{GuardDecision, RouteGuard};

pub const ROUTE_LOGIN: &str = "/login";
pub const ROUTE_SIGNUP: &str = "/signup";
pub const ROUTE_HOME: &str = "/home";

/// Query parameter carrying the originally requested path through a
/// login redirect.
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// Routes reachable only while unauthenticated.
pub fn is_public_only(path: &str) -> bool {
    matches!(path, ROUTE_LOGIN | ROUTE_SIGNUP)
}

/// Navigation surface the session layer drives. The real router lives in
/// the host application; the crate only decides where to go.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    fn navigate(&self, path: &str, query: &[(&str, &str)]);
}

/// Navigator that records intents to the log. Useful for headless hosts
/// such as the CLI, where "navigation" has nowhere to land.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str, query: &[(&str, &str)]) {
        tracing::info!(path, ?query, "navigation requested");
    }
}
