use std::convert::Infallible;

use {
    axum::{
        Form, Router,
        extract::{FromRequest, Request},
        middleware,
        routing::MethodRouter,
    },
    serde::Deserialize,
};

use crate::guard::{Role, require_role};

/// Builder for the `/api` tree.
///
/// User routes are mounted under `/user`, admin routes under `/admin`; each
/// group is wrapped by a [`require_role`] gate when the router is built.
pub struct ApiRoutes<S> {
    public: Router<S>,
    user: Option<Router<S>>,
    admin: Option<Router<S>>,
}

impl<S> Default for ApiRoutes<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ApiRoutes<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            public: Router::new(),
            user: None,
            admin: None,
        }
    }

    /// Ungated route.
    pub fn public(mut self, path: &str, route: MethodRouter<S>) -> Self {
        self.public = self.public.route(path, route);
        self
    }

    /// Route at `/user{path}`, reachable by signed-in users and admins.
    pub fn user(mut self, path: &str, route: MethodRouter<S>) -> Self {
        self.user = Some(self.user.take().unwrap_or_default().route(path, route));
        self
    }

    /// Route at `/admin{path}`, reachable by admins only.
    pub fn admin(mut self, path: &str, route: MethodRouter<S>) -> Self {
        self.admin = Some(self.admin.take().unwrap_or_default().route(path, route));
        self
    }

    pub fn build(self) -> Router<S> {
        let mut router = self.public;
        if let Some(user) = self.user {
            router = router.nest("/user", gated(user, Role::User));
        }
        if let Some(admin) = self.admin {
            router = router.nest("/admin", gated(admin, Role::Admin));
        }
        router
    }
}

fn gated<S>(router: Router<S>, required: Role) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(required, require_role))
}

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;

/// Paging parameters (`page`, `perPage`) read from a form body or query string.
///
/// Missing, unparsable or zero values fall back to page 1 of 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageArgs {
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RawPageArgs {
    page: Option<String>,
    #[serde(rename = "perPage")]
    per_page: Option<String>,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageArgs {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    fn parse(page: Option<&str>, per_page: Option<&str>) -> Self {
        let field = |raw: Option<&str>, default: u64| match raw {
            None => Some(default),
            Some(s) => s.trim().parse::<u64>().ok().filter(|n| *n > 0),
        };
        match (
            field(page, DEFAULT_PAGE),
            field(per_page, DEFAULT_PER_PAGE),
        ) {
            (Some(page), Some(per_page)) => Self { page, per_page },
            _ => Self::default(),
        }
    }
}

impl<S: Send + Sync> FromRequest<S> for PageArgs {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Form::<RawPageArgs>::from_request(req, state)
            .await
            .map(|Form(raw)| raw)
            .unwrap_or_default();
        Ok(Self::parse(raw.page.as_deref(), raw.per_page.as_deref()))
    }
}
