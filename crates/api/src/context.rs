use catalog_core::UserId;

/// Per-request context, built by middleware before any handler runs.
///
/// Carries what the serializers need from the request itself (the origin
/// used to build absolute locators) and the deployment mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    origin: Option<String>,
    debug: bool,
}

impl RequestContext {
    pub fn new(origin: Option<String>, debug: bool) -> Self {
        Self { origin, debug }
    }

    /// Absolute locator in debug mode, relative otherwise.
    pub fn locator(&self, url: String) -> String {
        match (&self.origin, self.debug) {
            (Some(origin), true) if url.starts_with('/') => format!("{origin}{url}"),
            _ => url,
        }
    }
}

/// Authenticated caller (present only behind the auth middleware).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    username: String,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, username: String) -> Self {
        Self { user_id, username }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
