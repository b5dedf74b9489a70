/// Views reachable from the navigation bar, keyed by the paths the web
/// client used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Posts,
    Feeds,
    Login,
    Register,
    MyFeed,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Posts,
        Route::Feeds,
        Route::Login,
        Route::Register,
        Route::MyFeed,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Posts => "/",
            Route::Feeds => "/feeds",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::MyFeed => "/me",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Self::ALL.into_iter().find(|r| r.path() == normalized)
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Posts => "Posts",
            Route::Feeds => "Feeds",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::MyFeed => "My Feed",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Route::MyFeed)
    }

    /// Where navigation actually lands: protected views bounce to the login page.
    pub fn resolve(self, authenticated: bool) -> Route {
        if self.requires_auth() && !authenticated {
            Route::Login
        } else {
            self
        }
    }
}
