use tracing::warn;

use super::{ActionState, Status};
use crate::api::ApiClient;
use crate::routes::Route;

#[derive(Debug, Clone, Default)]
pub struct LoginPage {
    pub username: String,
    pub password: String,
    pub action: ActionState,
}

impl LoginPage {
    /// Exchanges the credentials for a token and opens the session.
    /// Returns the route to navigate to on success.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        if !self.action.begin() {
            return None;
        }

        let response = match api.login(self.username.trim(), &self.password).await {
            Ok(response) => response,
            Err(err) => {
                self.action
                    .finish(Some(Status::error(err.describe("Login failed"))));
                return None;
            }
        };

        if let Err(err) = api.session().login(response.token, response.user).await {
            warn!(error = %err, "could not persist session");
            self.action
                .finish(Some(Status::error("Login failed: the session could not be saved")));
            return None;
        }

        self.password.clear();
        self.action.finish(None);
        Some(Route::MyFeed)
    }
}
