use super::{ActionState, Status};
use crate::api::ApiClient;
use crate::routes::Route;

pub const REGISTERED_MESSAGE: &str = "Registered! You can now login.";

#[derive(Debug, Clone, Default)]
pub struct RegisterPage {
    pub username: String,
    pub email: String,
    pub password: String,
    pub action: ActionState,
}

impl RegisterPage {
    /// Creates the account. On success the caller should move on to the
    /// returned route (the login page); no session is opened here.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        if !self.action.begin() {
            return None;
        }

        match api
            .register(self.username.trim(), self.email.trim(), &self.password)
            .await
        {
            Ok(_) => {
                self.password.clear();
                self.action.finish(Some(Status::info(REGISTERED_MESSAGE)));
                Some(Route::Login)
            }
            Err(err) => {
                self.action
                    .finish(Some(Status::error(err.describe("Registration failed"))));
                None
            }
        }
    }
}
