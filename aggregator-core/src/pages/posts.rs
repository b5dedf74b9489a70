use super::{ActionState, Phase, Status};
use crate::api::ApiClient;
use crate::models::Post;

/// Latest posts across every feed.
#[derive(Debug, Clone, Default)]
pub struct PostsPage {
    pub phase: Phase,
    pub posts: Vec<Post>,
    pub action: ActionState,
}

impl PostsPage {
    pub async fn load(&mut self, api: &ApiClient) {
        if !self.action.begin() {
            return;
        }
        self.phase = Phase::Loading;

        let status = match api.list_posts().await {
            Ok(posts) => {
                self.posts = posts;
                None
            }
            Err(err) => Some(Status::error(err.describe("Failed to load posts"))),
        };

        self.phase = Phase::Ready;
        self.action.finish(status);
    }
}
