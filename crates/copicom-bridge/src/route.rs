use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// In-app navigation targets reachable from a notification.
///
/// Each route lives inside a tab of the frontend's navigation tree; a
/// frontend navigates to [`Route::tab`] and then to [`Route::name`] within it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Route {
    PollDetail { poll_id: String, title: String },
    NewsDetail { news_id: String },
}

impl Route {
    /// Screen name of the route.
    pub fn name(&self) -> &'static str {
        match self {
            Route::PollDetail { .. } => "PollDetail",
            Route::NewsDetail { .. } => "NewsDetail",
        }
    }

    /// Tab that hosts the route's screen.
    pub fn tab(&self) -> &'static str {
        match self {
            Route::PollDetail { .. } => "Encuestas",
            Route::NewsDetail { .. } => "Noticias",
        }
    }

    /// Screen parameters in the shape the screens read them.
    pub fn params(&self) -> Value {
        match self {
            Route::PollDetail { poll_id, title } => json!({ "pollId": poll_id, "title": title }),
            Route::NewsDetail { news_id } => json!({ "newsId": news_id }),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} {}", self.tab(), self.name(), self.params())
    }
}
