mod extraction;
mod health;
mod quiz;
mod words;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/extract/text", post(extraction::extract_text))
        .route("/api/v1/extract/image", post(extraction::extract_image))
        .route("/api/v1/extract/confirm", post(extraction::confirm))
        .route("/api/v1/words", get(words::list_words).post(words::add_word))
        .route("/api/v1/words/:id", delete(words::delete_word))
        .route("/api/v1/quiz", get(quiz::next_question))
        .route("/api/v1/quiz/answer", post(quiz::answer))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_provider::LLMProvider;
    use crate::services::ocr::OcrClient;

    #[test]
    fn router_registers_every_route() {
        let state = AppState::new(None, LLMProvider::from_env(), OcrClient::from_env(), 30);
        let _app = router(state);
    }
}
