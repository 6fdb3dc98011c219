// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;

use crate::config::AiConfig;
use crate::error::Fallible;
use crate::types::card::Card;

const SYSTEM_PROMPT: &str = "You are a helpful Jeopardy study assistant. Help users understand Jeopardy clues and answers in a clear and educational way. The goal is to make the person asking the question better at answering trivia questions.";

/// Why an AI request failed. The `Display` text is shown to the user as-is.
#[derive(Debug, PartialEq)]
pub enum AiError {
    EmptyQuestion,
    MissingCredential,
    /// HTTP 401.
    InvalidCredential,
    /// HTTP 429.
    RateLimited,
    /// HTTP 500.
    UpstreamError,
    /// Any other non-success status.
    Api { status: u16, message: String },
    /// The request never got a response.
    Network(String),
    /// A success status, but no completion text in the body.
    MalformedResponse(String),
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::EmptyQuestion => write!(f, "Please enter a question"),
            AiError::MissingCredential => {
                write!(f, "No API key found. Please set your API key in settings.")
            }
            AiError::InvalidCredential => {
                write!(f, "Invalid API key. Please check your settings.")
            }
            AiError::RateLimited => write!(f, "Rate limit exceeded. Please try again later."),
            AiError::UpstreamError => {
                write!(f, "The AI service had a server error. Please try again later.")
            }
            AiError::Api { message, .. } => write!(f, "{message}"),
            AiError::Network(reason) => write!(f, "Could not reach the AI service: {reason}"),
            AiError::MalformedResponse(reason) => {
                write!(f, "The AI service sent an unexpected response: {reason}")
            }
        }
    }
}

impl Error for AiError {}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Sends a card and a free-text question to a chat-completions endpoint.
#[derive(Clone)]
pub struct AiClient {
    http: Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Fallible<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Ask about `card`. Failures are terminal for this call and never
    /// retried.
    pub async fn ask(
        &self,
        credential: Option<&str>,
        card: &Card,
        user_question: &str,
    ) -> Result<String, AiError> {
        let user_question = user_question.trim();
        if user_question.is_empty() {
            return Err(AiError::EmptyQuestion);
        }
        let Some(credential) = credential else {
            return Err(AiError::MissingCredential);
        };
        let request = build_request(&self.config, card, user_question);
        log::debug!("Asking {} about {}", self.config.endpoint, card.id());
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(network_error)?;
        if !status.is_success() {
            let error = classify_failure(status.as_u16(), &body);
            log::error!("AI request failed with status {status}: {error}");
            return Err(error);
        }
        extract_completion(&body)
    }
}

fn build_request<'a>(config: &'a AiConfig, card: &Card, user_question: &str) -> ChatRequest<'a> {
    let context = format!(
        "Here is the current Jeopardy clue I'm studying:\n\nQuestion: {}\nAnswer: {}\nCategory: {}\n\nMy question: {}",
        card.question(),
        card.answer(),
        card.category(),
        user_question
    );
    ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: context,
            },
        ],
        temperature: config.temperature,
    }
}

fn network_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Network("the request timed out".to_string())
    } else {
        AiError::Network(e.to_string())
    }
}

/// Map a non-success status and its body to an error.
pub fn classify_failure(status: u16, body: &str) -> AiError {
    match status {
        401 => AiError::InvalidCredential,
        429 => AiError::RateLimited,
        500 => AiError::UpstreamError,
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("API error: {status}"));
            AiError::Api { status, message }
        }
    }
}

/// Pull the completion text out of `choices[0].message.content`.
pub fn extract_completion(body: &str) -> Result<String, AiError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AiError::MalformedResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AiError::MalformedResponse("no completion in response".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::http::StatusCode;
    use axum::http::header::AUTHORIZATION;
    use axum::routing::post;
    use serde_json::Value;
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    fn card() -> Card {
        Card::new("This planet is known as the Red Planet", "Mars", "Science", None)
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(classify_failure(401, ""), AiError::InvalidCredential);
        assert_eq!(classify_failure(429, ""), AiError::RateLimited);
        assert_eq!(classify_failure(500, ""), AiError::UpstreamError);
        assert_eq!(
            classify_failure(400, r#"{"error": {"message": "bad model"}}"#),
            AiError::Api {
                status: 400,
                message: "bad model".to_string()
            }
        );
        assert_eq!(
            classify_failure(503, "<html>"),
            AiError::Api {
                status: 503,
                message: "API error: 503".to_string()
            }
        );
    }

    #[test]
    fn test_extract_completion() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "Mars is red."}}]}"#;
        assert_eq!(extract_completion(body), Ok("Mars is red.".to_string()));
    }

    #[test]
    fn test_extract_completion_malformed() {
        for body in [
            "",
            "{}",
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": {"content": null}}]}"#,
        ] {
            assert!(
                matches!(extract_completion(body), Err(AiError::MalformedResponse(_))),
                "accepted {body:?}"
            );
        }
    }

    #[test]
    fn test_build_request() -> Result<(), serde_json::Error> {
        let config = AiConfig::default();
        let request = build_request(&config, &card(), "Why red?");
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        let content = value["messages"][1]["content"].as_str().unwrap_or_default();
        assert!(content.contains("Question: This planet is known as the Red Planet\n"));
        assert!(content.contains("Answer: Mars\n"));
        assert!(content.contains("Category: Science\n"));
        assert!(content.ends_with("My question: Why red?"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_question() {
        let client = AiClient::new(AiConfig::default()).unwrap();
        let result = client.ask(Some("sk-test"), &card(), "   ").await;
        assert_eq!(result, Err(AiError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let client = AiClient::new(AiConfig::default()).unwrap();
        let result = client.ask(None, &card(), "Why red?").await;
        assert_eq!(result, Err(AiError::MissingCredential));
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        body: Value,
        seen: Arc<Mutex<Vec<(String, Value)>>>,
    }

    async fn stub_handler(
        State(stub): State<Stub>,
        headers: HeaderMap,
        Json(request): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        stub.seen.lock().unwrap().push((auth, request));
        (stub.status, Json(stub.body.clone()))
    }

    /// Serve a canned chat-completions response, returning a client
    /// pointed at it.
    async fn start_stub(stub: Stub) -> AiClient {
        let app = Router::new()
            .route("/v1/chat/completions", post(stub_handler))
            .with_state(stub);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        AiClient::new(AiConfig {
            endpoint: format!("http://{addr}/v1/chat/completions"),
            ..AiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_request() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = start_stub(Stub {
            status: StatusCode::OK,
            body: json!({"choices": [{"message": {"role": "assistant", "content": "Iron oxide."}}]}),
            seen: seen.clone(),
        })
        .await;
        let answer = client.ask(Some("sk-test"), &card(), "Why red?").await;
        assert_eq!(answer, Ok("Iron oxide.".to_string()));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Bearer sk-test");
        assert_eq!(seen[0].1["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_unauthorized_is_invalid_credential() {
        let client = start_stub(Stub {
            status: StatusCode::UNAUTHORIZED,
            body: json!({"error": {"message": "Incorrect API key provided"}}),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
        .await;
        let result = client.ask(Some("sk-wrong"), &card(), "Why red?").await;
        assert_eq!(result, Err(AiError::InvalidCredential));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid API key. Please check your settings."
        );
    }

    #[tokio::test]
    async fn test_other_status_uses_body_message() {
        let client = start_stub(Stub {
            status: StatusCode::BAD_REQUEST,
            body: json!({"error": {"message": "The model does not exist"}}),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
        .await;
        let result = client.ask(Some("sk-test"), &card(), "Why red?").await;
        assert_eq!(
            result,
            Err(AiError::Api {
                status: 400,
                message: "The model does not exist".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_network_failure() {
        let port = portpicker::pick_unused_port().unwrap();
        let client = AiClient::new(AiConfig {
            endpoint: format!("http://127.0.0.1:{port}/v1/chat/completions"),
            ..AiConfig::default()
        })
        .unwrap();
        let result = client.ask(Some("sk-test"), &card(), "Why red?").await;
        assert!(matches!(result, Err(AiError::Network(_))));
    }

    #[tokio::test]
    async fn test_hung_service_times_out() {
        async fn hang() -> StatusCode {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            StatusCode::OK
        }
        let app = Router::new().route("/v1/chat/completions", post(hang));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        let client = AiClient::new(AiConfig {
            endpoint: format!("http://{addr}/v1/chat/completions"),
            timeout_secs: 1,
            ..AiConfig::default()
        })
        .unwrap();
        let result = client.ask(Some("sk-test"), &card(), "Why red?").await;
        assert_eq!(
            result,
            Err(AiError::Network("the request timed out".to_string()))
        );
    }
}
