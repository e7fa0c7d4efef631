use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::identity::errors::DeliveryError;
use crate::identity::models::EmailMessage;
use crate::identity::ports::EmailSender;

/// Delivers mail by posting it as JSON to a relay endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    http: reqwest::Client,
    relay_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpEmailSender {
    /// # Arguments
    /// * `relay_url` - Endpoint accepting the JSON message
    /// * `api_key` - Optional bearer key for the relay
    /// * `timeout` - Upper bound on a whole relay request
    ///
    /// # Errors
    /// * `reqwest::Error` - HTTP client could not be built
    pub fn new(
        relay_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            relay_url: relay_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let mut request = self.http.post(&self.relay_url).json(&RelayRequest {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Email relay rejected message");
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(to = %message.to, "Email handed to relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Json;
    use axum::Router;
    use serde_json::Value;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_relay(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let router = Router::new()
            .route(
                "/send",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        captured.lock().unwrap().push((auth, body));
                        status
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}/send", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (address, captured)
    }

    fn message() -> EmailMessage {
        EmailMessage {
            from: "noreply@example.com".to_string(),
            to: "alice@example.com".to_string(),
            subject: "Confirmation email".to_string(),
            body: "Hello, your confirmation code is 12345".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_message_with_bearer_key() {
        let (url, captured) = spawn_relay(StatusCode::ACCEPTED).await;
        let sender = HttpEmailSender::new(url, Some("relay-key".to_string()), TIMEOUT).unwrap();

        sender.send(&message()).await.expect("Relay should accept");

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0.as_deref(), Some("Bearer relay-key"));
        assert_eq!(captured[0].1["to"], "alice@example.com");
        assert_eq!(captured[0].1["text"], "Hello, your confirmation code is 12345");
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejection() {
        let (url, _) = spawn_relay(StatusCode::SERVICE_UNAVAILABLE).await;
        let sender = HttpEmailSender::new(url, None, TIMEOUT).unwrap();

        let result = sender.send(&message()).await;
        assert!(matches!(
            result,
            Err(DeliveryError::Rejected { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_relay() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/send", listener.local_addr().unwrap());
        drop(listener);

        let result = HttpEmailSender::new(url, None, TIMEOUT)
            .unwrap()
            .send(&message())
            .await;
        assert!(matches!(result, Err(DeliveryError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_stalled_relay_times_out() {
        let router = Router::new().route(
            "/send",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                StatusCode::ACCEPTED
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/send", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let sender = HttpEmailSender::new(url, None, Duration::from_millis(200)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), sender.send(&message()))
            .await
            .expect("Send should give up before the relay answers");
        assert!(matches!(result, Err(DeliveryError::Unreachable(_))));
    }
}
