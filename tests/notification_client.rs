mod common;

use std::sync::Arc;

use common::{spawn, twilio_config, MockState};
use fare_watch::{
    error::ApiError,
    services::notification_client::{NotificationClient, Notifier},
};

#[tokio::test]
async fn sends_form_with_basic_auth_and_returns_sid() {
    let state = Arc::new(MockState::default());
    let base_url = spawn(Arc::clone(&state)).await;
    let client = NotificationClient::new(twilio_config(&base_url), reqwest::Client::new());

    let sid = client.send("Low price alert! Only £80").await.unwrap();
    assert_eq!(sid, "SM0123456789");

    let form = state.sms_forms.lock().unwrap()[0].clone();
    assert_eq!(form["Body"], "Low price alert! Only £80");
    assert_eq!(form["From"], "+15550001111");
    assert_eq!(form["To"], "+447700900123");

    let auth = state.sms_auth.lock().unwrap()[0].clone();
    assert!(auth.starts_with("Basic "));
}

#[tokio::test]
async fn provider_rejection_is_a_delivery_error() {
    let state = Arc::new(MockState {
        sms_status: 400,
        ..Default::default()
    });
    let base_url = spawn(Arc::clone(&state)).await;
    let client = NotificationClient::new(twilio_config(&base_url), reqwest::Client::new());

    assert!(matches!(client.send("hello").await, Err(ApiError::DeliveryError(_))));
}
