mod common;
use common::mock_api::MockApi;
use common::test_config;

use wabulk::config::Credentials;
use wabulk::error::WaError;
use wabulk::sender::{BulkSender, Delivery};
use wabulk::templates::list_approved_templates;
use wabulk::variables::parse_variables;

fn phones(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("1555{:06}", i)).collect()
}

#[tokio::test]
async fn test_only_approved_templates_in_server_order() {
    let api = MockApi::with_templates(&[
        ("welcome", "APPROVED"),
        ("draft_promo", "PENDING"),
        ("lowercase", "approved"),
        ("order_update", "APPROVED"),
        ("old", "REJECTED"),
    ]);

    let names = list_approved_templates(&api, &test_config().credentials())
        .await
        .expect("listing should succeed");
    assert_eq!(names, vec!["welcome", "order_update"]);
}

#[tokio::test]
async fn test_listing_failure_is_distinct_from_empty() {
    let api = MockApi::with_templates(&[("draft", "PENDING")]);
    let names = list_approved_templates(&api, &test_config().credentials())
        .await
        .unwrap();
    assert!(names.is_empty());

    let failing = MockApi {
        fail_listing: true,
        ..MockApi::new()
    };
    let err = list_approved_templates(&failing, &test_config().credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, WaError::Transport(_)));
}

#[tokio::test]
async fn test_missing_credentials_skip_listing_call() {
    let api = MockApi::with_templates(&[("welcome", "APPROVED")]);
    let creds = Credentials {
        waba_id: "2000".into(),
        ..Credentials::default()
    };

    let err = list_approved_templates(&api, &creds).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(api.list_calls(), 0);
}

#[tokio::test]
async fn test_over_cap_sends_nothing() {
    let api = MockApi::new();
    let config = test_config();
    let sender = BulkSender::new(&api, &config);

    let mut progress_calls = 0;
    let err = sender
        .send_bulk(&phones(251), "welcome", &[], |_| progress_calls += 1)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WaError::RecipientLimit {
            selected: 251,
            max: 250
        }
    ));
    assert_eq!(api.send_calls(), 0);
    assert_eq!(progress_calls, 0);
}

#[tokio::test]
async fn test_at_cap_sends_everyone_in_order() {
    let api = MockApi::new();
    let config = test_config();
    let sender = BulkSender::new(&api, &config);
    let recipients = phones(250);

    let report = sender
        .send_bulk(&recipients, "welcome", &[], |_| {})
        .await
        .expect("250 recipients is allowed");

    assert_eq!(report.total(), 250);
    let outcome_order: Vec<String> = report
        .outcomes
        .iter()
        .map(|o| o.phone_number.clone())
        .collect();
    assert_eq!(outcome_order, recipients);
    assert_eq!(api.sent_to(), recipients);
}

#[tokio::test]
async fn test_failure_does_not_stop_the_loop() {
    let recipients = phones(3);
    let api = MockApi::new().failing_for(&recipients[1]);
    let config = test_config();
    let sender = BulkSender::new(&api, &config);

    let report = sender
        .send_bulk(&recipients, "welcome", &[], |_| {})
        .await
        .unwrap();

    assert_eq!(api.sent_to(), recipients);
    assert_eq!(report.success_count(), 2);
    assert!(report.outcomes[0].is_success());
    assert!(report.outcomes[2].is_success());
    match &report.outcomes[1].delivery {
        Delivery::Failed { error, details } => {
            assert!(error.contains("400"));
            let details = details.as_ref().expect("provider payload kept");
            assert_eq!(details["error"]["message"], "Recipient not on WhatsApp");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_progress_reported_after_each_recipient() {
    let api = MockApi::new();
    let config = test_config();
    let sender = BulkSender::new(&api, &config);

    let mut fractions = Vec::new();
    sender
        .send_bulk(&phones(4), "welcome", &[], |p| fractions.push(p.fraction()))
        .await
        .unwrap();

    assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);
}

#[tokio::test]
async fn test_parameters_follow_variable_lines() {
    let api = MockApi::new();
    let config = test_config();
    let sender = BulkSender::new(&api, &config);
    let vars = parse_variables("Alice\n\n  Spring Sale  \n\n");

    sender
        .send_bulk(&phones(2), "promo", &vars, |_| {})
        .await
        .unwrap();

    let sent = api.sent.lock().unwrap();
    for message in sent.iter() {
        assert_eq!(message.parameter_count(), 2);
        let value = serde_json::to_value(message).unwrap();
        assert_eq!(value["template"]["components"][0]["type"], "body");
        assert_eq!(
            value["template"]["components"][0]["parameters"][1]["text"],
            "Spring Sale"
        );
        assert_eq!(value["template"]["language"]["code"], "en_US");
    }
}

#[tokio::test]
async fn test_no_variables_means_no_components() {
    let api = MockApi::new();
    let config = test_config();
    let sender = BulkSender::new(&api, &config);

    sender
        .send_bulk(&phones(1), "hello_world", &parse_variables("  \n"), |_| {})
        .await
        .unwrap();

    let sent = api.sent.lock().unwrap();
    let value = serde_json::to_value(&sent[0]).unwrap();
    assert!(value["template"].get("components").is_none());
}

#[tokio::test]
async fn test_validation_blocks_before_network() {
    let api = MockApi::new();
    let config = test_config();

    let sender = BulkSender::new(&api, &config);
    assert!(sender
        .send_bulk(&[], "welcome", &[], |_| {})
        .await
        .unwrap_err()
        .is_validation());
    assert!(sender
        .send_bulk(&phones(1), "  ", &[], |_| {})
        .await
        .unwrap_err()
        .is_validation());

    let no_phone_id = BulkSender::new(&api, &config).with_credentials(Credentials {
        api_token: "t".into(),
        ..Credentials::default()
    });
    assert!(no_phone_id
        .send_bulk(&phones(1), "welcome", &[], |_| {})
        .await
        .unwrap_err()
        .is_validation());

    assert_eq!(api.send_calls(), 0);
}
