#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use uncrustify_bridge::project::{BridgeSettings, PROJECT_CONFIG_FILE};
use uncrustify_bridge::style::StyleSettings;
use uncrustify_bridge::{FormattingOutcome, FormattingRequest, FormattingService};
use uncrustify_bridge_test_utils::{init_logging, Fixture};

/// Echoes its input, but hangs on input mentioning "slow"
const SELECTIVE_FORMATTER: &str = r#"#!/bin/sh
input=$(cat)
case "$input" in
    *slow*) exec sleep 30 ;;
esac
printf '%s' "$input"
"#;

fn service(fixture: &Fixture) -> FormattingService {
    let exe = fixture.add_script("bin/uncrustify", SELECTIVE_FORMATTER);
    fixture.add_file(PROJECT_CONFIG_FILE, "");
    let settings = BridgeSettings {
        executable_path: exe,
        timeout_ms: 30_000,
        ..Default::default()
    };
    FormattingService::new(settings, StyleSettings::default())
}

fn request(fixture: &Fixture, file: &str, text: &str) -> FormattingRequest {
    FormattingRequest::new(file, text).with_project_root(fixture.root_path())
}

#[tokio::test]
async fn test_new_request_supersedes_in_flight_one() {
    init_logging();
    let fixture = Fixture::new();
    let service = Arc::new(service(&fixture));

    let first = tokio::spawn({
        let service = Arc::clone(&service);
        let request = request(&fixture, "main.c", "slow");
        async move { service.format(request).await }
    });
    while service.in_flight() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let second = service.format(request(&fixture, "main.c", "int x;")).await;
    assert_eq!(second, FormattingOutcome::Completed("int x;".to_string()));

    let first = tokio::time::timeout(Duration::from_secs(10), first)
        .await
        .expect("superseded run finishes promptly")
        .unwrap();
    assert_eq!(first, FormattingOutcome::Cancelled);
    assert_eq!(service.in_flight(), 0);
}

#[tokio::test]
async fn test_documents_do_not_supersede_each_other() {
    let fixture = Fixture::new();
    let service = service(&fixture);

    let (a, b) = tokio::join!(
        service.format(request(&fixture, "a.c", "int a;")),
        service.format(request(&fixture, "b.c", "int b;")),
    );
    assert_eq!(a, FormattingOutcome::Completed("int a;".to_string()));
    assert_eq!(b, FormattingOutcome::Completed("int b;".to_string()));
}

#[tokio::test]
async fn test_cancel_document() {
    let fixture = Fixture::new();
    let service = Arc::new(service(&fixture));
    assert!(!service.cancel(Path::new("main.c")));

    let running = tokio::spawn({
        let service = Arc::clone(&service);
        let request = request(&fixture, "main.c", "slow");
        async move { service.format(request).await }
    });
    while service.in_flight() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    service.cancel(Path::new("main.c"));

    let outcome = tokio::time::timeout(Duration::from_secs(10), running)
        .await
        .expect("cancelled run finishes promptly")
        .unwrap();
    assert_eq!(outcome, FormattingOutcome::Cancelled);
}

#[test]
fn test_can_format_checks_extension_and_switch() {
    let fixture = Fixture::new();
    let service = service(&fixture);
    assert!(service.can_format(Path::new("src/widget.cpp")));
    assert!(!service.can_format(Path::new("src/widget.py")));

    let disabled = FormattingService::new(
        BridgeSettings {
            formatting_enabled: false,
            ..Default::default()
        },
        StyleSettings::default(),
    );
    assert!(!disabled.can_format(Path::new("src/widget.cpp")));
}

#[test]
fn test_can_format_language_checks_id_and_switch() {
    let fixture = Fixture::new();
    let service = service(&fixture);
    assert!(service.can_format_language("JAVA"));
    assert!(service.can_format_language("oc+"));
    assert!(!service.can_format_language("rust"));

    let disabled = FormattingService::new(
        BridgeSettings {
            formatting_enabled: false,
            ..Default::default()
        },
        StyleSettings::default(),
    );
    assert!(!disabled.can_format_language("JAVA"));
}
