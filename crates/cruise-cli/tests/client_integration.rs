//! Console client against a live daemon on a temp socket.
//!
//! Tests may use `.unwrap()` and `.expect()`.

use std::path::PathBuf;
use std::time::Duration;

use cruise_cli::input::parse_passenger;
use cruise_cli::{CliError, ClientConfig, DaemonClient};
use cruise_core::Money;
use cruised::registry::spawn_registry;
use cruised::server::DaemonServer;
use tempfile::TempDir;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

struct Harness {
    config: ClientConfig,
    cancel_token: CancellationToken,
    _temp_dir: TempDir,
}

impl Harness {
    async fn spawn() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let socket_path: PathBuf = temp_dir.path().join("cruise.sock");

        let cancel_token = CancellationToken::new();
        let server = DaemonServer::new(socket_path.clone(), spawn_registry(), cancel_token.clone());
        tokio::spawn(async move {
            let _ = server.run().await;
        });

        for _ in 0..50 {
            if socket_path.exists() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(socket_path.exists(), "daemon socket never appeared");

        Harness {
            config: ClientConfig {
                socket_path,
                timeout: Duration::from_secs(2),
            },
            cancel_token,
            _temp_dir: temp_dir,
        }
    }

    async fn client(&self) -> DaemonClient {
        DaemonClient::connect(&self.config).await.expect("connect")
    }

    async fn fill_ship(&self) {
        let mut client = self.client().await;
        for n in 0..12 {
            client
                .assign(n, &format!("Party {n}"), vec![parse_passenger(&format!("Guest:Number{n}")).unwrap()])
                .await
                .unwrap();
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[tokio::test]
async fn test_handshake_assigns_client_id() {
    let harness = Harness::spawn().await;
    let client = harness.client().await;
    assert!(!client.client_id().is_empty());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_fresh_ship_lists_twelve_empty_cabins() {
    let harness = Harness::spawn().await;
    let mut client = harness.client().await;

    let cabins = client.list_cabins().await.unwrap();
    assert_eq!(cabins.len(), 12);
    assert!(cabins.iter().all(|c| c.is_empty_marker() && c.passengers.is_empty()));
}

#[tokio::test]
async fn test_assign_then_find() {
    let harness = Harness::spawn().await;
    let mut client = harness.client().await;

    let passengers = vec![parse_passenger("Ann:Smith").unwrap()];
    client.assign(3, "Smith Family", passengers).await.unwrap();

    let found = client.find("Smith").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].cabin_number, 3);
    assert!(client.find("Nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_daemon_error_text_is_passed_through() {
    let harness = Harness::spawn().await;
    let mut client = harness.client().await;

    client
        .assign(3, "Smiths", vec![parse_passenger("Ann:Smith").unwrap()])
        .await
        .unwrap();
    let err = client
        .assign(3, "Joneses", vec![parse_passenger("Bo:Jones").unwrap()])
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Daemon { .. }));
    assert_eq!(err.daemon_code(), Some("cabin_occupied"));
    assert!(!err.to_string().starts_with("Failed"));

    // Same connection still answers
    assert_eq!(client.list_cabins().await.unwrap().len(), 12);
}

#[tokio::test]
async fn test_waiting_list_requires_full_ship() {
    let harness = Harness::spawn().await;
    let mut client = harness.client().await;

    let err = client.add_to_waiting_list("Jones").await.unwrap_err();
    assert_eq!(err.daemon_code(), Some("ship_not_full"));
    assert!(client.waiting_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vacate_reports_next_guest() {
    let harness = Harness::spawn().await;
    harness.fill_ship().await;
    let mut client = harness.client().await;

    client.add_to_waiting_list("Jones").await.unwrap();
    assert_eq!(client.waiting_list().await.unwrap(), vec!["Jones".to_string()]);

    let reply = client.vacate(3).await.unwrap();
    assert_eq!(reply.next_waiting_guest.as_deref(), Some("Jones"));
    assert!(reply.message.ends_with("Jones is next on the waiting list"));
    assert!(client.waiting_list().await.unwrap().is_empty());

    let reply = client.vacate(4).await.unwrap();
    assert_eq!(reply.next_waiting_guest, None);

    let err = client.vacate(4).await.unwrap_err();
    assert_eq!(err.daemon_code(), Some("cabin_already_empty"));
}

#[tokio::test]
async fn test_charges_total_and_roster() {
    let harness = Harness::spawn().await;
    let mut client = harness.client().await;

    client
        .assign(
            0,
            "Smiths",
            vec![parse_passenger("Bob:Smith").unwrap(), parse_passenger("Ann:Smith:CHILD").unwrap()],
        )
        .await
        .unwrap();
    client
        .assign(5, "Browns", vec![parse_passenger("Zoe:Brown").unwrap()])
        .await
        .unwrap();

    client.charge(0, 1, Money::from_dollars(12.5)).await.unwrap();
    client.charge(5, 0, Money::from_dollars(100.0)).await.unwrap();

    assert_eq!(client.total().await.unwrap(), Money::from_dollars(112.5));

    let roster = client.roster().await.unwrap();
    let names: Vec<String> = roster
        .iter()
        .map(|p| format!("{} {}", p.first_name, p.surname))
        .collect();
    assert_eq!(names, vec!["Zoe Brown", "Ann Smith", "Bob Smith"]);

    let err = client.charge(0, 9, Money::from_dollars(1.0)).await.unwrap_err();
    assert_eq!(err.daemon_code(), Some("validation"));
}

#[tokio::test]
async fn test_export_then_load_restores_state() {
    let harness = Harness::spawn().await;
    let mut client = harness.client().await;

    client
        .assign(7, "Lees", vec![parse_passenger("Kim:Lee").unwrap()])
        .await
        .unwrap();
    let exported = serde_json::to_value(client.list_cabins().await.unwrap()).unwrap();

    client.vacate(7).await.unwrap();
    client.load_cabins(exported).await.unwrap();

    let cabins = client.list_cabins().await.unwrap();
    assert_eq!(cabins[7].cabin_name, "Lees");

    let err = client
        .load_cabins(serde_json::json!([{"cabinNumber": 0}]))
        .await
        .unwrap_err();
    assert_eq!(err.daemon_code(), Some("validation"));
    assert_eq!(client.list_cabins().await.unwrap()[7].cabin_name, "Lees");
}
