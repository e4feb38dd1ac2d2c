#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vlanman_api::types::{IpAssignmentCreate, ValueStreamCreate, VlanUpdate, ZoneCreate};
use vlanman_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base = format!("{}/api/v1", server.uri());
    let client = ApiClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

fn api_path(suffix: &str) -> String {
    format!("/api/v1/{suffix}")
}

const DOMAIN_ID: &str = "0b9e3c1e-4f5a-4c1d-9d1e-2b8f7f0a1c01";
const VLAN_ID: &str = "6a1d2f3e-8b7c-4d5e-9f0a-1b2c3d4e5f60";
const ASSIGNMENT_ID: &str = "9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a";

fn vlan_json() -> serde_json::Value {
    json!({
        "id": VLAN_ID,
        "vlan_id": 110,
        "zone_id": "11111111-2222-4333-8444-555555555555",
        "description": "Body shop line 1",
        "subnet": "10.10.110.0",
        "netmask": "255.255.255.0",
        "default_gateway": "10.10.110.1",
        "net_start": "10.10.110.7",
        "net_end": "10.10.110.254",
        "is_active": true,
        "ip_assignments": [],
        "created_at": "2025-01-10T08:00:00Z",
        "updated_at": null
    })
}

// ── Domain tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_domains_sends_active_only() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("domains")))
        .and(query_param("active_only", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": DOMAIN_ID,
            "code": "MFG",
            "name": "Manufacturing",
            "description": "Production lines",
            "value_streams": [{ "id": "22222222-3333-4444-8555-666666666666", "code": "BODY" }],
            "created_at": "2025-01-01T00:00:00Z",
            "some_future_field": 42
        }])))
        .mount(&server)
        .await;

    let domains = client.list_domains(true).await.unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].code, "MFG");
    assert_eq!(domains[0].value_streams.len(), 1);
    assert!(domains[0].is_active, "is_active defaults to true");
}

#[tokio::test]
async fn test_delete_domain_conflict_surfaces_detail() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(api_path(&format!("domains/{DOMAIN_ID}"))))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "detail": "Domain has dependent VLANs" })),
        )
        .mount(&server)
        .await;

    let id: Uuid = DOMAIN_ID.parse().unwrap();
    let err = client.delete_domain(&id).await.unwrap_err();
    match err {
        Error::Api {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Domain has dependent VLANs");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── VLAN tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_vlan_accepts_default_gateway_alias() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("vlans/{VLAN_ID}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlan_json()))
        .mount(&server)
        .await;

    let id: Uuid = VLAN_ID.parse().unwrap();
    let vlan = client.get_vlan(&id).await.unwrap();
    assert_eq!(vlan.vlan_id, 110);
    assert_eq!(vlan.gateway.as_deref(), Some("10.10.110.1"));
    assert_eq!(vlan.net_start.as_deref(), Some("10.10.110.7"));
}

#[tokio::test]
async fn test_list_zone_vlans() {
    let (server, client) = setup().await;
    let zone: Uuid = "11111111-2222-4333-8444-555555555555".parse().unwrap();

    Mock::given(method("GET"))
        .and(path(api_path(&format!("zones/{zone}/vlans"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([vlan_json()])))
        .mount(&server)
        .await;

    let vlans = client.list_zone_vlans(&zone).await.unwrap();
    assert_eq!(vlans.len(), 1);
    assert_eq!(vlans[0].zone_id, Some(zone));
}

#[tokio::test]
async fn test_update_vlan_sends_only_set_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(api_path(&format!("vlans/{VLAN_ID}"))))
        .and(body_partial_json(json!({ "description": "Paint shop" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlan_json()))
        .mount(&server)
        .await;

    let id: Uuid = VLAN_ID.parse().unwrap();
    let body = VlanUpdate {
        description: Some("Paint shop".into()),
        is_active: None,
    };
    client.update_vlan(&id, &body).await.unwrap();
}

#[tokio::test]
async fn test_create_value_stream_posts_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("value-streams")))
        .and(body_partial_json(json!({ "domain_id": DOMAIN_ID, "code": "A7" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "3c2b1a09-8f7e-4d6c-9b5a-493827160504",
            "domain_id": DOMAIN_ID,
            "code": "A7",
            "name": "A7",
            "description": null
        })))
        .mount(&server)
        .await;

    let body = ValueStreamCreate {
        domain_id: DOMAIN_ID.parse().unwrap(),
        code: "A7".into(),
        name: "A7".into(),
        description: None,
        is_active: true,
    };
    let vs = client.create_value_stream(&body).await.unwrap();
    assert_eq!(vs.code, "A7");
    assert!(vs.zones.is_empty());
}

#[tokio::test]
async fn test_create_zone_sends_security_type() {
    let (server, client) = setup().await;
    let value_stream_id = "3c2b1a09-8f7e-4d6c-9b5a-493827160504";

    Mock::given(method("POST"))
        .and(path(api_path("zones")))
        .and(body_partial_json(json!({
            "value_stream_id": value_stream_id,
            "security_type": "MFZ_SL4"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "value_stream_id": value_stream_id,
            "name": "A7 Line",
            "security_type": "MFZ_SL4",
            "zone_manager": "J. Doe",
            "last_firewall_check": null
        })))
        .mount(&server)
        .await;

    let body = ZoneCreate {
        value_stream_id: value_stream_id.parse().unwrap(),
        name: "A7 Line".into(),
        security_type: "MFZ_SL4".into(),
        zone_manager: Some("J. Doe".into()),
        description: None,
        is_active: true,
    };
    let zone = client.create_zone(&body).await.unwrap();
    assert_eq!(zone.name, "A7 Line");
    assert!(zone.is_active);
    assert!(zone.last_firewall_check.is_none());
}

#[tokio::test]
async fn test_next_ip() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("vlans/{VLAN_ID}/next-ip"))))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "next_available_ip": "10.10.110.7" })),
        )
        .mount(&server)
        .await;

    let id: Uuid = VLAN_ID.parse().unwrap();
    let next = client.next_available_ip(&id).await.unwrap();
    assert_eq!(next.next_available_ip, "10.10.110.7");
}

// ── IP assignment tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_create_ip_assignment_validation_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("ip-assignments")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{ "loc": ["body", "ip_address"], "msg": "value is not a valid IPv4 address" }]
        })))
        .mount(&server)
        .await;

    let body = IpAssignmentCreate {
        vlan_id: VLAN_ID.parse().unwrap(),
        ip_address: "10.10.110.300".into(),
        ci_name: "PLC-BODY-01".into(),
        mac_address: None,
        description: None,
        device_type: None,
        is_active: true,
    };
    let err = client.create_ip_assignment(&body).await.unwrap_err();
    match err {
        Error::Validation { message } => assert!(message.contains("ip_address"), "{message}"),
        other => panic!("expected Validation error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_vlan_ip_assignments() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("vlans/{VLAN_ID}/ip-assignments"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": ASSIGNMENT_ID,
            "vlan_id": VLAN_ID,
            "ip_address": "10.10.110.20",
            "ci_name": "HMI-BODY-01",
            "mac_address": "00:1b:1b:aa:bb:01",
            "created_at": "2025-02-01T10:00:00Z"
        }])))
        .mount(&server)
        .await;

    let id: Uuid = VLAN_ID.parse().unwrap();
    let items = client.list_vlan_ip_assignments(&id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ci_name, "HMI-BODY-01");
    assert!(items[0].last_seen.is_none());
}

#[tokio::test]
async fn test_missing_assignment_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("ip-assignments/{ASSIGNMENT_ID}"))))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "IP assignment not found" })),
        )
        .mount(&server)
        .await;

    let id: Uuid = ASSIGNMENT_ID.parse().unwrap();
    let err = client.get_ip_assignment(&id).await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

// ── System tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_is_served_from_service_root() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "service": "IP Management API",
            "version": "1.0.0"
        })))
        .mount(&server)
        .await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("vlans")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Internal server error",
            "message": "database unavailable",
            "type": "OperationalError"
        })))
        .mount(&server)
        .await;

    let err = client.list_vlans().await.unwrap_err();
    assert!(err.is_transient());
    match err {
        Error::Api { message, kind, .. } => {
            assert_eq!(message, "database unavailable");
            assert_eq!(kind.as_deref(), Some("OperationalError"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("ip-assignments")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client.list_ip_assignments().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "{err:?}");
}

// ── Report tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_network_hierarchy_for_one_domain() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("reports/network-hierarchy")))
        .and(query_param("domain_id", DOMAIN_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hierarchy": [{
                "domain": {
                    "id": DOMAIN_ID,
                    "code": "MFG",
                    "name": "Manufacturing",
                    "created_at": "2025-01-01T00:00:00Z"
                },
                "value_streams": [{
                    "value_stream": { "id": "22222222-3333-4444-8555-666666666666", "code": "A2" },
                    "zones": [{
                        "zone": {
                            "id": "11111111-2222-4333-8444-555555555555",
                            "name": "Manufacturing Zone A2",
                            "security_type": "MFZ_SL4",
                            "zone_manager": "Hans Mueller"
                        },
                        "vlans": [vlan_json()]
                    }]
                }]
            }]
        })))
        .mount(&server)
        .await;

    let id: Uuid = DOMAIN_ID.parse().unwrap();
    let tree = client.network_hierarchy(Some(&id)).await.unwrap();
    let zone = &tree.hierarchy[0].value_streams[0].zones[0];
    assert_eq!(zone.zone.security_type, "MFZ_SL4");
    assert_eq!(zone.vlans[0].vlan_id, 110);
}
