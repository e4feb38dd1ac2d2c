#![allow(clippy::unwrap_used)]
// Controller behaviour against the in-memory backend.

use std::net::Ipv4Addr;
use std::time::Duration;

use pretty_assertions::assert_eq;

use vlanman_core::{
    AssignIpRequest, AssignmentFilter, AssignmentScope, Availability, Backend, Command,
    CommandResult, Controller, ControllerConfig, CoreError, CreateDomainRequest,
    CreateValueStreamRequest, CreateVlanRequest, CreateZoneRequest, DeviceStatus, DeviceType,
    Domain, DomainCode, DomainTree, EntityId, ErrorCategory, FetchOutcome, HealthState,
    HealthStatus, IpAssignment, MacAddress, MemoryBackend, SecurityType, UpdateAssignmentRequest,
    UpdateDomainRequest, UpdateVlanRequest, ValueStream, Vlan, VlanScope, VlanStatus, Zone,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn controller() -> Controller<MemoryBackend> {
    Controller::new(ControllerConfig::default(), MemoryBackend::with_sample_data())
}

fn id(s: &str) -> EntityId {
    EntityId::from(s)
}

fn assign(vlan: &str, ip: Option<&str>, name: &str) -> Command {
    Command::AssignIp(AssignIpRequest {
        vlan_id: id(vlan),
        ip_address: ip.map(|s| s.parse().unwrap()),
        ci_name: name.into(),
        mac_address: None,
        description: None,
        device_type: None,
    })
}

fn new_vlan(tag: u32, subnet: &str) -> Command {
    Command::CreateVlan(CreateVlanRequest {
        zone_id: id("zone-a2"),
        vlan_id: tag,
        subnet: subnet.into(),
        netmask: "255.255.255.0".into(),
        description: Some("Line A2 expansion".into()),
        is_active: true,
    })
}

/// Serves single VLANs without their place in the hierarchy, the way
/// `GET /vlans/{id}` does.
struct BareVlanBackend(MemoryBackend);

impl Backend for BareVlanBackend {
    async fn list_domains(&self) -> Result<Vec<Domain>, CoreError> {
        self.0.list_domains().await
    }
    async fn get_domain(&self, id: &EntityId) -> Result<DomainTree, CoreError> {
        self.0.get_domain(id).await
    }
    async fn create_domain(&self, req: &CreateDomainRequest) -> Result<Domain, CoreError> {
        self.0.create_domain(req).await
    }
    async fn update_domain(
        &self,
        id: &EntityId,
        req: &UpdateDomainRequest,
    ) -> Result<Domain, CoreError> {
        self.0.update_domain(id, req).await
    }
    async fn delete_domain(&self, id: &EntityId) -> Result<(), CoreError> {
        self.0.delete_domain(id).await
    }
    async fn create_value_stream(
        &self,
        req: &CreateValueStreamRequest,
    ) -> Result<ValueStream, CoreError> {
        self.0.create_value_stream(req).await
    }
    async fn list_zones(&self, domain: Option<&EntityId>) -> Result<Vec<Zone>, CoreError> {
        self.0.list_zones(domain).await
    }
    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone, CoreError> {
        self.0.create_zone(req).await
    }
    async fn record_firewall_check(&self, id: &EntityId) -> Result<Zone, CoreError> {
        self.0.record_firewall_check(id).await
    }
    async fn list_vlans(&self, scope: &VlanScope) -> Result<Vec<Vlan>, CoreError> {
        self.0.list_vlans(scope).await
    }
    async fn get_vlan(&self, id: &EntityId) -> Result<Vlan, CoreError> {
        let mut vlan = self.0.get_vlan(id).await?;
        vlan.domain_id = None;
        vlan.zone_name = None;
        vlan.zone_manager = None;
        vlan.security_type = None;
        Ok(vlan)
    }
    async fn create_vlan(&self, req: &CreateVlanRequest) -> Result<Vlan, CoreError> {
        self.0.create_vlan(req).await
    }
    async fn update_vlan(&self, id: &EntityId, req: &UpdateVlanRequest) -> Result<Vlan, CoreError> {
        self.0.update_vlan(id, req).await
    }
    async fn delete_vlan(&self, id: &EntityId) -> Result<(), CoreError> {
        self.0.delete_vlan(id).await
    }
    async fn vlan_availability(&self, id: &EntityId) -> Result<Availability, CoreError> {
        self.0.vlan_availability(id).await
    }
    async fn next_available_ip(&self, id: &EntityId) -> Result<Ipv4Addr, CoreError> {
        self.0.next_available_ip(id).await
    }
    async fn list_assignments(
        &self,
        scope: &AssignmentScope,
    ) -> Result<Vec<IpAssignment>, CoreError> {
        self.0.list_assignments(scope).await
    }
    async fn get_assignment(&self, id: &EntityId) -> Result<IpAssignment, CoreError> {
        self.0.get_assignment(id).await
    }
    async fn create_assignment(&self, req: &AssignIpRequest) -> Result<IpAssignment, CoreError> {
        self.0.create_assignment(req).await
    }
    async fn update_assignment(
        &self,
        id: &EntityId,
        req: &UpdateAssignmentRequest,
    ) -> Result<IpAssignment, CoreError> {
        self.0.update_assignment(id, req).await
    }
    async fn release_assignment(&self, id: &EntityId) -> Result<(), CoreError> {
        self.0.release_assignment(id).await
    }
    async fn health(&self) -> Result<HealthStatus, CoreError> {
        self.0.health().await
    }
}

fn new_value_stream(domain: &str, code: &str) -> Command {
    Command::CreateValueStream(CreateValueStreamRequest {
        domain_id: id(domain),
        code: code.into(),
        name: None,
        description: None,
        is_active: true,
    })
}

// ── Fetching ────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_all_fills_every_registry() {
    let ctrl = controller();
    ctrl.refresh_all().await.unwrap();

    let store = ctrl.store();
    assert_eq!(store.domains().len(), 4);
    assert_eq!(store.zones().len(), 13);
    assert_eq!(store.vlans().len(), 13);
    assert_eq!(store.assignments().len(), 15);
    assert!(store.last_refresh().is_some());
    assert!(!store.vlans().is_loading());
    assert_eq!(store.vlans().last_error(), None);
}

#[tokio::test]
async fn selecting_a_domain_loads_its_subtree() {
    let ctrl = controller();
    let outcome = ctrl.fetch_domain(&id("dom-fcm")).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Applied);

    let store = ctrl.store();
    assert_eq!(store.selected_domain().unwrap().code, DomainCode::Fcm);
    let tags: Vec<u16> = store.vlans().snapshot().iter().map(|v| v.vlan_id).collect();
    assert_eq!(tags, [301, 302, 303]);
    assert_eq!(store.zones().len(), 3);

    ctrl.select_domain(Some(&id("dom-log"))).await.unwrap();
    assert_eq!(store.selected_domain_id(), Some(id("dom-log")));
    // VLANs of the previous domain stay cached; the domain view filters.
    assert_eq!(store.domain_vlans(&id("dom-log")).len(), 1);

    ctrl.select_domain(None).await.unwrap();
    assert!(store.selected_domain().is_none());
}

#[tokio::test]
async fn scoped_fetch_only_replaces_its_scope() {
    let ctrl = controller();
    ctrl.fetch_vlans(&VlanScope::All).await.unwrap();
    ctrl.fetch_vlans(&VlanScope::Zone(id("zone-camera")))
        .await
        .unwrap();
    assert_eq!(ctrl.store().vlans().len(), 13);
}

#[tokio::test]
async fn failed_fetch_keeps_cached_data() {
    let ctrl = controller();
    ctrl.fetch_vlans(&VlanScope::All).await.unwrap();

    ctrl.backend().set_offline(true);
    let err = ctrl.fetch_vlans(&VlanScope::All).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Connection);

    let vlans = ctrl.store().vlans();
    assert_eq!(vlans.len(), 13);
    assert!(vlans.last_error().unwrap().contains("offline"));
    assert!(!vlans.is_loading());
}

// ── Derived views ───────────────────────────────────────────────────

#[tokio::test]
async fn assignment_views_carry_derived_status_and_type() {
    let ctrl = controller();
    ctrl.refresh_all().await.unwrap();
    let views = ctrl
        .store()
        .filtered_assignments(&AssignmentFilter::default(), chrono::Utc::now());

    let status_of = |name: &str| {
        views
            .iter()
            .find(|v| v.assignment.ci_name == name)
            .map(|v| (v.status, v.resolved_type))
            .unwrap()
    };
    assert_eq!(status_of("PLC-A2-MAIN"), (DeviceStatus::Active, DeviceType::Plc));
    assert_eq!(
        status_of("AGV-LOG21-001"),
        (DeviceStatus::Inactive, DeviceType::Unknown)
    );
    assert_eq!(
        status_of("GATEWAY-A2-UPLINK"),
        (DeviceStatus::Reserved, DeviceType::Gateway)
    );
}

#[tokio::test]
async fn utilization_report_is_sorted_descending() {
    let ctrl = controller();
    ctrl.refresh_all().await.unwrap();
    let report = ctrl.utilization_report();
    assert_eq!(report.len(), 13);
    assert!(report.windows(2).all(|w| w[0].utilization >= w[1].utilization));
    // /27 with one device is the busiest pool in the sample plant.
    assert_eq!(report[0].vlan_id, 502);
}

#[tokio::test]
async fn compliance_report_uses_configured_window() {
    let ctrl = controller();
    ctrl.fetch_zones(None).await.unwrap();
    let report = ctrl.compliance_report();
    assert_eq!(report.total_zones, 13);
    assert_eq!(report.check_days, 30);
    assert_eq!(report.overdue_checks, 5);
}

#[tokio::test]
async fn domain_summaries_roll_up_vlans() {
    let ctrl = controller();
    ctrl.refresh_all().await.unwrap();
    let summaries = ctrl.domain_summaries();
    let mfg = summaries.iter().find(|s| s.code == DomainCode::Mfg).unwrap();
    assert_eq!(mfg.vlan_count, 8);
    let log = summaries.iter().find(|s| s.code == DomainCode::Log).unwrap();
    assert_eq!((log.vlan_count, log.used_ips, log.total_ips), (1, 2, 248));
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_vlan_lands_in_registry() {
    let ctrl = controller();
    let result = ctrl.execute(new_vlan(105, "10.1.5.0")).await.unwrap();
    let CommandResult::Vlan(vlan) = result else {
        panic!("expected a VLAN");
    };
    assert_eq!(vlan.net_start.to_string(), "10.1.5.7");
    assert_eq!(vlan.status, VlanStatus::Inactive);
    assert!(ctrl.store().vlans().get(&vlan.id).is_some());
}

#[tokio::test]
async fn vlan_preconditions_are_checked_before_the_backend() {
    let ctrl = controller();

    let err = ctrl.execute(new_vlan(101, "10.1.9.0")).await.unwrap_err();
    assert!(matches!(err, CoreError::DuplicateVlanId { vlan_id: 101 }));

    let err = ctrl.execute(new_vlan(0, "10.1.9.0")).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = ctrl.execute(new_vlan(106, "10.1.300.0")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "subnet"));
}

#[tokio::test]
async fn deletes_are_blocked_by_dependents() {
    let ctrl = controller();

    let err = ctrl
        .execute(Command::DeleteDomain { id: id("dom-eng") })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DependentResources { count: 1, .. }));

    let err = ctrl
        .execute(Command::DeleteVlan { id: id("vlan-302") })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DependentResources { count: 2, .. }));

    ctrl.execute(Command::DeleteVlan { id: id("vlan-303") })
        .await
        .unwrap();
    assert!(ctrl.store().vlans().get(&id("vlan-303")).is_none());
}

#[tokio::test]
async fn domain_can_be_recreated_once_emptied() {
    let ctrl = controller();
    let create_eng = || {
        Command::CreateDomain(CreateDomainRequest {
            code: DomainCode::Eng,
            name: None,
            description: None,
            is_active: true,
        })
    };
    let err = ctrl.execute(create_eng()).await.unwrap_err();
    assert!(matches!(err, CoreError::DuplicateDomainCode { .. }));

    ctrl.execute(Command::ReleaseIp {
        id: id("ip-testbench-tb001"),
    })
    .await
    .unwrap();
    ctrl.execute(Command::DeleteVlan { id: id("vlan-401") })
        .await
        .unwrap();
    ctrl.execute(Command::DeleteDomain { id: id("dom-eng") })
        .await
        .unwrap();
    assert_eq!(ctrl.store().domains().len(), 3);

    let CommandResult::Domain(domain) = ctrl.execute(create_eng()).await.unwrap() else {
        panic!("expected a domain");
    };
    assert_eq!(domain.name, "Engineering");
    assert_eq!(ctrl.store().domains().len(), 4);
}

#[tokio::test]
async fn assign_takes_next_free_address() {
    let ctrl = controller();
    let result = ctrl
        .execute(assign("vlan-101", None, "SENSOR-A2-T1"))
        .await
        .unwrap();
    let CommandResult::Assignment(a) = result else {
        panic!("expected an assignment");
    };
    assert_eq!(a.ip_address.to_string(), "10.1.1.7");
    assert_eq!(ctrl.store().vlan_assignments(&id("vlan-101")).len(), 5);

    let next = ctrl.suggest_ip(&id("vlan-101")).await.unwrap();
    assert_eq!(next.to_string(), "10.1.1.8");
    let availability = ctrl.availability(&id("vlan-101")).await.unwrap();
    assert_eq!(availability.assigned_ips, 5);
}

#[tokio::test]
async fn assignment_preconditions() {
    let ctrl = controller();

    let err = ctrl
        .execute(assign("vlan-101", Some("10.1.1.3"), "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AddressOutOfRange { .. }));

    let err = ctrl
        .execute(assign("vlan-101", Some("10.1.1.254"), "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ReservedAddress { .. }));

    let err = ctrl
        .execute(assign("vlan-101", Some("10.1.1.11"), "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateAddress { ref ci_name, .. } if ci_name == "HMI-A2-OP1"));

    let err = ctrl
        .execute(assign("vlan-101", None, "   "))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn duplicate_mac_is_rejected_on_update() {
    let ctrl = controller();
    ctrl.refresh_all().await.unwrap();
    let err = ctrl
        .execute(Command::UpdateAssignment {
            id: id("ip-hmi-a2-op1"),
            update: UpdateAssignmentRequest {
                mac_address: Some(MacAddress::parse("00:1B:21:A2:01:01").unwrap()),
                ..UpdateAssignmentRequest::default()
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateMac { ref ci_name, .. } if ci_name == "PLC-A2-MAIN"));
}

#[tokio::test]
async fn reserved_assignments_are_immutable() {
    let ctrl = controller();
    let err = ctrl
        .execute(Command::ReleaseIp {
            id: id("ip-gateway-a2-uplink"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ReservedAddress { .. }));

    let err = ctrl
        .execute(Command::UpdateAssignment {
            id: id("ip-gateway-a2-uplink"),
            update: UpdateAssignmentRequest {
                description: Some("uplink".into()),
                ..UpdateAssignmentRequest::default()
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ReservedAddress { .. }));
}

#[tokio::test]
async fn release_frees_the_address() {
    let ctrl = controller();
    ctrl.execute(Command::ReleaseIp {
        id: id("ip-plc-a2-main"),
    })
    .await
    .unwrap();

    let released = ctrl.store().assignments().get(&id("ip-plc-a2-main")).unwrap();
    assert!(!released.is_active);

    let views = ctrl.store().filtered_assignments(
        &AssignmentFilter {
            vlan_id: Some(id("vlan-101")),
            ..AssignmentFilter::default()
        },
        chrono::Utc::now(),
    );
    assert_eq!(views.len(), 3);

    ctrl.execute(assign("vlan-101", Some("10.1.1.10"), "PLC-A2-NEW"))
        .await
        .unwrap();
}

#[tokio::test]
async fn assigning_keeps_the_flattened_vlan_record() {
    let ctrl = Controller::new(
        ControllerConfig::default(),
        BareVlanBackend(MemoryBackend::with_sample_data()),
    );
    ctrl.refresh_all().await.unwrap();
    ctrl.execute(assign("vlan-101", Some("10.1.1.40"), "HMI-A2-OP2"))
        .await
        .unwrap();

    let vlan = ctrl.store().vlans().get(&id("vlan-101")).unwrap();
    assert_eq!(vlan.domain_id, Some(id("dom-mfg")));
    assert_eq!(vlan.zone_name.as_deref(), Some("Manufacturing Zone A2"));
    assert!(
        ctrl.store()
            .domain_vlans(&id("dom-mfg"))
            .iter()
            .any(|v| v.vlan_id == 101)
    );
    let mfg = ctrl
        .domain_summaries()
        .into_iter()
        .find(|s| s.code == DomainCode::Mfg)
        .unwrap();
    assert_eq!(mfg.vlan_count, 8);
}

// ── Value streams and zones ─────────────────────────────────────────

#[tokio::test]
async fn new_zone_can_host_a_vlan() {
    let ctrl = controller();
    let CommandResult::ValueStream(vs) = ctrl
        .execute(new_value_stream("dom-mfg", " A7 "))
        .await
        .unwrap()
    else {
        panic!("expected a value stream");
    };
    assert_eq!(vs.code, "A7");
    let streams = ctrl.value_streams(&id("dom-mfg")).await.unwrap();
    assert!(streams.iter().any(|v| v.id == vs.id));

    let CommandResult::Zone(zone) = ctrl
        .execute(Command::CreateZone(CreateZoneRequest {
            value_stream_id: vs.id.clone(),
            name: "Manufacturing Zone A7".into(),
            security_type: SecurityType::MfzSl4,
            zone_manager: Some("  ".into()),
            description: None,
            is_active: true,
        }))
        .await
        .unwrap()
    else {
        panic!("expected a zone");
    };
    assert_eq!(zone.domain_id, Some(id("dom-mfg")));
    assert_eq!(zone.zone_manager, None);
    assert_eq!(ctrl.store().zones().len(), 14);
    // Never reviewed, so it counts as overdue straight away.
    assert_eq!(ctrl.compliance_report().overdue_checks, 6);

    let CommandResult::Vlan(vlan) = ctrl
        .execute(Command::CreateVlan(CreateVlanRequest {
            zone_id: zone.id.clone(),
            vlan_id: 107,
            subnet: "10.1.7.0".into(),
            netmask: "24".into(),
            description: None,
            is_active: true,
        }))
        .await
        .unwrap()
    else {
        panic!("expected a VLAN");
    };
    assert_eq!(vlan.domain_id, Some(id("dom-mfg")));
}

#[tokio::test]
async fn value_stream_and_zone_preconditions() {
    let ctrl = controller();

    let err = ctrl.execute(new_value_stream("dom-mfg", "  ")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "code"));

    let long = "X".repeat(21);
    let err = ctrl.execute(new_value_stream("dom-mfg", &long)).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "code"));

    let err = ctrl.execute(new_value_stream("dom-mfg", "A2")).await.unwrap_err();
    assert!(matches!(err, CoreError::DuplicateValueStreamCode { .. }));
    assert_eq!(err.category(), ErrorCategory::BusinessRule);

    let err = ctrl
        .execute(Command::CreateZone(CreateZoneRequest {
            value_stream_id: id("vs-a2"),
            name: String::new(),
            security_type: SecurityType::MfzSl4,
            zone_manager: None,
            description: None,
            is_active: true,
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "name"));
}

#[tokio::test]
async fn firewall_check_clears_overdue_zone() {
    let ctrl = controller();
    ctrl.fetch_zones(None).await.unwrap();
    ctrl.execute(Command::RecordFirewallCheck {
        zone_id: id("zone-a4"),
    })
    .await
    .unwrap();
    assert_eq!(ctrl.compliance_report().overdue_checks, 4);
    let vlan = ctrl.store().vlans().get(&id("vlan-102")).unwrap();
    assert!(vlan.last_firewall_check.is_some());
}

// ── Health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_failure_is_a_state_not_an_error() {
    let ctrl = controller();
    assert!(ctrl.check_health().await.is_healthy());

    ctrl.backend().set_offline(true);
    let state = ctrl.check_health().await;
    assert!(matches!(state, HealthState::Unreachable { .. }));
    assert_eq!(ctrl.store().health().label(), "unreachable");
}

#[tokio::test]
async fn unreachable_http_backend_reports_unreachable() {
    let config = ControllerConfig {
        api_url: "http://127.0.0.1:9/api/v1".into(),
        timeout: Duration::from_secs(2),
        ..ControllerConfig::default()
    };
    let ctrl = Controller::connect(config).unwrap();
    let state = ctrl.check_health().await;
    assert!(matches!(state, HealthState::Unreachable { .. }));
}

#[tokio::test(start_paused = true)]
async fn health_poller_publishes_and_stops() {
    let ctrl = controller();
    let mut rx = ctrl.store().watch_health();
    ctrl.spawn_health_poller(Duration::from_secs(30)).await;

    rx.changed().await.unwrap();
    assert!(rx.borrow().is_healthy());

    ctrl.backend().set_offline(true);
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(ctrl.store().health().label(), "unreachable");

    ctrl.shutdown().await;
}
