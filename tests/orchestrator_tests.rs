mod common;

use common::{allow, deny, orchestrator, orchestrator_with, Behaviour, Calls, RESOLVED};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use vanguard_recon::core::error::ScanError;
use vanguard_recon::core::models::{PortStatus, Profile, TargetKind, ThreatReport};
use vanguard_recon::core::scanner::port_scanner::COMMON_PORTS;
use vanguard_recon::core::scanner::{ScanSettings, UNCLASSIFIED_HINT};

#[tokio::test]
async fn basic_domain_with_every_collaborator_succeeding() {
    let (orch, calls) = orchestrator(Behaviour::default(), true);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.kind, TargetKind::Domain);
    assert_eq!(record.checks.rdap, Some(true));
    assert_eq!(record.checks.https, Some(true));
    assert_eq!(record.resolved_ip, Some(RESOLVED.parse().unwrap()));
    assert!(record.registry.is_some());
    assert!(record.whois.is_some());
    assert!(record.geo.is_some());
    assert_eq!(record.score, 50);

    // Basic never scans ports or asks for threat data, even when configured.
    assert!(record.ports.is_none());
    assert!(record.threat.is_none());
    assert_eq!(Calls::get(&calls.ports), 0);
    assert_eq!(Calls::get(&calls.threat), 0);
}

#[tokio::test]
async fn failed_https_raises_the_score() {
    let behaviour = Behaviour { https_ok: false, ..Behaviour::default() };
    let (orch, _) = orchestrator(behaviour, false);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.checks.https, Some(false));
    assert_eq!(record.score, 65);
}

#[tokio::test]
async fn failed_registry_and_https_add_up() {
    let behaviour = Behaviour { https_ok: false, registry_ok: false, ..Behaviour::default() };
    let (orch, _) = orchestrator(behaviour, false);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.checks.rdap, Some(false));
    assert!(record.registry.is_none());
    assert_eq!(record.score, 75);
}

#[tokio::test]
async fn cloud_operator_lowers_the_score() {
    let behaviour = Behaviour { operator: "Amazon.com, Inc.", ..Behaviour::default() };
    let (orch, _) = orchestrator(behaviour, false);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.score, 42);
}

#[tokio::test]
async fn unresolvable_domain_skips_geolocation() {
    let behaviour = Behaviour { resolves: false, ..Behaviour::default() };
    let (orch, calls) = orchestrator(behaviour, false);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert!(record.resolved_ip.is_none());
    assert!(record.geo.is_none());
    assert_eq!(Calls::get(&calls.geo), 0);
}

#[tokio::test]
async fn basic_ip_target_has_no_https_check_or_ownership() {
    let (orch, calls) = orchestrator(Behaviour::default(), false);

    let record = orch.run("8.8.8.8", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.kind, TargetKind::Ip);
    assert_eq!(record.resolved_ip, Some("8.8.8.8".parse().unwrap()));
    assert_eq!(record.checks.https, None);
    assert!(record.https.is_none());
    assert!(record.whois.is_none());
    assert_eq!(Calls::get(&calls.resolve), 0);
    assert_eq!(Calls::get(&calls.https), 0);
}

#[tokio::test]
async fn deep_without_authorization_runs_nothing() {
    let (orch, calls) = orchestrator(Behaviour::default(), true);

    let result = orch.run("example.com", None, Profile::Deep, deny).await;

    assert!(matches!(result, Err(ScanError::AuthorizationDenied(_))));
    assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn basic_never_consults_the_authorizer() {
    let (orch, _) = orchestrator(Behaviour::default(), false);
    let consulted = AtomicBool::new(false);

    let record = orch
        .run("example.com", None, Profile::Basic, || async {
            consulted.store(true, Ordering::SeqCst);
            true
        })
        .await
        .unwrap();

    assert_eq!(record.profile, Profile::Basic);
    assert!(!consulted.load(Ordering::SeqCst));
}

#[tokio::test]
async fn deep_ip_target_scans_the_leading_common_ports() {
    let (orch, calls) = orchestrator(Behaviour::default(), true);

    let record = orch.run("93.184.216.34", None, Profile::Deep, allow).await.unwrap();

    let ports = record.ports.as_ref().unwrap();
    let scanned: Vec<u16> = ports.iter().map(|p| p.port).collect();
    assert_eq!(scanned, COMMON_PORTS[..10].to_vec());
    assert_eq!(record.open_ports().collect::<Vec<_>>(), vec![80, 443]);
    assert!(ports.iter().filter(|p| p.port == 22).all(|p| p.status == PortStatus::Closed));
    assert!(matches!(record.threat, Some(ThreatReport::Host(_))));
    assert_eq!(Calls::get(&calls.ports), 1);
    assert_eq!(Calls::get(&calls.https), 0);
}

#[tokio::test]
async fn deep_domain_scans_the_resolved_address() {
    let (orch, calls) = orchestrator(Behaviour::default(), false);

    let record = orch.run("example.com", None, Profile::Deep, allow).await.unwrap();

    assert_eq!(record.resolved_ip, Some(RESOLVED.parse().unwrap()));
    assert!(record.ports.is_some());
    assert!(record.whois.is_some());
    assert_eq!(record.checks.https, None);
    assert_eq!(Calls::get(&calls.resolve), 1);
}

#[tokio::test]
async fn deep_domain_that_does_not_resolve_has_no_ports() {
    let behaviour = Behaviour { resolves: false, ..Behaviour::default() };
    let (orch, calls) = orchestrator(behaviour, true);

    let record = orch.run("example.com", None, Profile::Deep, allow).await.unwrap();

    assert!(record.ports.is_none());
    assert!(record.threat.is_none());
    assert_eq!(Calls::get(&calls.ports), 0);
    assert_eq!(Calls::get(&calls.threat), 0);
}

#[tokio::test]
async fn threat_is_skipped_when_not_configured() {
    let (orch, calls) = orchestrator(Behaviour::default(), false);

    let record = orch.run("93.184.216.34", None, Profile::Deep, allow).await.unwrap();

    assert!(record.threat.is_none());
    assert_eq!(Calls::get(&calls.threat), 0);
}

#[tokio::test]
async fn failed_threat_lookup_is_recorded_not_raised() {
    let behaviour = Behaviour { threat_ok: false, ..Behaviour::default() };
    let (orch, _) = orchestrator(behaviour, true);

    let record = orch.run("93.184.216.34", None, Profile::Deep, allow).await.unwrap();

    match record.threat {
        Some(ThreatReport::Failed { error }) => assert!(error.contains("403")),
        other => panic!("expected a failed threat report, got {other:?}"),
    }
}

#[tokio::test]
async fn unclassified_target_gets_a_hint_and_no_lookups() {
    let (orch, calls) = orchestrator(Behaviour::default(), true);

    let record = orch.run("not a host!", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.kind, TargetKind::Unclassified);
    assert_eq!(record.hint.as_deref(), Some(UNCLASSIFIED_HINT));
    assert_eq!(record.score, 50);
    assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn explicit_kind_overrides_classification() {
    let (orch, calls) = orchestrator(Behaviour::default(), false);

    let record = orch
        .run("intranet", Some(TargetKind::Domain), Profile::Basic, deny)
        .await
        .unwrap();

    assert_eq!(record.kind, TargetKind::Domain);
    assert!(record.hint.is_none());
    assert_eq!(Calls::get(&calls.resolve), 1);
}

#[tokio::test]
async fn empty_target_is_invalid_input() {
    let (orch, calls) = orchestrator(Behaviour::default(), false);

    let result = orch.run("   ", None, Profile::Deep, allow).await;

    assert!(matches!(result, Err(ScanError::InvalidInput(_))));
    assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn port_scan_cut_off_by_the_deadline_keeps_one_entry_per_port() {
    let behaviour = Behaviour { port_delay: Duration::from_secs(5), ..Behaviour::default() };
    let settings = ScanSettings {
        request_deadline: Duration::from_millis(100),
        ..ScanSettings::default()
    };
    let (orch, _) = orchestrator_with(behaviour, false, settings);

    let record = orch.run("93.184.216.34", None, Profile::Deep, allow).await.unwrap();

    let ports = record.ports.as_ref().unwrap();
    assert_eq!(ports.len(), 10);
    assert!(ports.iter().all(|p| p.status == PortStatus::Closed));
    assert_eq!(record.checks.rdap, Some(true));
}

#[tokio::test]
async fn slow_registry_does_not_hold_back_the_port_scan() {
    let behaviour = Behaviour {
        registry_delay: Duration::from_millis(400),
        port_delay: Duration::from_millis(200),
        ..Behaviour::default()
    };
    let settings = ScanSettings {
        request_deadline: Duration::from_millis(500),
        ..ScanSettings::default()
    };
    let (orch, _) = orchestrator_with(behaviour, true, settings);

    let record = orch.run("1.2.3.4", None, Profile::Deep, allow).await.unwrap();

    assert_eq!(record.open_ports().collect::<Vec<_>>(), vec![80, 443]);
    assert!(record.geo.is_some());
    assert!(matches!(record.threat, Some(ThreatReport::Host(_))));
    assert_eq!(record.checks.rdap, Some(true));
}

#[tokio::test]
async fn slow_https_check_does_not_hold_back_geolocation() {
    let behaviour = Behaviour {
        https_delay: Duration::from_millis(450),
        geo_delay: Duration::from_millis(100),
        ..Behaviour::default()
    };
    let settings = ScanSettings {
        request_deadline: Duration::from_millis(500),
        ..ScanSettings::default()
    };
    let (orch, _) = orchestrator_with(behaviour, false, settings);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert!(record.geo.is_some());
    assert_eq!(record.checks.https, Some(true));
}

#[tokio::test]
async fn deep_port_count_is_capped_by_the_candidate_list() {
    let settings = ScanSettings { deep_port_count: 500, ..ScanSettings::default() };
    let (orch, _) = orchestrator_with(Behaviour::default(), false, settings);

    assert_eq!(orch.deep_ports(), COMMON_PORTS);
}

#[tokio::test]
async fn scores_stay_within_bounds() {
    let behaviour = Behaviour {
        https_ok: false,
        registry_ok: false,
        operator: "Google LLC",
        ..Behaviour::default()
    };
    let (orch, _) = orchestrator(behaviour, false);

    let record = orch.run("example.com", None, Profile::Basic, deny).await.unwrap();

    assert_eq!(record.score, 67);
    assert!(record.score <= 100);
}

#[tokio::test]
async fn deep_ip_with_rejected_authorization_invokes_no_collaborator() {
    let (orch, calls) = orchestrator(Behaviour::default(), true);

    let result = orch
        .run("10.0.0.1", Some(TargetKind::Ip), Profile::Deep, deny)
        .await;

    assert!(matches!(result, Err(ScanError::AuthorizationDenied(_))));
    assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn record_for_explicit_domain_matches_the_reference_scenario() {
    let (orch, _) = orchestrator(Behaviour::default(), false);

    let record = orch
        .run("example.com", Some(TargetKind::Domain), Profile::Basic, deny)
        .await
        .unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["checks"], serde_json::json!({ "rdap": true, "https": true }));
    assert_eq!(json["resolved_ip"], RESOLVED);
    assert_eq!(json["score"], 50);
    assert!(json.get("ports").is_none());
}
