use std::time::Duration;

use pmovirt::{RestService, RestSettings, ServerVersion, VersionDiscovery, VirtError, Vm};

const API_3_0: &str = r#"<api>
  <product_info>
    <name>oVirt Engine</name>
    <vendor>ovirt.org</vendor>
    <version major="3" minor="0" build="0" revision="0"/>
  </product_info>
</api>"#;

fn service_for(server: &mockito::Server) -> RestService {
    let settings = RestSettings::new(format!("{}/api", server.url()))
        .with_timeout(Duration::from_secs(5));
    RestService::new(settings).unwrap()
}

#[test]
fn discovers_version_from_api_root() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api")
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(API_3_0)
        .create();

    let service = service_for(&server);
    assert_eq!(service.current_version().unwrap(), ServerVersion::new(3, 0, 0, 0));
    mock.assert();
}

#[test]
fn detach_floppy_queries_version_then_puts_legacy_body() {
    let mut server = mockito::Server::new();
    let version = server
        .mock("GET", "/api")
        .with_status(200)
        .with_body(API_3_0)
        .create();
    let update = server
        .mock("PUT", "/api/vms/128f9ffd")
        .match_header("content-type", "application/xml")
        .match_body("<vm>\n  <payloads>\n    <payload type=\"floppy\"/>\n  </payloads>\n</vm>")
        .with_status(200)
        .with_body(r#"<vm href="/api/vms/128f9ffd" id="128f9ffd"><name>vm1</name></vm>"#)
        .create();

    let service = service_for(&server);
    let vm = Vm::new("/api/vms/128f9ffd", &service, &service);
    let resource = vm.detach_floppy().unwrap();

    assert_eq!(resource.child_text(&["name"]).as_deref(), Some("vm1"));
    version.assert();
    update.assert();
}

#[test]
fn fault_body_is_read_on_conflict() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/vms/128f9ffd/stop")
        .match_body("<action/>")
        .with_status(409)
        .with_body("<action>\n    <fault>\n        <detail>[Cannot stop VM. VM is not running.]</detail>\n    </fault>\n</action>")
        .create();

    let service = service_for(&server);
    let err = Vm::new("/api/vms/128f9ffd", &service, &service)
        .stop()
        .unwrap_err();

    assert!(matches!(err, VirtError::VmNotRunning(_)), "{err:?}");
    mock.assert();
}

#[test]
fn disk_creation_posts_to_sub_collection() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/vms/128f9ffd/disks")
        .match_body("<disk>\n  <name>d1</name>\n  <sparse>false</sparse>\n</disk>")
        .with_status(202)
        .with_body(r#"<disk id="d-1"/>"#)
        .create();

    let service = service_for(&server);
    let options = pmovirt::AttributeOptions::new()
        .with("name", "d1")
        .with("sparse", false);
    let resource = Vm::new("/api/vms/128f9ffd", &service, &service)
        .create_disk(&options)
        .unwrap();

    assert_eq!(resource.status, 202);
    assert_eq!(resource.id(), Some("d-1"));
    mock.assert();
}

#[test]
fn server_error_without_fault_is_action_failed() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("PUT", "/api/vms/128f9ffd")
        .with_status(500)
        .with_body("Internal Server Error")
        .create();

    let service = service_for(&server);
    let err = Vm::new("/api/vms/128f9ffd", &service, &service)
        .set_description("db")
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let settings =
        RestSettings::new("http://127.0.0.1:1/api").with_timeout(Duration::from_secs(2));
    let service = RestService::new(settings).unwrap();

    let err = Vm::new("/api/vms/128f9ffd", &service, &service)
        .set_memory(1024)
        .unwrap_err();
    assert!(err.is_transport_error(), "{err:?}");

    let err = service.current_version().unwrap_err();
    assert!(err.is_transport_error(), "{err:?}");
}
