//! End-to-end tests: configuration file in, rendered graph out.

use serde_json::Value;
use std::path::Path;
use std::process::Command;
use xsdgraph::Config;
use xsdgraph::codegen::{OutputFormat, render};

const MESSAGES_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
       xmlns:m="urn:m" targetNamespace="urn:m" elementFormDefault="qualified">
    <xs:complexType name="BaseMessageType" abstract="true">
        <xs:sequence><xs:element name="Id" type="xs:string"/></xs:sequence>
    </xs:complexType>
    <xs:complexType name="FooMessageType">
        <xs:complexContent>
            <xs:extension base="m:BaseMessageType">
                <xs:sequence><xs:element name="Foo" type="xs:int"/></xs:sequence>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
    <xs:complexType name="BarMessageType">
        <xs:complexContent>
            <xs:extension base="m:BaseMessageType">
                <xs:sequence><xs:element name="Bar" type="xs:boolean"/></xs:sequence>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
    <xs:complexType name="MessagesType">
        <xs:sequence>
            <xs:element name="Message" type="m:BaseMessageType" maxOccurs="unbounded"/>
        </xs:sequence>
    </xs:complexType>
    <xs:element name="Send" type="m:MessagesType"/>
    <xs:element name="SendResponse" type="xs:string"/>
    <xs:element name="Version" type="xs:string"/>
</xs:schema>"#;

const SERVICES_WSDL: &str = r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:m="urn:m" targetNamespace="urn:m">
    <wsdl:message name="SendIn">
        <wsdl:part name="request" element="m:Send"/>
        <wsdl:part name="Version" element="m:Version"/>
    </wsdl:message>
    <wsdl:message name="SendOut"><wsdl:part name="response" element="m:SendResponse"/></wsdl:message>
    <wsdl:portType name="Port">
        <wsdl:operation name="Send">
            <wsdl:input message="m:SendIn"/>
            <wsdl:output message="m:SendOut"/>
        </wsdl:operation>
    </wsdl:portType>
    <wsdl:binding name="Binding" type="m:Port">
        <wsdl:operation name="Send">
            <wsdl:input>
                <soap:header part="Version" use="literal"/>
                <soap:body parts="request" use="literal"/>
            </wsdl:input>
            <wsdl:output><soap:body use="literal"/></wsdl:output>
        </wsdl:operation>
    </wsdl:binding>
</wsdl:definitions>"#;

const OVERRIDES: &str = r#"
version: test
namespaces:
  m: urn:m
type_names:
  m:FooMessageType: Foo
"#;

const CONFIG: &str = r#"
schemas:
  - messages.xsd
wsdl: services.wsdl
overrides: overrides.yaml
namespaces:
  m: urn:m
output:
  path: graph.json
  format: json
"#;

fn write_project(dir: &Path) {
    std::fs::write(dir.join("messages.xsd"), MESSAGES_XSD).expect("Failed to write schema");
    std::fs::write(dir.join("services.wsdl"), SERVICES_WSDL).expect("Failed to write wsdl");
    std::fs::write(dir.join("overrides.yaml"), OVERRIDES).expect("Failed to write overrides");
    std::fs::write(dir.join("xsdgraph.yaml"), CONFIG).expect("Failed to write config");
}

fn type_named<'a>(artifact: &'a Value, name: &str) -> &'a Value {
    artifact["types"]
        .as_array()
        .expect("Failed to read types")
        .iter()
        .find(|t| t["name"] == name)
        .unwrap_or_else(|| panic!("missing type {name}"))
}

fn compile_json(dir: &Path) -> Value {
    let config = Config::load(dir.join("xsdgraph.yaml")).expect("Failed to load config");
    let graph = config.compile().expect("Failed to compile");
    let json = render(&graph, config.output.format, &config.artifact_options())
        .expect("Failed to render");
    serde_json::from_str(&json).expect("Failed to parse output")
}

#[test]
fn test_polymorphic_container() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project(dir.path());
    let artifact = compile_json(dir.path());

    let container = type_named(&artifact, "m:MessagesType");
    assert_eq!(container["is_list"], true);

    let elements = container["elements"].as_array().expect("Failed to read elements");
    for subtype in ["m:FooMessageType", "m:BarMessageType"] {
        let element = elements
            .iter()
            .find(|e| e["type_name"] == subtype)
            .unwrap_or_else(|| panic!("missing element for {subtype}"));
        assert_eq!(element["xml_name"], "m:Message");
        assert_eq!(element["is_list"], true);
    }
}

#[test]
fn test_override_precedence() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project(dir.path());
    let artifact = compile_json(dir.path());

    assert_eq!(type_named(&artifact, "m:FooMessageType")["json_type"], "Foo:#Exchange");
    assert_eq!(type_named(&artifact, "m:BarMessageType")["json_type"], "BarMessage:#Exchange");
}

#[test]
fn test_operation_and_headers() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project(dir.path());
    let artifact = compile_json(dir.path());

    let op = &artifact["operations"][0];
    assert_eq!(op["name"], "Send");
    assert_eq!(op["body_type"], "SendRequest:#Exchange");
    assert_eq!(op["request_type"], "SendJsonRequest:#Exchange");
    assert_eq!(op["request"], "m:MessagesType");
    assert_eq!(op["response_name"], "SendResponse");
    assert_eq!(artifact["request_headers"], "JsonRequestHeaders");

    let headers = type_named(&artifact, "JsonRequestHeaders");
    assert_eq!(headers["elements"][0]["xml_name"], "m:Version");
}

#[test]
fn test_rust_output() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project(dir.path());
    let config = Config::load(dir.path().join("xsdgraph.yaml")).expect("Failed to load config");
    let graph = config.compile().expect("Failed to compile");
    let source = render(&graph, OutputFormat::Rust, &config.artifact_options())
        .expect("Failed to render");

    assert!(source.contains("name: \"m:MessagesType\""));
    assert!(source.contains("body_type: \"SendRequest:#Exchange\""));
    assert!(source.contains("pub fn lookup_operation"));
}

#[test]
fn test_cli_generate_and_check() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project(dir.path());
    let config = dir.path().join("xsdgraph.yaml");

    let status = Command::new(env!("CARGO_BIN_EXE_xsdgraph"))
        .arg("--config")
        .arg(&config)
        .arg("generate")
        .status()
        .expect("Failed to run xsdgraph");
    assert!(status.success());
    let written = std::fs::read_to_string(dir.path().join("graph.json")).expect("Failed to read output");
    let artifact: Value = serde_json::from_str(&written).expect("Failed to parse output");
    assert_eq!(type_named(&artifact, "m:MessagesType")["is_list"], true);

    let output = Command::new(env!("CARGO_BIN_EXE_xsdgraph"))
        .arg("--config")
        .arg(&config)
        .arg("check")
        .output()
        .expect("Failed to run xsdgraph");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 operations"));
}

#[test]
fn test_cli_reports_missing_config() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = Command::new(env!("CARGO_BIN_EXE_xsdgraph"))
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .arg("check")
        .output()
        .expect("Failed to run xsdgraph");
    assert!(!output.status.success());
}
