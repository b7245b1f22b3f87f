//! WSDL operation-binding extractor.
//!
//! Joins `wsdl:message`, `wsdl:portType` and `wsdl:binding` into one flat
//! [`OperationDescriptor`] per bound operation.

use crate::error::ParseError;
use crate::types::QName;
use crate::xml::{XmlElement, parse_document};
use indexmap::IndexMap;
use std::collections::HashMap;

/// One protocol operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Operation (action) name.
    pub action: String,
    /// Request body element.
    pub input: QName,
    /// Response body element.
    pub output: QName,
    /// Request header elements in binding order.
    pub input_headers: Vec<QName>,
    /// Response header elements in binding order.
    pub output_headers: Vec<QName>,
}

/// Parts of one `wsdl:message`: part name to element.
type Message = IndexMap<String, QName>;

struct PortOperation {
    input: String,
    output: String,
}

/// Extracts the operations of the first binding of a WSDL document.
///
/// # Errors
/// Returns `ParseError` if the document is malformed, an operation is not
/// bound as literal SOAP, or a message, part or port operation is missing.
pub fn parse_operations(xml: &str) -> Result<Vec<OperationDescriptor>, ParseError> {
    let root = parse_document(xml)?;
    if !root.is("definitions") {
        return Err(ParseError::structure(format!(
            "expected wsdl:definitions root, found '{}'",
            root.tag()
        )));
    }

    let messages = collect_messages(&root)?;
    let port_operations = collect_port_operations(&root)?;

    let binding = root
        .child("binding")
        .ok_or_else(|| ParseError::structure("service description has no binding"))?;

    let mut operations = Vec::new();
    for op in binding.children_named("operation") {
        let action = op.required_attr("name")?;
        let port = port_operations.get(action).ok_or_else(|| {
            ParseError::structure(format!("operation '{action}' missing from portType"))
        })?;

        let input_message = lookup_message(&messages, &port.input, action)?;
        let output_message = lookup_message(&messages, &port.output, action)?;

        let input = op
            .child("input")
            .ok_or_else(|| ParseError::structure(format!("operation '{action}' has no input")))?;
        let output = op
            .child("output")
            .ok_or_else(|| ParseError::structure(format!("operation '{action}' has no output")))?;

        operations.push(OperationDescriptor {
            action: action.to_string(),
            input: body_element(action, input, input_message)?,
            output: body_element(action, output, output_message)?,
            input_headers: header_elements(action, input, input_message, &messages)?,
            output_headers: header_elements(action, output, output_message, &messages)?,
        });
    }

    Ok(operations)
}

fn collect_messages(root: &XmlElement) -> Result<HashMap<String, Message>, ParseError> {
    let mut messages = HashMap::new();
    for message in root.children_named("message") {
        let mut parts = Message::new();
        for part in message.children_named("part") {
            let element = part
                .qname_attr("element")?
                .ok_or_else(|| ParseError::missing_attr(part.tag(), "element"))?;
            parts.insert(part.required_attr("name")?.to_string(), element);
        }
        messages.insert(message.required_attr("name")?.to_string(), parts);
    }
    Ok(messages)
}

fn collect_port_operations(
    root: &XmlElement,
) -> Result<HashMap<String, PortOperation>, ParseError> {
    let mut operations = HashMap::new();
    for port_type in root.children_named("portType") {
        for op in port_type.children_named("operation") {
            let name = op.required_attr("name")?;
            let message_of = |direction: &str| -> Result<String, ParseError> {
                let node = op.child(direction).ok_or_else(|| {
                    ParseError::structure(format!("port operation '{name}' has no {direction}"))
                })?;
                let message = node
                    .qname_attr("message")?
                    .ok_or_else(|| ParseError::missing_attr(node.tag(), "message"))?;
                Ok(message.local().to_string())
            };
            operations.insert(
                name.to_string(),
                PortOperation {
                    input: message_of("input")?,
                    output: message_of("output")?,
                },
            );
        }
    }
    Ok(operations)
}

fn lookup_message<'a>(
    messages: &'a HashMap<String, Message>,
    name: &str,
    action: &str,
) -> Result<&'a Message, ParseError> {
    messages.get(name).ok_or_else(|| {
        ParseError::structure(format!("message '{name}' of operation '{action}' not found"))
    })
}

/// Returns the element bound as the SOAP body of one direction.
///
/// Exactly one literal `soap:body` is required.
fn body_element(
    action: &str,
    direction: &XmlElement,
    message: &Message,
) -> Result<QName, ParseError> {
    let bodies: Vec<_> = direction.children_named("body").collect();
    let body = match bodies.as_slice() {
        [body] if body.attr("use") == Some("literal") => *body,
        _ => {
            return Err(ParseError::structure(format!(
                "operation '{action}' {} must have exactly one literal soap:body",
                direction.local
            )));
        }
    };

    let part = match body.attr("parts") {
        Some(parts) => parts.trim(),
        None if message.len() == 1 => message.keys().next().map_or("", String::as_str),
        None => {
            return Err(ParseError::structure(format!(
                "operation '{action}' {} body does not name its part",
                direction.local
            )));
        }
    };

    message.get(part).cloned().ok_or_else(|| {
        ParseError::structure(format!(
            "operation '{action}' {} body part '{part}' not found",
            direction.local
        ))
    })
}

fn header_elements(
    action: &str,
    direction: &XmlElement,
    own_message: &Message,
    messages: &HashMap<String, Message>,
) -> Result<Vec<QName>, ParseError> {
    let mut headers = Vec::new();
    for header in direction.children_named("header") {
        let message = match header.qname_attr("message")? {
            Some(name) => lookup_message(messages, name.local(), action)?,
            None => own_message,
        };
        let part = header.required_attr("part")?;
        let element = message.get(part).cloned().ok_or_else(|| {
            ParseError::structure(format!(
                "operation '{action}' header part '{part}' not found"
            ))
        })?;
        headers.push(element);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES_WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
                  xmlns:tns="urn:m" xmlns:t="urn:t"
                  targetNamespace="urn:m">
    <wsdl:message name="GetItemSoapIn">
        <wsdl:part name="request" element="tns:GetItem"/>
        <wsdl:part name="Impersonation" element="t:ExchangeImpersonation"/>
        <wsdl:part name="RequestVersion" element="t:RequestServerVersion"/>
    </wsdl:message>
    <wsdl:message name="GetItemSoapOut">
        <wsdl:part name="GetItemResult" element="tns:GetItemResponse"/>
        <wsdl:part name="ServerVersion" element="t:ServerVersionInfo"/>
    </wsdl:message>
    <wsdl:message name="PingIn">
        <wsdl:part name="request" element="tns:Ping"/>
    </wsdl:message>
    <wsdl:message name="PingOut">
        <wsdl:part name="response" element="tns:PingResponse"/>
    </wsdl:message>
    <wsdl:portType name="ExchangeServicePortType">
        <wsdl:operation name="GetItem">
            <wsdl:input message="tns:GetItemSoapIn"/>
            <wsdl:output message="tns:GetItemSoapOut"/>
        </wsdl:operation>
        <wsdl:operation name="Ping">
            <wsdl:input message="tns:PingIn"/>
            <wsdl:output message="tns:PingOut"/>
        </wsdl:operation>
    </wsdl:portType>
    <wsdl:binding name="ExchangeServiceBinding" type="tns:ExchangeServicePortType">
        <wsdl:operation name="GetItem">
            <soap:operation soapAction="urn:m/GetItem"/>
            <wsdl:input>
                <soap:header message="tns:GetItemSoapIn" part="Impersonation" use="literal"/>
                <soap:header part="RequestVersion" use="literal"/>
                <soap:body parts="request" use="literal"/>
            </wsdl:input>
            <wsdl:output>
                <soap:body parts="GetItemResult" use="literal"/>
                <soap:header message="tns:GetItemSoapOut" part="ServerVersion" use="literal"/>
            </wsdl:output>
        </wsdl:operation>
        <wsdl:operation name="Ping">
            <wsdl:input><soap:body use="literal"/></wsdl:input>
            <wsdl:output><soap:body use="literal"/></wsdl:output>
        </wsdl:operation>
    </wsdl:binding>
</wsdl:definitions>"#;

    #[test]
    fn test_parse_operations() {
        let ops = parse_operations(SERVICES_WSDL).expect("Failed to parse");
        assert_eq!(ops.len(), 2);

        let get_item = &ops[0];
        assert_eq!(get_item.action, "GetItem");
        assert_eq!(get_item.input, QName::new(Some("urn:m"), "GetItem"));
        assert_eq!(get_item.output, QName::new(Some("urn:m"), "GetItemResponse"));
        assert_eq!(
            get_item.input_headers,
            vec![
                QName::new(Some("urn:t"), "ExchangeImpersonation"),
                QName::new(Some("urn:t"), "RequestServerVersion"),
            ]
        );
        assert_eq!(
            get_item.output_headers,
            vec![QName::new(Some("urn:t"), "ServerVersionInfo")]
        );
    }

    #[test]
    fn test_single_part_without_parts_attribute() {
        let ops = parse_operations(SERVICES_WSDL).expect("Failed to parse");
        let ping = &ops[1];
        assert_eq!(ping.input.local(), "Ping");
        assert_eq!(ping.output.local(), "PingResponse");
        assert!(ping.input_headers.is_empty());
    }

    #[test]
    fn test_reject_encoded_body() {
        let wsdl = SERVICES_WSDL.replace(
            r#"<wsdl:input><soap:body use="literal"/></wsdl:input>"#,
            r#"<wsdl:input><soap:body use="encoded"/></wsdl:input>"#,
        );
        let err = parse_operations(&wsdl).unwrap_err();
        assert!(err.to_string().contains("Ping"));
    }

    #[test]
    fn test_missing_port_operation() {
        let wsdl = SERVICES_WSDL.replace(r#"<wsdl:operation name="Ping">
            <wsdl:input message="tns:PingIn"/>
            <wsdl:output message="tns:PingOut"/>
        </wsdl:operation>"#, "");
        assert!(parse_operations(&wsdl).is_err());
    }
}
