use super::{require_identified, DecodeError, DecodeResult, FormatDecoder};
use crate::domain::model::{
    Format, GeoReportV2Error, PostServiceRequestResponse, Service, ServiceDefinition,
    ServiceRequest, ServiceRequestIdResponse,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decoder for `.xml` endpoints.
///
/// The document is read into a small element tree and reshaped into the
/// same JSON value the JSON endpoints would send, so both decoders share
/// the record deserializers.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

impl FormatDecoder for XmlDecoder {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn decode_services(&self, body: &str) -> DecodeResult<Vec<Service>> {
        decode_list(body, "services", "service")
    }

    fn decode_service_definition(&self, body: &str) -> DecodeResult<ServiceDefinition> {
        let document = parse_document(body)?;
        expect_name(&document, "service_definition")?;
        from_value(document.into_value(&["attributes", "values"])?)
    }

    fn decode_service_request_ids(&self, body: &str) -> DecodeResult<Vec<ServiceRequestIdResponse>> {
        decode_list(body, "service_requests", "request")
    }

    fn decode_service_requests(&self, body: &str) -> DecodeResult<Vec<ServiceRequest>> {
        decode_list(body, "service_requests", "request")
    }

    fn decode_post_service_request_responses(
        &self,
        body: &str,
    ) -> DecodeResult<Vec<PostServiceRequestResponse>> {
        require_identified(decode_list(body, "service_requests", "request")?)
    }

    fn decode_errors(&self, body: &str) -> DecodeResult<Vec<GeoReportV2Error>> {
        decode_list(body, "errors", "error")
    }
}

#[derive(Debug)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn named(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Elements named in `lists` become arrays of their children; leaves
    /// become strings (or null when blank); everything else becomes an object.
    /// Text is kept as written. Whitespace between child elements is layout,
    /// any other text next to children is an error, as is a repeated field.
    fn into_value(self, lists: &[&str]) -> DecodeResult<Value> {
        let is_list = lists.contains(&self.name.as_str());

        if (is_list || !self.children.is_empty()) && !self.text.trim().is_empty() {
            return Err(DecodeError::InvalidShape(format!(
                "unexpected text inside <{}>",
                self.name
            )));
        }

        if is_list {
            return self
                .children
                .into_iter()
                .map(|child| child.into_value(lists))
                .collect::<DecodeResult<Vec<_>>>()
                .map(Value::Array);
        }

        if self.children.is_empty() {
            return Ok(if self.text.trim().is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            });
        }

        let mut fields = Map::new();
        for child in self.children {
            let name = child.name.clone();
            if fields.contains_key(&name) {
                return Err(DecodeError::InvalidShape(format!(
                    "duplicate field `{}` inside <{}>",
                    name, self.name
                )));
            }
            let value = child.into_value(lists)?;
            fields.insert(name, value);
        }
        Ok(Value::Object(fields))
    }
}

fn xml_error(error: impl std::fmt::Display) -> DecodeError {
    DecodeError::Xml(error.to_string())
}

fn parse_document(body: &str) -> DecodeResult<Element> {
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                stack.push(Element::named(name));
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::named(name))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error("closing tag without an opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                append_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(format!("element <{}> is never closed", open.name)));
    }

    root.ok_or_else(|| xml_error("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> DecodeResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(xml_error("more than one root element")),
        None => *root = Some(element),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> DecodeResult<()> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(xml_error("text outside of the root element")),
    }
    Ok(())
}

fn expect_name(element: &Element, expected: &'static str) -> DecodeResult<()> {
    if element.name == expected {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedRoot {
            expected,
            found: element.name.clone(),
        })
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> DecodeResult<T> {
    serde_json::from_value(value).map_err(|e| DecodeError::InvalidShape(e.to_string()))
}

fn decode_list<T: DeserializeOwned>(
    body: &str,
    root: &'static str,
    item: &'static str,
) -> DecodeResult<Vec<T>> {
    let document = parse_document(body)?;
    expect_name(&document, root)?;

    if let Some(stray) = document.children.iter().find(|child| child.name != item) {
        return Err(DecodeError::InvalidShape(format!(
            "unexpected <{}> inside <{}>",
            stray.name, root
        )));
    }

    from_value(document.into_value(&[root])?)
}
