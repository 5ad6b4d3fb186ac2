//! XML codec for OTP records.
//!
//! The encoding matches the auxiliary files OtpKeyProv clients write: one
//! root element whose children are field elements, one of them `Counter`.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <OtpInfo><Counter>5</Counter><Secret>...</Secret></OtpInfo>
//! ```

use crate::error::{RecordError, RecordResult};
use crate::record::{OtpField, OtpRecord, XmlAttribute};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Read, Write};

/// Element that carries the counter.
pub const COUNTER_ELEMENT: &str = "Counter";

/// Stateless encoder/decoder for [`OtpRecord`].
///
/// Every call owns its own reader/writer state, so the codec can be used
/// from any number of tasks at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtpRecordCodec;

/// An element below the root that has been opened but not yet closed.
struct OpenField {
    name: String,
    attributes: Vec<XmlAttribute>,
    value: String,
    children: Vec<OtpField>,
}

impl OpenField {
    fn from_start(start: &BytesStart<'_>) -> RecordResult<Self> {
        let (name, attributes) = element_parts(start)?;
        Ok(Self {
            name,
            attributes,
            value: String::new(),
            children: Vec::new(),
        })
    }

    /// Layout whitespace between sub-elements is not part of the value.
    fn into_field(self) -> OtpField {
        let value = if !self.children.is_empty() && self.value.trim().is_empty() {
            String::new()
        } else {
            self.value
        };
        self.children.into_iter().fold(
            OtpField::with_attributes(self.name, self.attributes, value),
            OtpField::with_child,
        )
    }
}

impl OtpRecordCodec {
    /// Decodes a record from its XML bytes.
    ///
    /// Fields may contain sub-elements, which are kept as opaque children.
    /// `Counter` must be a top-level scalar.
    pub fn decode(bytes: &[u8]) -> RecordResult<OtpRecord> {
        let mut reader = Reader::from_reader(bytes);

        let mut root: Option<(String, Vec<XmlAttribute>)> = None;
        let mut root_closed = false;
        // Open elements below the root, outermost first.
        let mut open: Vec<OpenField> = Vec::new();
        let mut counter: Option<u64> = None;
        let mut fields = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Start(start) => {
                    if root_closed {
                        return Err(RecordError::malformed("content after root element"));
                    }
                    if root.is_none() {
                        root = Some(element_parts(&start)?);
                    } else {
                        reject_inside_counter(&open)?;
                        open.push(OpenField::from_start(&start)?);
                    }
                }
                Event::Empty(start) => {
                    if root_closed {
                        return Err(RecordError::malformed("content after root element"));
                    }
                    if root.is_none() {
                        // `<OtpInfo/>` has no counter; reported below.
                        root = Some(element_parts(&start)?);
                        root_closed = true;
                    } else {
                        reject_inside_counter(&open)?;
                        let field = OpenField::from_start(&start)?;
                        match open.last_mut() {
                            Some(parent) => parent.children.push(field.into_field()),
                            None => close_field(field, &mut counter, &mut fields)?,
                        }
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape()?;
                    match open.last_mut() {
                        Some(field) => field.value.push_str(&value),
                        None if value.trim().is_empty() => {}
                        None => {
                            return Err(RecordError::malformed(
                                "unexpected text outside a field element",
                            ));
                        }
                    }
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    let value = std::str::from_utf8(&data)
                        .map_err(|_| RecordError::malformed("CDATA is not valid UTF-8"))?;
                    match open.last_mut() {
                        Some(field) => field.value.push_str(value),
                        None => {
                            return Err(RecordError::malformed(
                                "unexpected CDATA outside a field element",
                            ));
                        }
                    }
                }
                Event::End(_) => match open.pop() {
                    Some(field) => match open.last_mut() {
                        Some(parent) => parent.children.push(field.into_field()),
                        None => close_field(field, &mut counter, &mut fields)?,
                    },
                    None if root.is_some() && !root_closed => root_closed = true,
                    None => return Err(RecordError::malformed("unbalanced closing tag")),
                },
                Event::Eof => break,
            }
        }

        let Some((root, attributes)) = root else {
            return Err(RecordError::malformed("missing root element"));
        };
        if !root_closed {
            return Err(RecordError::malformed(format!(
                "truncated record: <{root}> is never closed"
            )));
        }
        let counter = counter.ok_or_else(|| {
            RecordError::malformed(format!("missing <{COUNTER_ELEMENT}> element"))
        })?;

        Ok(OtpRecord::from_parts(root, attributes, counter, fields))
    }

    /// Reads a stream to its end and decodes it.
    pub fn decode_reader<R: Read>(mut reader: R) -> RecordResult<OtpRecord> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }

    /// Encodes a record in canonical form: XML declaration, root element,
    /// `Counter`, then the opaque fields in stored order.
    pub fn encode(record: &OtpRecord) -> RecordResult<Vec<u8>> {
        validate_name(record.root())?;

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new(record.root());
        for attr in record.attributes() {
            validate_name(attr.name())?;
            root.push_attribute((attr.name(), attr.value()));
        }
        writer.write_event(Event::Start(root))?;

        let counter = OtpField::new(COUNTER_ELEMENT, record.counter().to_string());
        write_element(&mut writer, &counter)?;
        for field in record.fields() {
            if field.name() == COUNTER_ELEMENT {
                return Err(RecordError::InvalidName(field.name().to_string()));
            }
            write_element(&mut writer, field)?;
        }

        writer.write_event(Event::End(BytesEnd::new(record.root())))?;
        Ok(writer.into_inner().into_inner())
    }
}

fn reject_inside_counter(open: &[OpenField]) -> RecordResult<()> {
    match open.first() {
        Some(top) if top.name == COUNTER_ELEMENT => Err(RecordError::malformed(format!(
            "nested element inside <{COUNTER_ELEMENT}>"
        ))),
        _ => Ok(()),
    }
}

/// Files a closed top-level element as either the counter or an opaque field.
fn close_field(
    field: OpenField,
    counter: &mut Option<u64>,
    fields: &mut Vec<OtpField>,
) -> RecordResult<()> {
    if field.name != COUNTER_ELEMENT {
        fields.push(field.into_field());
        return Ok(());
    }

    if counter.is_some() {
        return Err(RecordError::malformed(format!(
            "duplicate <{COUNTER_ELEMENT}> element"
        )));
    }
    let value = field.value.trim().parse::<u64>().map_err(|e| {
        RecordError::malformed(format!("invalid counter {:?}: {e}", field.value))
    })?;
    *counter = Some(value);
    Ok(())
}

fn element_parts(start: &BytesStart<'_>) -> RecordResult<(String, Vec<XmlAttribute>)> {
    let name = utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.push(XmlAttribute::new(key, value));
    }
    Ok((name, attributes))
}

fn utf8(bytes: &[u8]) -> RecordResult<&str> {
    std::str::from_utf8(bytes).map_err(|_| RecordError::malformed("name is not valid UTF-8"))
}

fn write_element<W: Write>(writer: &mut Writer<W>, field: &OtpField) -> RecordResult<()> {
    validate_name(field.name())?;
    let mut start = BytesStart::new(field.name());
    for attr in field.attributes() {
        validate_name(attr.name())?;
        start.push_attribute((attr.name(), attr.value()));
    }
    writer.write_event(Event::Start(start))?;
    if !field.value().is_empty() {
        writer.write_event(Event::Text(BytesText::new(field.value())))?;
    }
    for child in field.children() {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(field.name())))?;
    Ok(())
}

/// Accepts XML names (qualified names included), rejects anything that
/// would produce unparseable output.
fn validate_name(name: &str) -> RecordResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RecordError::InvalidName(name.to_string()))
    }
}
