//! The synchronized OTP record.

/// Root element name written by OtpKeyProv clients.
pub const DEFAULT_ROOT_ELEMENT: &str = "OtpInfo";

/// A name/value attribute on the record's root or on a field element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    name: String,
    value: String,
}

impl XmlAttribute {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A provider-specific field that the resolver never interprets.
///
/// Fields written by newer clients may be structured; their sub-elements
/// are kept as `children` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpField {
    name: String,
    attributes: Vec<XmlAttribute>,
    value: String,
    children: Vec<OtpField>,
}

impl OtpField {
    /// Creates a field without attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Creates a field carrying element attributes.
    pub fn with_attributes(
        name: impl Into<String>,
        attributes: Vec<XmlAttribute>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Appends a sub-element.
    #[must_use]
    pub fn with_child(mut self, child: OtpField) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Sub-elements in document order, empty for scalar fields.
    #[must_use]
    pub fn children(&self) -> &[OtpField] {
        &self.children
    }
}

/// An OTP provisioning record.
///
/// `counter` counts the OTPs consumed or generated so far and only ever
/// grows. A record with a higher counter was produced by a later operation
/// than one with a lower counter; nothing else orders two records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    root: String,
    attributes: Vec<XmlAttribute>,
    counter: u64,
    fields: Vec<OtpField>,
}

impl OtpRecord {
    /// Creates a record with the given counter and no opaque fields.
    #[must_use]
    pub fn new(counter: u64) -> Self {
        Self {
            root: DEFAULT_ROOT_ELEMENT.to_string(),
            attributes: Vec::new(),
            counter,
            fields: Vec::new(),
        }
    }

    /// Reassembles a record from its decoded parts.
    pub(crate) fn from_parts(
        root: String,
        attributes: Vec<XmlAttribute>,
        counter: u64,
        fields: Vec<OtpField>,
    ) -> Self {
        Self {
            root,
            attributes,
            counter,
            fields,
        }
    }

    /// Returns the counter.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn set_counter(&mut self, counter: u64) {
        self.counter = counter;
    }

    /// Returns the root element name.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the root element's attributes (namespace declarations etc).
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Returns the opaque fields in document order.
    #[must_use]
    pub fn fields(&self) -> &[OtpField] {
        &self.fields
    }

    /// Returns the value of the first field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Sets a field's value, replacing the first field of that name or
    /// appending a new one.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(OtpField::new(name, value)),
        }
    }

    /// Appends a field, even if one with the same name already exists.
    pub fn push_field(&mut self, field: OtpField) {
        self.fields.push(field);
    }

    /// Builder form of [`set_field`](Self::set_field).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Appends an attribute to the root element.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute::new(name, value));
        self
    }

    /// Returns a copy with a different root element name.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }
}

impl Default for OtpRecord {
    fn default() -> Self {
        Self::new(0)
    }
}
