//! The structured game definition produced by a CGE parser.

use std::fmt;

use cg_module::Version;
use serde::{Deserialize, Serialize};

/// A fully parsed CGE document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDefinition {
    name: String,
    cge_version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<ObjectDefinition>,
    #[serde(default)]
    commands: Vec<ObjectDefinition>,
    #[serde(default)]
    events: Vec<ObjectDefinition>,
    #[serde(default)]
    types: Vec<ObjectDefinition>,
    #[serde(default)]
    enums: Vec<EnumDefinition>,
}

impl GameDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new(name: impl Into<String>, cge_version: Version) -> Self {
        Self {
            name: name.into(),
            cge_version,
            config: None,
            commands: Vec::new(),
            events: Vec::new(),
            types: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Sets the game configuration object.
    #[must_use]
    pub fn with_config(mut self, config: ObjectDefinition) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a command sent from clients to the server.
    #[must_use]
    pub fn with_command(mut self, command: ObjectDefinition) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds an event sent from the server to clients.
    #[must_use]
    pub fn with_event(mut self, event: ObjectDefinition) -> Self {
        self.events.push(event);
        self
    }

    /// Adds a named object type.
    #[must_use]
    pub fn with_type(mut self, object: ObjectDefinition) -> Self {
        self.types.push(object);
        self
    }

    /// Adds an enumeration.
    #[must_use]
    pub fn with_enum(mut self, definition: EnumDefinition) -> Self {
        self.enums.push(definition);
        self
    }

    /// Returns the game name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the CGE language version the document was written against.
    #[must_use]
    pub const fn cge_version(&self) -> Version {
        self.cge_version
    }

    /// Returns the game configuration object, if declared.
    #[must_use]
    pub const fn config(&self) -> Option<&ObjectDefinition> {
        self.config.as_ref()
    }

    /// Returns the declared commands.
    #[must_use]
    pub fn commands(&self) -> &[ObjectDefinition] {
        &self.commands
    }

    /// Returns the declared events.
    #[must_use]
    pub fn events(&self) -> &[ObjectDefinition] {
        &self.events
    }

    /// Returns the declared object types.
    #[must_use]
    pub fn types(&self) -> &[ObjectDefinition] {
        &self.types
    }

    /// Returns the declared enumerations.
    #[must_use]
    pub fn enums(&self) -> &[EnumDefinition] {
        &self.enums
    }

    /// Drops every doc comment from the definition.
    pub fn strip_comments(&mut self) {
        let objects = self
            .config
            .iter_mut()
            .chain(&mut self.commands)
            .chain(&mut self.events)
            .chain(&mut self.types);
        for object in objects {
            object.comment = None;
            for property in &mut object.properties {
                property.comment = None;
            }
        }
        for definition in &mut self.enums {
            definition.comment = None;
            for value in &mut definition.values {
                value.comment = None;
            }
        }
    }
}

/// A command, event, config or type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default)]
    properties: Vec<Property>,
}

impl ObjectDefinition {
    /// Creates an object without properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            properties: Vec::new(),
        }
    }

    /// Attaches a doc comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns the declared name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the doc comment, if retained.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// A typed field of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(rename = "type")]
    property_type: PropertyType,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            comment: None,
            property_type,
        }
    }

    /// Attaches a doc comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the property name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the doc comment, if retained.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the property type.
    #[must_use]
    pub const fn property_type(&self) -> &PropertyType {
        &self.property_type
    }
}

/// A property type such as `string`, `Board` or `list<map<int>>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generic: Option<Box<PropertyType>>,
}

impl PropertyType {
    /// Creates a non-generic type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic: None,
        }
    }

    /// Creates a generic container such as `list` or `map`.
    #[must_use]
    pub fn generic(name: impl Into<String>, argument: Self) -> Self {
        Self {
            name: name.into(),
            generic: Some(Box::new(argument)),
        }
    }

    /// Returns the outer type name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the type argument of a container type.
    #[must_use]
    pub fn argument(&self) -> Option<&Self> {
        self.generic.as_deref()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.generic {
            Some(argument) => write!(f, "{}<{argument}>", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// An enumeration and its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default)]
    values: Vec<EnumValue>,
}

impl EnumDefinition {
    /// Creates an enumeration from value names.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            comment: None,
            values: values
                .into_iter()
                .map(|value| EnumValue {
                    name: value.into(),
                    comment: None,
                })
                .collect(),
        }
    }

    /// Attaches a doc comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the enumeration name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the doc comment, if retained.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }
}

/// One value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl EnumValue {
    /// Returns the value name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the doc comment, if retained.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
