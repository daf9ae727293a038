// src/metadata/descriptor.rs
//! Member descriptors
//!
//! Descriptors are produced by the reflection collaborator (or written by
//! hand in a redirect plan) and are the only view of a callable the
//! validator ever sees.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque type identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn void() -> Self {
        Self("void".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A single parameter of a callable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (informational only)
    #[serde(default)]
    pub name: String,

    /// Parameter type
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Passed by read-only reference
    #[serde(default)]
    pub is_in: bool,

    /// Passed by output reference
    #[serde(default)]
    pub is_out: bool,
}

impl Parameter {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            name: String::new(),
            ty: ty.into(),
            is_in: false,
            is_out: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn input(mut self) -> Self {
        self.is_in = true;
        self
    }

    pub fn output(mut self) -> Self {
        self.is_out = true;
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in {
            f.write_str("in ")?;
        }
        if self.is_out {
            f.write_str("out ")?;
        }
        write!(f, "{}", self.ty)
    }
}

impl From<&str> for Parameter {
    fn from(ty: &str) -> Self {
        Parameter::new(ty)
    }
}

/// Invocation kind of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallableKind {
    Method,
    Constructor,
}

/// Descriptor of a method, constructor or accessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: CallableKind,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default)]
    pub is_abstract: bool,

    pub declaring_type: TypeRef,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
}

fn default_kind() -> CallableKind {
    CallableKind::Method
}

impl MethodDescriptor {
    /// Instance method returning `void`
    pub fn instance(declaring_type: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CallableKind::Method,
            is_static: false,
            is_abstract: false,
            declaring_type: declaring_type.into(),
            parameters: Vec::new(),
            return_type: TypeRef::void(),
        }
    }

    /// Static method returning `void`
    pub fn static_method(declaring_type: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::instance(declaring_type, name)
        }
    }

    /// Instance constructor
    pub fn constructor(declaring_type: impl Into<TypeRef>) -> Self {
        Self {
            kind: CallableKind::Constructor,
            ..Self::instance(declaring_type, ".ctor")
        }
    }

    pub fn with_param(mut self, parameter: impl Into<Parameter>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn returning(mut self, return_type: impl Into<TypeRef>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn abstract_member(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Return type as seen by the caller; a constructor yields its declaring type
    pub fn effective_return_type(&self) -> &TypeRef {
        match self.kind {
            CallableKind::Constructor => &self.declaring_type,
            CallableKind::Method => &self.return_type,
        }
    }

    /// Stable identity, e.g. `Obj::Get(int)` or `static A::F(out int)`
    ///
    /// Overloads that differ only in parameter passing or callable kind get
    /// distinct identities.
    pub fn qualified_name(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        let kind = match self.kind {
            CallableKind::Constructor => "new ",
            CallableKind::Method => "",
        };
        format!(
            "{}{}{}::{}({})",
            kind,
            if self.is_static { "static " } else { "" },
            self.declaring_type,
            self.name,
            params.join(", ")
        )
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.effective_return_type(), self.qualified_name())
    }
}

/// Descriptor of a property and its accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub declaring_type: TypeRef,
    pub property_type: TypeRef,

    #[serde(default)]
    pub getter: Option<MethodDescriptor>,

    #[serde(default)]
    pub setter: Option<MethodDescriptor>,
}

impl PropertyDescriptor {
    pub fn new(
        declaring_type: impl Into<TypeRef>,
        name: impl Into<String>,
        property_type: impl Into<TypeRef>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            property_type: property_type.into(),
            getter: None,
            setter: None,
        }
    }

    /// Add a conventional `get_Name` accessor
    pub fn with_getter(mut self, is_static: bool) -> Self {
        let mut getter = MethodDescriptor::instance(self.declaring_type.clone(), format!("get_{}", self.name))
            .returning(self.property_type.clone());
        getter.is_static = is_static;
        self.getter = Some(getter);
        self
    }

    /// Add a conventional `set_Name` accessor
    pub fn with_setter(mut self, is_static: bool) -> Self {
        let mut setter = MethodDescriptor::instance(self.declaring_type.clone(), format!("set_{}", self.name))
            .with_param(Parameter::new(self.property_type.clone()).named("value"));
        setter.is_static = is_static;
        self.setter = Some(setter);
        self
    }

    pub fn accessors(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.getter.iter().chain(self.setter.iter())
    }
}

/// Descriptor of an event and its accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub name: String,
    pub declaring_type: TypeRef,
    pub handler_type: TypeRef,

    #[serde(default)]
    pub add: Option<MethodDescriptor>,

    #[serde(default)]
    pub remove: Option<MethodDescriptor>,

    #[serde(default)]
    pub raise: Option<MethodDescriptor>,
}

impl EventDescriptor {
    pub fn new(
        declaring_type: impl Into<TypeRef>,
        name: impl Into<String>,
        handler_type: impl Into<TypeRef>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            handler_type: handler_type.into(),
            add: None,
            remove: None,
            raise: None,
        }
    }

    fn handler_accessor(&self, prefix: &str, is_static: bool) -> MethodDescriptor {
        let mut accessor = MethodDescriptor::instance(self.declaring_type.clone(), format!("{}_{}", prefix, self.name))
            .with_param(Parameter::new(self.handler_type.clone()).named("handler"));
        accessor.is_static = is_static;
        accessor
    }

    /// Add conventional `add_Name` / `remove_Name` accessors
    pub fn with_add_remove(mut self, is_static: bool) -> Self {
        self.add = Some(self.handler_accessor("add", is_static));
        self.remove = Some(self.handler_accessor("remove", is_static));
        self
    }

    pub fn with_raise(mut self, raise: MethodDescriptor) -> Self {
        self.raise = Some(raise);
        self
    }

    pub fn accessors(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.add.iter().chain(self.remove.iter()).chain(self.raise.iter())
    }
}

/// Any member that can be redirected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberDescriptor {
    Method(MethodDescriptor),
    Property(PropertyDescriptor),
    Event(EventDescriptor),
}

impl MemberDescriptor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MemberDescriptor::Method(m) if m.kind == CallableKind::Constructor => "constructor",
            MemberDescriptor::Method(_) => "method",
            MemberDescriptor::Property(_) => "property",
            MemberDescriptor::Event(_) => "event",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MemberDescriptor::Method(m) => &m.name,
            MemberDescriptor::Property(p) => &p.name,
            MemberDescriptor::Event(e) => &e.name,
        }
    }
}
