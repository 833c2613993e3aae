//! Structural model of compiled types.
//!
//! A [`Type`] is what the external bytecode reader produces for one class
//! file: its modifiers, supertypes, members and (for methods) the use-sites
//! found in the member body. Types are immutable once parsed.

use super::signatures::{parse_field_descriptor, parse_method_descriptor};
use super::{MemberKey, UseSite};
use crate::error::{ApiToolsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JVM access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(pub u32);

impl Modifiers {
    pub const PUBLIC: u32 = 0x0001;
    pub const PRIVATE: u32 = 0x0002;
    pub const PROTECTED: u32 = 0x0004;
    pub const STATIC: u32 = 0x0008;
    pub const FINAL: u32 = 0x0010;
    pub const SYNCHRONIZED: u32 = 0x0020;
    pub const VOLATILE: u32 = 0x0040;
    pub const TRANSIENT: u32 = 0x0080;
    pub const NATIVE: u32 = 0x0100;
    pub const INTERFACE: u32 = 0x0200;
    pub const ABSTRACT: u32 = 0x0400;
    pub const STRICT: u32 = 0x0800;
    pub const SYNTHETIC: u32 = 0x1000;
    pub const ANNOTATION: u32 = 0x2000;
    pub const ENUM: u32 = 0x4000;
    /// Interface method with a body
    pub const DEFAULT: u32 = 0x1_0000;

    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    #[must_use]
    pub const fn with(self, flag: u32) -> Self {
        Self(self.0 | flag)
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        self.has(Self::PUBLIC)
    }

    #[must_use]
    pub const fn is_protected(self) -> bool {
        self.has(Self::PROTECTED)
    }

    #[must_use]
    pub const fn is_private(self) -> bool {
        self.has(Self::PRIVATE)
    }

    #[must_use]
    pub const fn is_static(self) -> bool {
        self.has(Self::STATIC)
    }

    #[must_use]
    pub const fn is_final(self) -> bool {
        self.has(Self::FINAL)
    }

    #[must_use]
    pub const fn is_abstract(self) -> bool {
        self.has(Self::ABSTRACT)
    }

    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.has(Self::SYNTHETIC)
    }

    /// Visible outside the declaring package (public or protected).
    #[must_use]
    pub const fn is_visible(self) -> bool {
        self.has(Self::PUBLIC) || self.has(Self::PROTECTED)
    }

    /// Access rank: private < package < protected < public.
    #[must_use]
    pub const fn access_rank(self) -> u8 {
        if self.is_public() {
            3
        } else if self.is_protected() {
            2
        } else if self.is_private() {
            0
        } else {
            1
        }
    }
}

/// Kind of a compiled type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
        };
        f.write_str(s)
    }
}

/// Reference to a method of some type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub type_name: String,
    pub name: String,
    pub signature: String,
}

/// A field of a compiled type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Field type descriptor
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_signature: Option<String>,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub declaring_type: String,
    #[serde(default)]
    pub enum_constant: bool,
    /// Compile-time constant value, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<String>,
}

impl Field {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            generic_signature: None,
            modifiers: Modifiers::new(Modifiers::PUBLIC),
            declaring_type: declaring_type.into(),
            enum_constant: false,
            constant_value: None,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn as_enum_constant(mut self) -> Self {
        self.enum_constant = true;
        self
    }

    #[must_use]
    pub fn with_constant(mut self, value: impl Into<String>) -> Self {
        self.constant_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> MemberKey {
        MemberKey::new(self.name.clone(), self.signature.clone())
    }
}

/// A method, constructor or annotation element of a compiled type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Method descriptor
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_signature: Option<String>,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub declaring_type: String,
    /// Default value of an annotation element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thrown_exceptions: Vec<String>,
    /// Use-sites found in the method body
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<UseSite>,
}

impl Method {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            generic_signature: None,
            modifiers: Modifiers::new(Modifiers::PUBLIC),
            declaring_type: declaring_type.into(),
            default_value: None,
            thrown_exceptions: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_throws(mut self, exception: impl Into<String>) -> Self {
        self.thrown_exceptions.push(exception.into());
        self
    }

    #[must_use]
    pub fn with_use(mut self, site: UseSite) -> Self {
        self.body.push(site);
        self
    }

    #[must_use]
    pub fn key(&self) -> MemberKey {
        MemberKey::new(self.name.clone(), self.signature.clone())
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    #[must_use]
    pub fn is_initializer(&self) -> bool {
        self.name == "<clinit>"
    }

    /// Whether subclasses can override this method.
    #[must_use]
    pub fn is_overridable(&self) -> bool {
        !self.is_constructor()
            && !self.is_initializer()
            && !self.modifiers.is_static()
            && !self.modifiers.is_private()
    }
}

/// One compiled type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    /// Dotted qualified name, nested types use `$`
    pub qualified_name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing_method: Option<MethodRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_signature: Option<String>,
}

impl Type {
    pub fn new(qualified_name: impl Into<String>, kind: TypeKind) -> Self {
        let mut modifiers = Modifiers::new(Modifiers::PUBLIC);
        match kind {
            TypeKind::Interface => modifiers = modifiers.with(Modifiers::INTERFACE | Modifiers::ABSTRACT),
            TypeKind::Annotation => {
                modifiers = modifiers
                    .with(Modifiers::INTERFACE | Modifiers::ABSTRACT | Modifiers::ANNOTATION);
            }
            TypeKind::Enum => modifiers = modifiers.with(Modifiers::ENUM | Modifiers::FINAL),
            TypeKind::Class => {}
        }
        Self {
            qualified_name: qualified_name.into(),
            kind,
            modifiers,
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            member_types: Vec::new(),
            enclosing_method: None,
            generic_signature: None,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Add an enum constant field of this type.
    #[must_use]
    pub fn with_enum_constant(self, name: &str) -> Self {
        let descriptor = format!("L{};", self.qualified_name.replace('.', "/"));
        let field = Field::new(self.qualified_name.clone(), name, descriptor)
            .with_modifiers(Modifiers::new(
                Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL | Modifiers::ENUM,
            ))
            .as_enum_constant();
        self.with_field(field)
    }

    #[must_use]
    pub fn package(&self) -> &str {
        super::package_of(&self.qualified_name)
    }

    /// Qualified name of the enclosing type, for nested types.
    #[must_use]
    pub fn enclosing_type_name(&self) -> Option<&str> {
        self.qualified_name
            .rfind('$')
            .map(|idx| &self.qualified_name[..idx])
    }

    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn find_method(&self, name: &str, signature: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.signature == signature)
    }

    /// Whether the type declares a member with the given key.
    #[must_use]
    pub fn declares(&self, key: &MemberKey) -> bool {
        if key.is_method() {
            self.find_method(&key.name, &key.signature).is_some()
        } else {
            self.find_field(&key.name).is_some()
        }
    }

    /// Names of the enum constants, in declaration order.
    pub fn enum_constants(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.enum_constant)
            .map(|f| f.name.as_str())
    }

    /// Check the structural consistency of the type.
    pub fn validate(&self) -> Result<()> {
        if self.qualified_name.trim().is_empty() {
            return Err(ApiToolsError::malformed(
                "<unnamed>",
                "type has an empty qualified name",
            ));
        }
        for field in &self.fields {
            if field.declaring_type != self.qualified_name {
                return Err(ApiToolsError::malformed(
                    &self.qualified_name,
                    format!(
                        "field '{}' declared by '{}'",
                        field.name, field.declaring_type
                    ),
                ));
            }
            parse_field_descriptor(&field.signature).map_err(|_| {
                ApiToolsError::malformed(
                    &self.qualified_name,
                    format!("field '{}' has descriptor '{}'", field.name, field.signature),
                )
            })?;
        }
        for method in &self.methods {
            if method.declaring_type != self.qualified_name {
                return Err(ApiToolsError::malformed(
                    &self.qualified_name,
                    format!(
                        "method '{}' declared by '{}'",
                        method.name, method.declaring_type
                    ),
                ));
            }
            parse_method_descriptor(&method.signature).map_err(|_| {
                ApiToolsError::malformed(
                    &self.qualified_name,
                    format!(
                        "method '{}' has descriptor '{}'",
                        method.name, method.signature
                    ),
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_rank_ordering() {
        let public = Modifiers::new(Modifiers::PUBLIC);
        let protected = Modifiers::new(Modifiers::PROTECTED);
        let package = Modifiers::default();
        let private = Modifiers::new(Modifiers::PRIVATE);
        assert!(public.access_rank() > protected.access_rank());
        assert!(protected.access_rank() > package.access_rank());
        assert!(package.access_rank() > private.access_rank());
    }

    #[test]
    fn test_enum_constants() {
        let color = Type::new("org.example.Color", TypeKind::Enum)
            .with_enum_constant("RED")
            .with_enum_constant("GREEN");
        let constants: Vec<&str> = color.enum_constants().collect();
        assert_eq!(constants, vec!["RED", "GREEN"]);
        assert!(color.validate().is_ok());
        assert_eq!(color.fields[0].signature, "Lorg/example/Color;");
    }

    #[test]
    fn test_validate_rejects_foreign_member() {
        let ty = Type::new("a.A", TypeKind::Class).with_method(Method::new("a.B", "run", "()V"));
        assert!(matches!(
            ty.validate(),
            Err(ApiToolsError::MalformedType { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_descriptor() {
        let ty = Type::new("a.A", TypeKind::Class).with_field(Field::new("a.A", "f", "Q"));
        assert!(ty.validate().is_err());
    }

    #[test]
    fn test_overridable() {
        let m = Method::new("a.A", "run", "()V");
        assert!(m.is_overridable());
        assert!(!Method::new("a.A", "<init>", "()V").is_overridable());
        let s = Method::new("a.A", "util", "()V")
            .with_modifiers(Modifiers::new(Modifiers::PUBLIC | Modifiers::STATIC));
        assert!(!s.is_overridable());
    }

    #[test]
    fn test_nested_type_names() {
        let ty = Type::new("a.Outer$Inner", TypeKind::Class);
        assert_eq!(ty.enclosing_type_name(), Some("a.Outer"));
        assert_eq!(ty.package(), "a");
    }
}
