// src/validation/accessor.rs
//! Property and event compatibility
//!
//! Properties and events are redirected accessor by accessor. The pair as a
//! whole must agree on value type, static-ness and which accessors exist;
//! each accessor pair is then validated like any other method.

use crate::metadata::descriptor::{EventDescriptor, MethodDescriptor, PropertyDescriptor, TypeRef};
use crate::utils::errors::{RedirectError, Result, SignatureRule, Side};
use crate::validation::method::{validate_method, MethodPlan};
use tracing::debug;

/// A validated property pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPlan {
    pub(crate) original: PropertyDescriptor,
    pub(crate) replacement: PropertyDescriptor,
    pub(crate) getter: Option<MethodPlan>,
    pub(crate) setter: Option<MethodPlan>,
}

impl PropertyPlan {
    pub fn original(&self) -> &PropertyDescriptor {
        &self.original
    }

    pub fn replacement(&self) -> &PropertyDescriptor {
        &self.replacement
    }

    pub fn getter(&self) -> Option<&MethodPlan> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&MethodPlan> {
        self.setter.as_ref()
    }
}

/// A validated event pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPlan {
    pub(crate) original: EventDescriptor,
    pub(crate) replacement: EventDescriptor,
    pub(crate) add: Option<MethodPlan>,
    pub(crate) remove: Option<MethodPlan>,
    pub(crate) raise: Option<MethodPlan>,
}

impl EventPlan {
    pub fn original(&self) -> &EventDescriptor {
        &self.original
    }

    pub fn replacement(&self) -> &EventDescriptor {
        &self.replacement
    }

    pub fn add(&self) -> Option<&MethodPlan> {
        self.add.as_ref()
    }

    pub fn remove(&self) -> Option<&MethodPlan> {
        self.remove.as_ref()
    }

    pub fn raise(&self) -> Option<&MethodPlan> {
        self.raise.as_ref()
    }
}

/// One side of an accessor comparison
struct AccessorSet<'a, const N: usize> {
    member: &'a str,
    value_type: &'a TypeRef,
    accessors: [Option<&'a MethodDescriptor>; N],
}

impl<'a, const N: usize> AccessorSet<'a, N> {
    fn first(&self) -> Option<&'a MethodDescriptor> {
        self.accessors.iter().flatten().next().copied()
    }

    fn presence(&self) -> [bool; N] {
        self.accessors.map(|a| a.is_some())
    }
}

/// Validate that the property `original` can be redirected to `replacement`
pub fn validate_property(
    original: &PropertyDescriptor,
    replacement: &PropertyDescriptor,
) -> Result<PropertyPlan> {
    let [getter, setter] = validate_accessors(
        "property",
        ["getter", "setter"],
        AccessorSet {
            member: &original.name,
            value_type: &original.property_type,
            accessors: [original.getter.as_ref(), original.setter.as_ref()],
        },
        AccessorSet {
            member: &replacement.name,
            value_type: &replacement.property_type,
            accessors: [replacement.getter.as_ref(), replacement.setter.as_ref()],
        },
    )?;

    Ok(PropertyPlan {
        original: original.clone(),
        replacement: replacement.clone(),
        getter,
        setter,
    })
}

/// Validate that the event `original` can be redirected to `replacement`
pub fn validate_event(original: &EventDescriptor, replacement: &EventDescriptor) -> Result<EventPlan> {
    let [add, remove, raise] = validate_accessors(
        "event",
        ["add", "remove", "raise"],
        AccessorSet {
            member: &original.name,
            value_type: &original.handler_type,
            accessors: [original.add.as_ref(), original.remove.as_ref(), original.raise.as_ref()],
        },
        AccessorSet {
            member: &replacement.name,
            value_type: &replacement.handler_type,
            accessors: [
                replacement.add.as_ref(),
                replacement.remove.as_ref(),
                replacement.raise.as_ref(),
            ],
        },
    )?;

    Ok(EventPlan {
        original: original.clone(),
        replacement: replacement.clone(),
        add,
        remove,
        raise,
    })
}

fn validate_accessors<const N: usize>(
    kind: &str,
    names: [&str; N],
    original: AccessorSet<'_, N>,
    replacement: AccessorSet<'_, N>,
) -> Result<[Option<MethodPlan>; N]> {
    let original_first = original.first().ok_or_else(|| {
        RedirectError::NullArgument(format!("original {} '{}' has no accessors", kind, original.member))
    })?;
    let replacement_first = replacement.first().ok_or_else(|| {
        RedirectError::NullArgument(format!(
            "replacement {} '{}' has no accessors",
            kind, replacement.member
        ))
    })?;

    for (side, set) in [(Side::Original, &original), (Side::Replacement, &replacement)] {
        if let Some(accessor) = set.accessors.iter().flatten().find(|a| a.is_abstract) {
            return Err(RedirectError::AbstractMember {
                side,
                member: accessor.qualified_name(),
            });
        }
    }

    if original_first.is_static != replacement_first.is_static {
        return Err(RedirectError::incompatible(
            Side::Both,
            SignatureRule::Staticness,
            format!(
                "original {} '{}' static: {}, replacement '{}' static: {}",
                kind,
                original.member,
                original_first.is_static,
                replacement.member,
                replacement_first.is_static
            ),
        ));
    }

    if original.value_type != replacement.value_type {
        return Err(RedirectError::incompatible(
            Side::Both,
            SignatureRule::ValueType,
            format!(
                "original {} is '{}', replacement is '{}'",
                kind, original.value_type, replacement.value_type
            ),
        ));
    }

    let original_presence = original.presence();
    let replacement_presence = replacement.presence();
    if original_presence != replacement_presence {
        let describe = |presence: &[bool; N]| {
            names
                .iter()
                .zip(presence)
                .filter(|(_, present)| **present)
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join("/")
        };
        return Err(RedirectError::KindMismatch(format!(
            "original {} '{}' has [{}], replacement '{}' has [{}]",
            kind,
            original.member,
            describe(&original_presence),
            replacement.member,
            describe(&replacement_presence)
        )));
    }

    let mut plans: [Option<MethodPlan>; N] = std::array::from_fn(|_| None);
    for (i, plan) in plans.iter_mut().enumerate() {
        if let (Some(o), Some(r)) = (original.accessors[i], replacement.accessors[i]) {
            *plan = Some(validate_method(o, r)?);
        }
    }

    debug!(
        "Validated {} {} -> {}",
        kind, original.member, replacement.member
    );
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::method::ShiftMode;

    fn count(declaring: &str, is_static: bool) -> PropertyDescriptor {
        PropertyDescriptor::new(declaring, "Count", "int")
            .with_getter(is_static)
            .with_setter(is_static)
    }

    #[test]
    fn test_property_pair() {
        let plan = validate_property(&count("Obj", false), &count("Obj", false)).unwrap();
        assert_eq!(plan.getter().unwrap().shift_mode(), ShiftMode::Identity);
        assert!(plan.setter().is_some());
    }

    #[test]
    fn test_cross_type_instance_property() {
        let plan = validate_property(&count("Obj", false), &count("Other", false));
        assert!(plan.is_ok());
    }

    #[test]
    fn test_property_without_accessors() {
        let empty = PropertyDescriptor::new("Obj", "Count", "int");
        assert!(matches!(
            validate_property(&empty, &count("Obj", false)),
            Err(RedirectError::NullArgument(_))
        ));
        assert!(matches!(
            validate_property(&count("Obj", false), &empty),
            Err(RedirectError::NullArgument(_))
        ));
    }

    #[test]
    fn test_property_abstract_accessor() {
        let mut replacement = count("Other", false);
        replacement.setter.as_mut().unwrap().is_abstract = true;
        assert!(matches!(
            validate_property(&count("Obj", false), &replacement),
            Err(RedirectError::AbstractMember {
                side: Side::Replacement,
                ..
            })
        ));
    }

    #[test]
    fn test_property_static_mismatch() {
        assert!(matches!(
            validate_property(&count("Obj", false), &count("Hooks", true)),
            Err(RedirectError::IncompatibleSignature {
                rule: SignatureRule::Staticness,
                ..
            })
        ));
    }

    #[test]
    fn test_property_type_mismatch() {
        let replacement = PropertyDescriptor::new("Obj", "Count", "long")
            .with_getter(false)
            .with_setter(false);
        assert!(matches!(
            validate_property(&count("Obj", false), &replacement),
            Err(RedirectError::IncompatibleSignature {
                rule: SignatureRule::ValueType,
                ..
            })
        ));
    }

    #[test]
    fn test_property_accessor_presence() {
        let read_only = PropertyDescriptor::new("Other", "Count", "int").with_getter(false);
        let err = validate_property(&count("Obj", false), &read_only).unwrap_err();
        match err {
            RedirectError::KindMismatch(message) => {
                assert!(message.contains("[getter/setter]"));
                assert!(message.contains("[getter]"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_event_pair() {
        let original = EventDescriptor::new("Obj", "Changed", "EventHandler").with_add_remove(false);
        let replacement = EventDescriptor::new("Other", "Changed", "EventHandler").with_add_remove(false);
        let plan = validate_event(&original, &replacement).unwrap();
        assert!(plan.add().is_some());
        assert!(plan.remove().is_some());
        assert!(plan.raise().is_none());
    }

    #[test]
    fn test_event_raise_presence() {
        let raise = MethodDescriptor::instance("Obj", "raise_Changed").with_param("EventArgs");
        let original = EventDescriptor::new("Obj", "Changed", "EventHandler")
            .with_add_remove(false)
            .with_raise(raise);
        let replacement = EventDescriptor::new("Other", "Changed", "EventHandler").with_add_remove(false);
        assert!(matches!(
            validate_event(&original, &replacement),
            Err(RedirectError::KindMismatch(_))
        ));
    }

    #[test]
    fn test_event_handler_type_mismatch() {
        let original = EventDescriptor::new("Obj", "Changed", "EventHandler").with_add_remove(true);
        let replacement = EventDescriptor::new("Hooks", "Changed", "Action").with_add_remove(true);
        assert!(matches!(
            validate_event(&original, &replacement),
            Err(RedirectError::IncompatibleSignature {
                rule: SignatureRule::ValueType,
                ..
            })
        ));
    }
}
