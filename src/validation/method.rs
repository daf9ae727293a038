// src/validation/method.rs
//! Method signature compatibility
//!
//! Decides whether calls to one method can be diverted to another and
//! computes how arguments line up between the two.
//!
//! # Shift modes
//!
//! ```text
//! original                 replacement                 mode
//! Obj.Get(int)             Hooks.Get(Obj self, int)    InstanceToStatic  0 → 1
//! Hooks.Get(Obj self, int) Obj.Get(int)                StaticToInstance  1 → 0
//! Obj.Get(int)             Other.Get(int)              Identity          0 → 0
//! ```

use crate::metadata::descriptor::{MethodDescriptor, Parameter};
use crate::utils::errors::{RedirectError, Result, SignatureRule, Side};
use std::fmt;
use tracing::debug;

/// Parameter-index offset between original and replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftMode {
    /// Same static-ness on both sides; indices map 1:1
    Identity,

    /// Instance original, static replacement taking the receiver first
    InstanceToStatic,

    /// Static original taking the receiver first, instance replacement
    StaticToInstance,
}

impl ShiftMode {
    pub fn between(original_is_static: bool, replacement_is_static: bool) -> Self {
        match (original_is_static, replacement_is_static) {
            (false, true) => ShiftMode::InstanceToStatic,
            (true, false) => ShiftMode::StaticToInstance,
            _ => ShiftMode::Identity,
        }
    }

    /// Offset added to an original index to reach the replacement index
    pub fn offset(self) -> isize {
        match self {
            ShiftMode::Identity => 0,
            ShiftMode::InstanceToStatic => 1,
            ShiftMode::StaticToInstance => -1,
        }
    }
}

impl fmt::Display for ShiftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftMode::Identity => f.write_str("identity"),
            ShiftMode::InstanceToStatic => f.write_str("instance-to-static"),
            ShiftMode::StaticToInstance => f.write_str("static-to-instance"),
        }
    }
}

/// Ordered `(original_index, replacement_index)` pairs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterMapping(Vec<(usize, usize)>);

impl ParameterMapping {
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.0
    }

    pub fn replacement_index(&self, original_index: usize) -> Option<usize> {
        self.0
            .iter()
            .find(|(o, _)| *o == original_index)
            .map(|(_, r)| *r)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|(o, r)| o == r)
    }
}

/// A validated original/replacement pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPlan {
    original: MethodDescriptor,
    replacement: MethodDescriptor,
    shift: ShiftMode,
    mapping: ParameterMapping,
}

impl MethodPlan {
    pub fn original(&self) -> &MethodDescriptor {
        &self.original
    }

    pub fn replacement(&self) -> &MethodDescriptor {
        &self.replacement
    }

    pub fn shift_mode(&self) -> ShiftMode {
        self.shift
    }

    pub fn mapping(&self) -> &ParameterMapping {
        &self.mapping
    }
}

/// Validate that `original` can be redirected to `replacement`
pub fn validate_method(
    original: &MethodDescriptor,
    replacement: &MethodDescriptor,
) -> Result<MethodPlan> {
    if original.is_abstract {
        return Err(RedirectError::AbstractMember {
            side: Side::Original,
            member: original.qualified_name(),
        });
    }
    if replacement.is_abstract {
        return Err(RedirectError::AbstractMember {
            side: Side::Replacement,
            member: replacement.qualified_name(),
        });
    }

    if original.kind != replacement.kind {
        return Err(RedirectError::KindMismatch(format!(
            "cannot redirect {:?} '{}' to {:?} '{}'",
            original.kind,
            original.qualified_name(),
            replacement.kind,
            replacement.qualified_name()
        )));
    }

    let original_return = original.effective_return_type();
    let replacement_return = replacement.effective_return_type();
    if original_return != replacement_return {
        return Err(RedirectError::incompatible(
            Side::Both,
            SignatureRule::ReturnType,
            format!(
                "original returns '{}', replacement returns '{}'",
                original_return, replacement_return
            ),
        ));
    }

    let shift = ShiftMode::between(original.is_static, replacement.is_static);
    let (original_skip, replacement_skip) = match shift {
        ShiftMode::InstanceToStatic => {
            check_receiver(Side::Replacement, replacement, original)?;
            (0, 1)
        }
        ShiftMode::StaticToInstance => {
            check_receiver(Side::Original, original, replacement)?;
            (1, 0)
        }
        ShiftMode::Identity => {
            if original.parameters.len() != replacement.parameters.len() {
                return Err(RedirectError::incompatible(
                    Side::Both,
                    SignatureRule::ParameterCount,
                    format!(
                        "original takes {} parameters, replacement takes {}",
                        original.parameters.len(),
                        replacement.parameters.len()
                    ),
                ));
            }
            (0, 0)
        }
    };

    let original_params = &original.parameters[original_skip..];
    let replacement_params = &replacement.parameters[replacement_skip..];
    let mut pairs = Vec::with_capacity(original_params.len());

    for (i, (o, r)) in original_params.iter().zip(replacement_params).enumerate() {
        let original_index = i + original_skip;
        check_parameter(original_index, o, r)?;
        pairs.push((original_index, i + replacement_skip));
    }

    debug!(
        "Validated {} -> {} ({})",
        original.qualified_name(),
        replacement.qualified_name(),
        shift
    );

    Ok(MethodPlan {
        original: original.clone(),
        replacement: replacement.clone(),
        shift,
        mapping: ParameterMapping(pairs),
    })
}

/// `static_side` must take an instance of `instance_side`'s declaring type
/// as its first parameter, followed by exactly the instance side's parameters
fn check_receiver(
    side: Side,
    static_side: &MethodDescriptor,
    instance_side: &MethodDescriptor,
) -> Result<()> {
    let receiver = static_side.parameters.first().ok_or_else(|| {
        RedirectError::incompatible(
            side,
            SignatureRule::ReceiverParameter,
            format!(
                "'{}' must take '{}' as its first parameter",
                static_side.qualified_name(),
                instance_side.declaring_type
            ),
        )
    })?;

    if receiver.ty != instance_side.declaring_type {
        return Err(RedirectError::incompatible(
            side,
            SignatureRule::ReceiverParameter,
            format!(
                "first parameter is '{}', expected '{}'",
                receiver.ty, instance_side.declaring_type
            ),
        ));
    }

    if static_side.parameters.len() != instance_side.parameters.len() + 1 {
        return Err(RedirectError::incompatible(
            side,
            SignatureRule::ParameterCount,
            format!(
                "'{}' takes {} parameters, expected {}",
                static_side.qualified_name(),
                static_side.parameters.len(),
                instance_side.parameters.len() + 1
            ),
        ));
    }

    Ok(())
}

fn check_parameter(index: usize, original: &Parameter, replacement: &Parameter) -> Result<()> {
    if original.ty != replacement.ty {
        return Err(RedirectError::incompatible(
            Side::Both,
            SignatureRule::ParameterType(index),
            format!("original is '{}', replacement is '{}'", original.ty, replacement.ty),
        ));
    }

    if original.is_in != replacement.is_in || original.is_out != replacement.is_out {
        return Err(RedirectError::incompatible(
            Side::Both,
            SignatureRule::ParameterFlags(index),
            format!(
                "original (in: {}, out: {}), replacement (in: {}, out: {})",
                original.is_in, original.is_out, replacement.is_in, replacement.is_out
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::descriptor::TypeRef;
    use proptest::prelude::*;

    fn get_instance() -> MethodDescriptor {
        MethodDescriptor::instance("Obj", "Get")
            .with_param("int")
            .returning("int")
    }

    fn get_static() -> MethodDescriptor {
        MethodDescriptor::static_method("Hooks", "Get")
            .with_param("Obj")
            .with_param("int")
            .returning("int")
    }

    fn assert_rule(result: Result<MethodPlan>, expected: SignatureRule) {
        match result {
            Err(RedirectError::IncompatibleSignature { rule, .. }) => assert_eq!(rule, expected),
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    #[test]
    fn test_instance_to_static() {
        let plan = validate_method(&get_instance(), &get_static()).unwrap();
        assert_eq!(plan.shift_mode(), ShiftMode::InstanceToStatic);
        assert_eq!(plan.shift_mode().offset(), 1);
        assert_eq!(plan.mapping().pairs(), &[(0, 1)]);
        assert_eq!(plan.mapping().replacement_index(0), Some(1));
    }

    #[test]
    fn test_static_to_instance() {
        let replacement = MethodDescriptor::instance("Obj", "Get2")
            .with_param("int")
            .returning("int");
        let plan = validate_method(&get_static(), &replacement).unwrap();
        assert_eq!(plan.shift_mode(), ShiftMode::StaticToInstance);
        assert_eq!(plan.mapping().pairs(), &[(1, 0)]);
    }

    #[test]
    fn test_static_to_instance_wrong_receiver() {
        let original = MethodDescriptor::static_method("Hooks", "Get")
            .with_param("Other")
            .with_param("int")
            .returning("int");
        let result = validate_method(&original, &get_instance());
        assert!(matches!(
            result,
            Err(RedirectError::IncompatibleSignature {
                side: Side::Original,
                rule: SignatureRule::ReceiverParameter,
                ..
            })
        ));
    }

    #[test]
    fn test_instance_to_static_missing_receiver() {
        let replacement = MethodDescriptor::static_method("Hooks", "Get").returning("int");
        assert_rule(
            validate_method(&get_instance(), &replacement),
            SignatureRule::ReceiverParameter,
        );
    }

    #[test]
    fn test_instance_to_static_count_mismatch() {
        let replacement = get_static().with_param("bool");
        assert_rule(
            validate_method(&get_instance(), &replacement),
            SignatureRule::ParameterCount,
        );
    }

    #[test]
    fn test_instance_pair_count_mismatch() {
        let replacement = MethodDescriptor::instance("Fake", "Get")
            .with_param("int")
            .with_param("int")
            .returning("int");
        match validate_method(&get_instance(), &replacement) {
            Err(RedirectError::IncompatibleSignature { side, rule, .. }) => {
                assert_eq!(side, Side::Both);
                assert_eq!(rule, SignatureRule::ParameterCount);
            }
            other => panic!("expected parameter count error, got {:?}", other),
        }
    }

    #[test]
    fn test_static_pair_count_mismatch() {
        let original = MethodDescriptor::static_method("A", "F").with_param("int").with_param("int");
        let replacement = MethodDescriptor::static_method("B", "F").with_param("int");
        assert_rule(
            validate_method(&original, &replacement),
            SignatureRule::ParameterCount,
        );

        let empty = MethodDescriptor::static_method("B", "F");
        assert_rule(validate_method(&empty, &replacement), SignatureRule::ParameterCount);
    }

    #[test]
    fn test_static_to_instance_count_mismatch() {
        let too_many = get_static().with_param("bool");
        match validate_method(&too_many, &get_instance()) {
            Err(RedirectError::IncompatibleSignature { side, rule, .. }) => {
                assert_eq!(side, Side::Original);
                assert_eq!(rule, SignatureRule::ParameterCount);
            }
            other => panic!("expected parameter count error, got {:?}", other),
        }

        let receiver_only = MethodDescriptor::static_method("Hooks", "Get")
            .with_param("Obj")
            .returning("int");
        assert_rule(
            validate_method(&receiver_only, &get_instance()),
            SignatureRule::ParameterCount,
        );
    }

    #[test]
    fn test_parameter_type_mismatch() {
        let original = MethodDescriptor::static_method("A", "F").with_param("int");
        let replacement = MethodDescriptor::static_method("B", "F").with_param("long");
        assert_rule(
            validate_method(&original, &replacement),
            SignatureRule::ParameterType(0),
        );
    }

    #[test]
    fn test_parameter_flags_mismatch() {
        let original = MethodDescriptor::static_method("A", "F").with_param(Parameter::new("int").output());
        let replacement = MethodDescriptor::static_method("B", "F").with_param("int");
        assert_rule(
            validate_method(&original, &replacement),
            SignatureRule::ParameterFlags(0),
        );

        let original = MethodDescriptor::static_method("A", "F").with_param(Parameter::new("int").input());
        let replacement = MethodDescriptor::static_method("B", "F").with_param(Parameter::new("int").output());
        assert_rule(
            validate_method(&original, &replacement),
            SignatureRule::ParameterFlags(0),
        );
    }

    #[test]
    fn test_return_type_mismatch() {
        let replacement = MethodDescriptor::instance("Other", "Get")
            .with_param("int")
            .returning("long");
        assert_rule(
            validate_method(&get_instance(), &replacement),
            SignatureRule::ReturnType,
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let ctor = MethodDescriptor::constructor("Obj");
        let method = MethodDescriptor::instance("Obj", "Create").returning("Obj");
        assert!(matches!(
            validate_method(&ctor, &method),
            Err(RedirectError::KindMismatch(_))
        ));
    }

    #[test]
    fn test_constructor_pair() {
        let original = MethodDescriptor::constructor("Obj").with_param("int");
        let replacement = MethodDescriptor::constructor("Obj").with_param("int");
        let plan = validate_method(&original, &replacement).unwrap();
        assert_eq!(plan.shift_mode(), ShiftMode::Identity);
        assert_eq!(plan.original().effective_return_type(), &TypeRef::new("Obj"));
    }

    #[test]
    fn test_abstract_checked_before_kind() {
        let original = MethodDescriptor::constructor("Obj");
        let replacement = MethodDescriptor::instance("Obj", "Get").abstract_member();
        assert!(matches!(
            validate_method(&original, &replacement),
            Err(RedirectError::AbstractMember {
                side: Side::Replacement,
                ..
            })
        ));
    }

    fn type_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["int", "long", "string", "bool", "Obj"]).prop_map(String::from)
    }

    fn params() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(type_name(), 0..6)
    }

    fn method(declaring: &str, is_static: bool, params: &[String]) -> MethodDescriptor {
        let mut method = if is_static {
            MethodDescriptor::static_method(declaring, "M")
        } else {
            MethodDescriptor::instance(declaring, "M")
        };
        for ty in params {
            method = method.with_param(ty.as_str());
        }
        method.returning("int")
    }

    proptest! {
        #[test]
        fn prop_identical_instance_pairs_map_identity(params in params()) {
            let original = method("Obj", false, &params);
            let replacement = method("Other", false, &params);
            let plan = validate_method(&original, &replacement).unwrap();
            prop_assert_eq!(plan.shift_mode(), ShiftMode::Identity);
            prop_assert!(plan.mapping().is_identity());
            prop_assert_eq!(plan.mapping().len(), params.len());
        }

        #[test]
        fn prop_instance_to_static_receiver(params in params(), receiver in type_name()) {
            let original = method("Obj", false, &params);
            let mut with_receiver = vec![receiver.clone()];
            with_receiver.extend(params.iter().cloned());
            let replacement = method("Hooks", true, &with_receiver);

            let result = validate_method(&original, &replacement);
            if receiver == "Obj" {
                let plan = result.unwrap();
                prop_assert_eq!(plan.shift_mode(), ShiftMode::InstanceToStatic);
                for (o, r) in plan.mapping().pairs() {
                    prop_assert_eq!(*r, *o + 1);
                }
            } else {
                let is_incompatible = matches!(
                    result,
                    Err(RedirectError::IncompatibleSignature { .. })
                );
                prop_assert!(is_incompatible);
            }
        }

        #[test]
        fn prop_abstract_always_rejected(
            original_params in params(),
            replacement_params in params(),
            original_static in any::<bool>(),
            replacement_static in any::<bool>(),
            abstract_original in any::<bool>(),
        ) {
            let mut original = method("Obj", original_static, &original_params);
            let mut replacement = method("Hooks", replacement_static, &replacement_params);
            if abstract_original {
                original.is_abstract = true;
            } else {
                replacement.is_abstract = true;
            }
            let is_abstract = matches!(
                validate_method(&original, &replacement),
                Err(RedirectError::AbstractMember { .. })
            );
            prop_assert!(is_abstract);
        }
    }
}
