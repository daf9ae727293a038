// src/redirection/redirector.rs
//! Validated construction of redirections
//!
//! [`Redirector`] is the only way to obtain a redirection: every entry point
//! validates first and fails without touching the engine if the members are
//! incompatible.

use crate::engine::{EngineHandle, InterceptionEngine};
use crate::metadata::descriptor::{EventDescriptor, MemberDescriptor, MethodDescriptor, PropertyDescriptor};
use crate::metadata::expression::MemberExpression;
use crate::metadata::provider::MetadataProvider;
use crate::observable::observable_redirection::ObservableRedirection;
use crate::observable::registry::RedirectionRegistry;
use crate::redirection::accessor::{EventRedirection, PropertyRedirection};
use crate::redirection::lifecycle::Lifecycle;
use crate::redirection::method::MethodRedirection;
use crate::redirection::Redirection;
use crate::utils::errors::{RedirectError, Result, Side};
use crate::validation::accessor::{validate_event, validate_property, EventPlan, PropertyPlan};
use crate::validation::expression::{validate_expression, validate_member, RedirectionPlan};
use crate::validation::method::{validate_method, MethodPlan};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Redirector configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectorConfig {
    /// Start redirections as soon as they are built
    pub auto_start: bool,
}

/// Factory for validated redirections
pub struct Redirector {
    engine: Arc<dyn InterceptionEngine>,
    registry: Arc<RedirectionRegistry>,
    config: RedirectorConfig,
}

impl Redirector {
    /// Create a redirector sharing the engine's dispatch registry
    pub fn new(engine: Arc<dyn InterceptionEngine>) -> Self {
        let registry = engine.registry();
        Self {
            engine,
            registry,
            config: RedirectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RedirectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<RedirectionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RedirectorConfig {
        &self.config
    }

    /// Redirect a method or constructor
    pub fn redirect_method(
        &self,
        original: &MethodDescriptor,
        replacement: &MethodDescriptor,
    ) -> Result<MethodRedirection> {
        self.build_method(validate_method(original, replacement)?)
    }

    /// Redirect every accessor of a property
    pub fn redirect_property(
        &self,
        original: &PropertyDescriptor,
        replacement: &PropertyDescriptor,
    ) -> Result<PropertyRedirection> {
        self.build_property(validate_property(original, replacement)?)
    }

    /// Redirect every accessor of an event
    pub fn redirect_event(
        &self,
        original: &EventDescriptor,
        replacement: &EventDescriptor,
    ) -> Result<EventRedirection> {
        self.build_event(validate_event(original, replacement)?)
    }

    /// Redirect any member to a member of the same kind
    pub fn redirect(&self, original: &MemberDescriptor, replacement: &MemberDescriptor) -> Result<Redirection> {
        self.build(validate_member(original, replacement)?)
    }

    /// Redirect the members two resolved expressions refer to
    pub fn redirect_expression(
        &self,
        original: &MemberExpression,
        replacement: &MemberExpression,
    ) -> Result<Redirection> {
        self.build(validate_expression(original, replacement)?)
    }

    /// Redirect members looked up by path
    pub fn redirect_path(
        &self,
        provider: &dyn MetadataProvider,
        original: &str,
        replacement: &str,
    ) -> Result<Redirection> {
        let original_member = provider
            .resolve(original)
            .ok_or_else(|| RedirectError::NullArgument(format!("original member '{}'", original)))?;
        let replacement_member = provider
            .resolve(replacement)
            .ok_or_else(|| RedirectError::NullArgument(format!("replacement member '{}'", replacement)))?;

        self.redirect(&original_member, &replacement_member)
    }

    /// Splice `original` onto a fresh observable redirection
    ///
    /// The returned redirection stays stopped until its first subscriber.
    pub fn observe(&self, original: &MethodDescriptor) -> Result<ObservableRedirection> {
        if original.is_abstract {
            return Err(RedirectError::AbstractMember {
                side: Side::Original,
                member: original.qualified_name(),
            });
        }

        let key = self.registry.next_key();

        // The dispatch stub shares the original's signature exactly
        let stub = MethodDescriptor {
            name: format!("<observe{}>{}", key, original.name),
            ..original.clone()
        };
        let plan = validate_method(original, &stub)?;
        let handle = self.engine.prepare_dispatch(original, key)?;

        let observable = ObservableRedirection::new(
            Arc::clone(&self.registry),
            key,
            MethodRedirection::new(plan, handle),
        )?;

        info!("Observing {} under {}", original.qualified_name(), key);
        Ok(observable)
    }

    fn build(&self, plan: RedirectionPlan) -> Result<Redirection> {
        match plan {
            RedirectionPlan::Method(plan) => self.build_method(plan).map(Redirection::Method),
            RedirectionPlan::Property(plan) => self.build_property(plan).map(Redirection::Property),
            RedirectionPlan::Event(plan) => self.build_event(plan).map(Redirection::Event),
        }
    }

    fn build_method(&self, plan: MethodPlan) -> Result<MethodRedirection> {
        let handle = self.engine.prepare_method(&plan)?;
        let redirection = MethodRedirection::new(plan, handle);
        self.auto_start(&redirection)?;
        Ok(redirection)
    }

    fn build_property(&self, plan: PropertyPlan) -> Result<PropertyRedirection> {
        let handles = self.prepare_accessors([plan.getter(), plan.setter()])?;
        let redirection = PropertyRedirection::new(plan, handles);
        self.auto_start(&redirection)?;
        Ok(redirection)
    }

    fn build_event(&self, plan: EventPlan) -> Result<EventRedirection> {
        let handles = self.prepare_accessors([plan.add(), plan.remove(), plan.raise()])?;
        let redirection = EventRedirection::new(plan, handles);
        self.auto_start(&redirection)?;
        Ok(redirection)
    }

    fn prepare_accessors<const N: usize>(
        &self,
        accessors: [Option<&MethodPlan>; N],
    ) -> Result<Vec<Box<dyn EngineHandle>>> {
        accessors
            .into_iter()
            .flatten()
            .map(|plan| self.engine.prepare_method(plan))
            .collect()
    }

    fn auto_start(&self, redirection: &impl Lifecycle) -> Result<()> {
        if self.config.auto_start {
            redirection.start()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InMemoryEngine;
    use crate::metadata::descriptor::Parameter;
    use crate::metadata::expression::AccessTarget;
    use crate::metadata::provider::MetadataCatalog;
    use crate::observable::context::RedirectionContext;
    use crate::redirection::lifecycle::RedirectionState;
    use crate::validation::method::ShiftMode;
    use serde_json::json;

    fn setup() -> (InMemoryEngine, Redirector) {
        let registry = Arc::new(RedirectionRegistry::new());
        let engine = InMemoryEngine::new(Arc::clone(&registry));
        let redirector = Redirector::new(Arc::new(engine.clone()));
        (engine, redirector)
    }

    fn get_instance() -> MethodDescriptor {
        MethodDescriptor::instance("Obj", "Get").with_param("int").returning("int")
    }

    fn get_static() -> MethodDescriptor {
        MethodDescriptor::static_method("Hooks", "Get")
            .with_param("Obj")
            .with_param("int")
            .returning("int")
    }

    #[test]
    fn test_redirect_instance_to_static() {
        let (engine, redirector) = setup();
        let original = get_instance();
        let replacement = get_static();
        engine.define(&original, |_, args| Ok(args[0].clone()));
        engine.define(&replacement, |_, args| Ok(json!(args[1].as_i64().unwrap_or(0) + 100)));

        let redirection = redirector.redirect_method(&original, &replacement).unwrap();
        assert_eq!(redirection.shift_mode(), ShiftMode::InstanceToStatic);
        assert_eq!(redirection.mapping().pairs(), &[(0, 1)]);
        assert_eq!(redirection.state(), RedirectionState::Stopped);
        assert_eq!(engine.call(&original, Some(json!("o")), vec![json!(1)]).unwrap(), json!(1));

        redirection.start().unwrap();
        assert!(redirection.is_redirecting());
        assert_eq!(engine.call(&original, Some(json!("o")), vec![json!(1)]).unwrap(), json!(101));
        assert_eq!(redirection.invoke_original(Some(&json!("o")), &[json!(1)]).unwrap(), json!(1));

        redirection.stop().unwrap();
        assert_eq!(engine.call(&original, Some(json!("o")), vec![json!(1)]).unwrap(), json!(1));
    }

    #[test]
    fn test_start_twice_single_activation() {
        let (engine, redirector) = setup();
        let redirection = redirector.redirect_method(&get_instance(), &get_static()).unwrap();

        redirection.start().unwrap();
        redirection.start().unwrap();
        redirection.stop().unwrap();
        redirection.stop().unwrap();

        let stats = engine.stats();
        assert_eq!(stats.activations, 1);
        assert_eq!(stats.deactivations, 1);
    }

    #[test]
    fn test_validation_failure_prepares_nothing() {
        let (engine, redirector) = setup();
        let original = MethodDescriptor::static_method("A", "F").with_param("int");
        let replacement = MethodDescriptor::static_method("B", "F").with_param("long");

        let err = redirector.redirect_method(&original, &replacement).unwrap_err();
        assert!(matches!(err, RedirectError::IncompatibleSignature { .. }));
        assert_eq!(engine.stats().prepared, 0);
    }

    #[test]
    fn test_dispose_releases() {
        let (engine, redirector) = setup();
        let redirection = redirector.redirect_method(&get_instance(), &get_static()).unwrap();
        redirection.start().unwrap();
        redirection.dispose().unwrap();
        redirection.dispose().unwrap();

        assert_eq!(redirection.state(), RedirectionState::Disposed);
        assert!(!engine.is_spliced(&get_instance()));
        assert_eq!(engine.stats().releases, 1);
        assert!(redirection.start().is_err());
    }

    #[test]
    fn test_auto_start() {
        let (engine, redirector) = setup();
        let redirector = redirector.with_config(RedirectorConfig { auto_start: true });
        let redirection = redirector.redirect_method(&get_instance(), &get_static()).unwrap();
        assert!(redirection.is_redirecting());
        assert!(engine.is_spliced(&get_instance()));
    }

    #[test]
    fn test_redirect_property() {
        let (engine, redirector) = setup();
        let original = PropertyDescriptor::new("Obj", "Count", "int")
            .with_getter(false)
            .with_setter(false);
        let replacement = PropertyDescriptor::new("Fake", "Count", "int")
            .with_getter(false)
            .with_setter(false);

        let redirection = redirector.redirect_property(&original, &replacement).unwrap();
        assert_eq!(engine.stats().prepared, 2);

        redirection.start().unwrap();
        assert!(engine.is_spliced(original.getter.as_ref().unwrap()));
        assert!(engine.is_spliced(original.setter.as_ref().unwrap()));

        redirection.stop().unwrap();
        assert!(!engine.is_spliced(original.getter.as_ref().unwrap()));
    }

    #[test]
    fn test_redirect_event() {
        let (engine, redirector) = setup();
        let original = EventDescriptor::new("Obj", "Changed", "EventHandler").with_add_remove(true);
        let replacement = EventDescriptor::new("Fake", "Changed", "EventHandler").with_add_remove(true);

        let redirection = redirector.redirect_event(&original, &replacement).unwrap();
        redirection.start().unwrap();
        assert!(engine.is_spliced(original.add.as_ref().unwrap()));
        assert!(engine.is_spliced(original.remove.as_ref().unwrap()));
        redirection.dispose().unwrap();
        assert_eq!(engine.stats().releases, 2);
    }

    #[test]
    fn test_redirect_member_kind_mismatch() {
        let (_, redirector) = setup();
        let method = MemberDescriptor::Method(get_instance());
        let property = MemberDescriptor::Property(
            PropertyDescriptor::new("Obj", "Count", "int").with_getter(false),
        );
        assert!(matches!(
            redirector.redirect(&method, &property),
            Err(RedirectError::KindMismatch(_))
        ));
    }

    #[test]
    fn test_redirect_expression() {
        let (_, redirector) = setup();
        let original = MemberExpression::call(get_instance());
        let replacement = MemberExpression::call(get_static());
        let redirection = redirector.redirect_expression(&original, &replacement).unwrap();
        assert!(redirection.as_method().is_some());
        assert_eq!(redirection.kind_name(), "method");

        let field = MemberExpression::MemberAccess(AccessTarget::Field {
            name: "value".to_string(),
        });
        assert!(matches!(
            redirector.redirect_expression(&field, &original),
            Err(RedirectError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_redirect_path_missing() {
        let (_, redirector) = setup();
        let catalog = MetadataCatalog::new()
            .with_member("Obj::Get", MemberDescriptor::Method(get_instance()))
            .with_member("Hooks::Get", MemberDescriptor::Method(get_static()));

        assert!(redirector.redirect_path(&catalog, "Obj::Get", "Hooks::Get").is_ok());
        assert!(matches!(
            redirector.redirect_path(&catalog, "Obj::Get", "Hooks::Missing"),
            Err(RedirectError::NullArgument(_))
        ));
    }

    #[test]
    fn test_redirect_out_parameter_flags() {
        let (_, redirector) = setup();
        let original = MethodDescriptor::static_method("A", "TryParse")
            .with_param("string")
            .with_param(Parameter::new("int").output())
            .returning("bool");
        let replacement = MethodDescriptor::static_method("B", "TryParse")
            .with_param("string")
            .with_param(Parameter::new("int").output())
            .returning("bool");
        assert!(redirector.redirect_method(&original, &replacement).is_ok());
    }

    #[test]
    fn test_observe_dispatches_through_engine_registry() {
        let engine = InMemoryEngine::new(Arc::new(RedirectionRegistry::new()));
        let redirector = Redirector::new(Arc::new(engine.clone()));
        assert!(Arc::ptr_eq(redirector.registry(), &engine.registry()));
        assert!(!Arc::ptr_eq(redirector.registry(), &RedirectionRegistry::global()));

        let method = get_instance();
        engine.define(&method, |_, args| Ok(args[0].clone()));
        let observable = redirector.observe(&method).unwrap();
        let _subscription = observable
            .subscribe(|ctx: &RedirectionContext| -> Result<()> {
                ctx.set_return_value(json!("observed"));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            engine.call(&method, Some(json!("o")), vec![json!(1)]).unwrap(),
            json!("observed")
        );
    }

    #[test]
    fn test_default_engine_uses_global_registry() {
        let engine = InMemoryEngine::default();
        let redirector = Redirector::new(Arc::new(engine.clone()));
        assert!(Arc::ptr_eq(redirector.registry(), &RedirectionRegistry::global()));

        let method = MethodDescriptor::instance("GlobalObj", "Get").with_param("int").returning("int");
        let observable = redirector.observe(&method).unwrap();
        assert!(RedirectionRegistry::global().contains(observable.key()));

        let _subscription = observable
            .subscribe(|ctx: &RedirectionContext| -> Result<()> {
                ctx.set_return_value(json!(7));
                Ok(())
            })
            .unwrap();
        assert_eq!(engine.call(&method, None, vec![json!(1)]).unwrap(), json!(7));
    }

    #[test]
    fn test_observe_abstract_rejected() {
        let (_, redirector) = setup();
        let method = get_instance().abstract_member();
        assert!(matches!(
            redirector.observe(&method),
            Err(RedirectError::AbstractMember { .. })
        ));
    }
}
