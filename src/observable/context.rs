// src/observable/context.rs
//! Per-invocation payload delivered to observers

use crate::metadata::descriptor::MethodDescriptor;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// One intercepted invocation
///
/// Every observer of a call receives the same context, so a return value set
/// by one observer is visible to the next and to the intercepted caller.
#[derive(Debug)]
pub struct RedirectionContext {
    original: Arc<MethodDescriptor>,
    target: Option<Value>,
    arguments: Vec<Value>,
    return_value: Mutex<Option<Value>>,
}

impl RedirectionContext {
    pub fn new(original: Arc<MethodDescriptor>, target: Option<Value>, arguments: Vec<Value>) -> Self {
        Self {
            original,
            target,
            arguments,
            return_value: Mutex::new(None),
        }
    }

    /// The intercepted method
    pub fn original(&self) -> &MethodDescriptor {
        &self.original
    }

    /// Receiver of an instance call
    pub fn target(&self) -> Option<&Value> {
        self.target.as_ref()
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    pub fn return_value(&self) -> Option<Value> {
        self.return_value.lock().clone()
    }

    pub fn set_return_value(&self, value: Value) {
        *self.return_value.lock() = Some(value);
    }

    pub fn take_return_value(&self) -> Option<Value> {
        self.return_value.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_return_value() {
        let method = Arc::new(MethodDescriptor::instance("Obj", "Get").returning("int"));
        let context = RedirectionContext::new(method, Some(json!("obj")), vec![json!(1)]);

        assert_eq!(context.target(), Some(&json!("obj")));
        assert_eq!(context.argument(0), Some(&json!(1)));
        assert!(context.argument(1).is_none());
        assert!(context.return_value().is_none());

        context.set_return_value(json!(5));
        assert_eq!(context.return_value(), Some(json!(5)));
        assert_eq!(context.take_return_value(), Some(json!(5)));
        assert!(context.return_value().is_none());
    }
}
