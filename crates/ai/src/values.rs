//! Per-bot value registry.
//!
//! Values are registered under a name in one or more [`ValueContext`]s and
//! materialized on first lookup. A value being computed is checked out of
//! the registry for the duration of the call, so its calculator can query
//! other values; asking for a value that is already being computed (a
//! cycle) yields `None`.

use std::any::Any;
use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::env::BotEnv;
use crate::error::AiError;
use crate::named::{ContextObject, NamedObjectContext, NamedObjectContextList};
use crate::value::Value;

/// Type-erased view of a registered value.
pub trait UntypedValue: Send {
    fn update(&mut self);
    fn reset(&mut self);
    fn format(&self) -> Option<String>;
    fn save(&self) -> Option<String>;
    fn load(&mut self, text: &str) -> bool;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl ContextObject for dyn UntypedValue {
    fn update(&mut self) {
        UntypedValue::update(self);
    }

    fn reset(&mut self) {
        UntypedValue::reset(self);
    }
}

struct TypedSlot<T: 'static> {
    value: Box<dyn Value<Output = T>>,
}

impl<T: Clone + Send + 'static> UntypedValue for TypedSlot<T> {
    fn update(&mut self) {
        self.value.update();
    }

    fn reset(&mut self) {
        self.value.reset();
    }

    fn format(&self) -> Option<String> {
        self.value.format()
    }

    fn save(&self) -> Option<String> {
        self.value.save()
    }

    fn load(&mut self, text: &str) -> bool {
        self.value.load(text)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub type ValueContext = NamedObjectContext<dyn UntypedValue>;

/// Typed registration helpers for [`ValueContext`].
pub trait ValueRegistry {
    fn add_value<V, F>(&mut self, name: &str, creator: F) -> &mut Self
    where
        V: Value + 'static,
        F: Fn(&BotEnv, Option<&str>) -> V + Send + Sync + 'static;
}

impl ValueRegistry for ValueContext {
    fn add_value<V, F>(&mut self, name: &str, creator: F) -> &mut Self
    where
        V: Value + 'static,
        F: Fn(&BotEnv, Option<&str>) -> V + Send + Sync + 'static,
    {
        self.add_qualified(name, move |env, qualifier| {
            let value: Box<dyn Value<Output = V::Output>> = Box::new(creator(env, qualifier));
            Box::new(TypedSlot { value })
        })
    }
}

/// All values of one bot, plus the services they read from.
pub struct Values {
    env: BotEnv,
    contexts: NamedObjectContextList<dyn UntypedValue>,
}

impl Values {
    pub fn new(env: BotEnv) -> Self {
        Self {
            env,
            contexts: NamedObjectContextList::new(),
        }
    }

    pub fn add_context(&mut self, context: ValueContext) {
        self.contexts.add(context);
    }

    pub fn env(&self) -> &BotEnv {
        &self.env
    }

    /// Run `f` against the typed value registered as `name`.
    ///
    /// `None` when the name is unknown, the type does not match, or the
    /// value is already being computed further up the stack.
    pub fn with_value<T, R, F>(&mut self, name: &str, f: F) -> Option<R>
    where
        T: Clone + Send + 'static,
        F: FnOnce(&mut dyn Value<Output = T>, &mut Values) -> R,
    {
        let Some((index, mut object)) = self.contexts.take(name, &self.env) else {
            trace!(target: "ai::values", value = name, "value unavailable");
            return None;
        };

        let result = match object.as_any_mut().downcast_mut::<TypedSlot<T>>() {
            Some(slot) => Some(f(slot.value.as_mut(), self)),
            None => {
                warn!(
                    target: "ai::values",
                    value = name,
                    expected = std::any::type_name::<T>(),
                    "value requested with mismatched type"
                );
                None
            }
        };

        self.contexts.restore(index, name, object);
        result
    }

    pub fn get<T: Clone + Send + 'static>(&mut self, name: &str) -> Option<T> {
        self.with_value::<T, _, _>(name, |value, values| value.get(values))
    }

    pub fn lazy_get<T: Clone + Send + 'static>(&mut self, name: &str) -> Option<T> {
        self.with_value::<T, _, _>(name, |value, values| value.lazy_get(values))
    }

    /// In-place access to the freshly checked value.
    pub fn ref_get<T, R>(&mut self, name: &str, f: impl FnOnce(&mut T) -> R) -> Option<R>
    where
        T: Clone + Send + 'static,
    {
        self.with_value::<T, _, _>(name, |value, values| f(value.ref_get(values)))
    }

    /// Returns `false` if no value of that name and type exists.
    pub fn set<T: Clone + Send + 'static>(&mut self, name: &str, new_value: T) -> bool {
        self.with_value::<T, _, _>(name, |value, _| value.set(new_value))
            .is_some()
    }

    pub fn reset(&mut self, name: &str) {
        if let Some(value) = self.contexts.get(name, &self.env) {
            UntypedValue::reset(value);
        }
    }

    pub fn update_all(&mut self) {
        self.contexts.update();
    }

    pub fn reset_all(&mut self) {
        self.contexts.reset();
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
    }

    pub fn is_created(&self, name: &str) -> bool {
        self.contexts.get_created(name).is_some()
    }

    /// Names of values materialized so far.
    pub fn created(&self) -> BTreeSet<String> {
        self.contexts.created()
    }

    pub fn supports(&self) -> BTreeSet<String> {
        self.contexts.supports()
    }

    pub fn format(&self, name: &str) -> Option<String> {
        self.contexts.get_created(name)?.format()
    }

    /// `(name, text)` for every materialized value with a readable form.
    pub fn format_all(&self) -> Vec<(String, String)> {
        self.created()
            .into_iter()
            .filter_map(|name| {
                let text = self.format(&name)?;
                Some((name, text))
            })
            .collect()
    }

    /// `name>data` rows for every materialized, persistable value.
    pub fn save(&self) -> Vec<String> {
        self.created()
            .into_iter()
            .filter_map(|name| {
                let data = self.contexts.get_created(&name)?.save()?;
                Some(format!("{name}>{data}"))
            })
            .collect()
    }

    /// Apply one `name>data` row.
    pub fn load_row(&mut self, row: &str) -> crate::error::Result<()> {
        let parts: Vec<&str> = row.split('>').collect();
        let [name, data] = parts.as_slice() else {
            return Err(AiError::MalformedValueRow(row.to_string()));
        };

        let Some(value) = self.contexts.get(name, &self.env) else {
            return Ok(());
        };
        if value.load(data) {
            Ok(())
        } else {
            Err(AiError::ValueRejected((*name).to_string()))
        }
    }

    /// Apply persisted rows. Malformed or rejected rows are logged and skipped.
    pub fn load<S: AsRef<str>>(&mut self, rows: &[S]) {
        for row in rows {
            if let Err(error) = self.load_row(row.as_ref()) {
                debug!(target: "ai::values", %error, "skipping stored value row");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bot_world::{EmptyWorld, ManualClock, ObjectGuid};

    use super::*;
    use crate::value::{CalculatedValue, ManualSetValue, ValueCodec};

    fn registry() -> Values {
        let env = BotEnv::new(ObjectGuid::new(3), Arc::new(EmptyWorld))
            .with_clock(Arc::new(ManualClock::new(0)));
        let mut context = ValueContext::new();
        context
            .add_value("base", |_, _| ManualSetValue::new(4u32).with_codec(ValueCodec::text()))
            .add_value("double", |_, _| {
                CalculatedValue::new(0u32, 1, |values, _| {
                    values.get::<u32>("base").unwrap_or_default() * 2
                })
            })
            .add_value("loop", |_, _| {
                CalculatedValue::new(0u32, 1, |values, _| {
                    values.get::<u32>("loop").map_or(99, |v| v + 1)
                })
            })
            .add_value("scaled", |_, qualifier| {
                let factor: u32 = qualifier.and_then(|q| q.parse().ok()).unwrap_or(1);
                CalculatedValue::new(0u32, 1, move |values, _| {
                    values.get::<u32>("base").unwrap_or_default() * factor
                })
            });

        let mut values = Values::new(env);
        values.add_context(context);
        values
    }

    #[test]
    fn calculators_read_other_values() {
        let mut values = registry();
        assert_eq!(values.get::<u32>("double"), Some(8));
        assert!(values.set("base", 10u32));
        assert_eq!(values.get::<u32>("double"), Some(20));
    }

    #[test]
    fn cyclic_lookup_is_absent() {
        let mut values = registry();
        assert_eq!(values.get::<u32>("loop"), Some(99));
    }

    #[test]
    fn qualifier_reaches_creator() {
        let mut values = registry();
        assert_eq!(values.get::<u32>("scaled::3"), Some(12));
        assert_eq!(values.get::<u32>("scaled"), Some(4));
    }

    #[test]
    fn mismatched_type_and_unknown_name_are_absent() {
        let mut values = registry();
        assert_eq!(values.get::<String>("base"), None);
        assert_eq!(values.get::<u32>("nope"), None);
        assert!(!values.set("nope", 1u32));
    }

    #[test]
    fn listing_does_not_materialize() {
        let mut values = registry();
        assert!(values.created().is_empty());
        assert_eq!(values.supports().len(), 4);
        values.get::<u32>("base");
        assert_eq!(values.created(), BTreeSet::from(["base".to_string()]));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let mut values = registry();
        assert_eq!(
            values.load_row("no separator"),
            Err(AiError::MalformedValueRow("no separator".into()))
        );
        assert!(values.load_row("a>b>c").is_err());
        assert_eq!(
            values.load_row("base>x"),
            Err(AiError::ValueRejected("base".into()))
        );
        assert_eq!(values.load_row("unknown>1"), Ok(()));
    }

    #[test]
    fn ref_get_mutates_in_place() {
        let mut values = registry();
        values.ref_get::<u32, _>("base", |v| *v += 1);
        assert_eq!(values.get::<u32>("base"), Some(5));
    }
}
