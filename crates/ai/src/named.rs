//! Name-keyed registries with lazy creation and memoization.
//!
//! Every behavior in the engine (strategies, actions, triggers, values) is
//! looked up by string name. A name may carry a qualifier after `::`
//! (`"health::self target"`); the qualifier is handed to the creator so one
//! registration can serve many parameterisations.
//!
//! Unknown names are not errors. A lookup that finds no creator yields
//! `None` and callers treat the capability as absent.

use std::collections::{BTreeSet, HashMap};

use crate::env::BotEnv;

pub const QUALIFIER_SEPARATOR: &str = "::";

/// A name split into its registered base and optional qualifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub base: &'a str,
    pub qualifier: Option<&'a str>,
}

/// Split at the first `::`.
pub fn split_qualifier(name: &str) -> QualifiedName<'_> {
    match name.split_once(QUALIFIER_SEPARATOR) {
        Some((base, qualifier)) => QualifiedName {
            base,
            qualifier: Some(qualifier),
        },
        None => QualifiedName {
            base: name,
            qualifier: None,
        },
    }
}

/// Build `base::qualifier`.
pub fn qualify(base: &str, qualifier: &str) -> String {
    format!("{base}{QUALIFIER_SEPARATOR}{qualifier}")
}

/// Join several qualifiers into one (space separated).
pub fn multi_qualify<S: AsRef<str>>(qualifiers: &[S]) -> String {
    qualifiers
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn multi_qualifiers(qualifier: &str) -> Vec<&str> {
    qualifier.split_whitespace().collect()
}

/// Numeric qualifier at `pos`, if present and parseable.
pub fn multi_qualifier(qualifier: &str, pos: usize) -> Option<i32> {
    multi_qualifiers(qualifier).get(pos)?.parse().ok()
}

/// Hooks every memoized object exposes to its owning context.
pub trait ContextObject {
    fn update(&mut self) {}
    fn reset(&mut self) {}
}

type Creator<T> = Box<dyn Fn(&BotEnv, Option<&str>) -> Box<T> + Send + Sync>;

/// Stateless map from base name to creator.
pub struct NamedObjectFactory<T: ?Sized> {
    creators: HashMap<String, Creator<T>>,
}

impl<T: ?Sized> Default for NamedObjectFactory<T> {
    fn default() -> Self {
        Self {
            creators: HashMap::new(),
        }
    }
}

impl<T: ?Sized> NamedObjectFactory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a creator that ignores any qualifier.
    pub fn add<F>(&mut self, name: &str, creator: F) -> &mut Self
    where
        F: Fn(&BotEnv) -> Box<T> + Send + Sync + 'static,
    {
        self.creators
            .insert(name.to_string(), Box::new(move |env, _| creator(env)));
        self
    }

    /// Register a creator that receives the `::` suffix of the requested name.
    pub fn add_qualified<F>(&mut self, name: &str, creator: F) -> &mut Self
    where
        F: Fn(&BotEnv, Option<&str>) -> Box<T> + Send + Sync + 'static,
    {
        self.creators.insert(name.to_string(), Box::new(creator));
        self
    }

    pub fn create(&self, name: &str, env: &BotEnv) -> Option<Box<T>> {
        let QualifiedName { base, qualifier } = split_qualifier(name);
        let creator = self.creators.get(base)?;
        Some(creator(env, qualifier))
    }

    pub fn supports(&self) -> BTreeSet<String> {
        self.creators.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.creators.contains_key(split_qualifier(name).base)
    }
}

enum Slot<T: ?Sized> {
    /// Lookup ran and found no creator.
    Missing,
    Ready(Box<T>),
    /// Temporarily checked out via [`NamedObjectContext::take`].
    Busy,
}

/// Outcome of checking an object out of a context.
pub enum Taken<T: ?Sized> {
    Ready(Box<T>),
    Missing,
    /// Already checked out further up the call stack.
    Busy,
}

/// A factory plus a per-name memo of what it produced.
///
/// Once a name is requested the result (including "no such object") is
/// kept until [`clear`](Self::clear). Repeat lookups return the same
/// instance.
pub struct NamedObjectContext<T: ?Sized> {
    factory: NamedObjectFactory<T>,
    created: HashMap<String, Slot<T>>,
    supports_siblings: bool,
}

impl<T: ?Sized + ContextObject> NamedObjectContext<T> {
    pub fn new() -> Self {
        Self {
            factory: NamedObjectFactory::new(),
            created: HashMap::new(),
            supports_siblings: false,
        }
    }

    /// A context whose names are mutually exclusive alternatives
    /// (adding one strategy from it evicts the others).
    pub fn with_siblings() -> Self {
        Self {
            supports_siblings: true,
            ..Self::new()
        }
    }

    pub fn add<F>(&mut self, name: &str, creator: F) -> &mut Self
    where
        F: Fn(&BotEnv) -> Box<T> + Send + Sync + 'static,
    {
        self.factory.add(name, creator);
        self
    }

    pub fn add_qualified<F>(&mut self, name: &str, creator: F) -> &mut Self
    where
        F: Fn(&BotEnv, Option<&str>) -> Box<T> + Send + Sync + 'static,
    {
        self.factory.add_qualified(name, creator);
        self
    }

    fn ensure(&mut self, name: &str, env: &BotEnv) {
        if !self.created.contains_key(name) {
            let slot = match self.factory.create(name, env) {
                Some(object) => Slot::Ready(object),
                None => Slot::Missing,
            };
            self.created.insert(name.to_string(), slot);
        }
    }

    /// Fetch the memoized object for `name`, creating it on first use.
    pub fn create(&mut self, name: &str, env: &BotEnv) -> Option<&mut T> {
        self.ensure(name, env);
        match self.created.get_mut(name)? {
            Slot::Ready(object) => Some(object.as_mut()),
            Slot::Missing | Slot::Busy => None,
        }
    }

    /// Check the object out so it can be used alongside `&mut` access to
    /// the context that owns it. Must be paired with [`restore`](Self::restore).
    pub fn take(&mut self, name: &str, env: &BotEnv) -> Taken<T> {
        self.ensure(name, env);
        let Some(slot) = self.created.get_mut(name) else {
            return Taken::Missing;
        };
        match std::mem::replace(slot, Slot::Busy) {
            Slot::Ready(object) => Taken::Ready(object),
            Slot::Missing => {
                *slot = Slot::Missing;
                Taken::Missing
            }
            Slot::Busy => Taken::Busy,
        }
    }

    pub fn restore(&mut self, name: &str, object: Box<T>) {
        self.created.insert(name.to_string(), Slot::Ready(object));
    }

    pub fn get_created(&self, name: &str) -> Option<&T> {
        match self.created.get(name)? {
            Slot::Ready(object) => Some(object.as_ref()),
            Slot::Missing | Slot::Busy => None,
        }
    }

    pub fn is_created(&self, name: &str) -> bool {
        matches!(self.created.get(name), Some(Slot::Ready(_) | Slot::Busy))
    }

    /// Names instantiated so far. Listing never materializes anything.
    pub fn created(&self) -> BTreeSet<String> {
        self.created
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_) | Slot::Busy))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn supports(&self) -> BTreeSet<String> {
        self.factory.supports()
    }

    pub fn supports_siblings(&self) -> bool {
        self.supports_siblings
    }

    pub fn clear(&mut self) {
        self.created.clear();
    }

    pub fn update(&mut self) {
        for slot in self.created.values_mut() {
            if let Slot::Ready(object) = slot {
                object.update();
            }
        }
    }

    pub fn reset(&mut self) {
        for slot in self.created.values_mut() {
            if let Slot::Ready(object) = slot {
                object.reset();
            }
        }
    }
}

impl<T: ?Sized + ContextObject> Default for NamedObjectContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered stack of contexts; the first one that can build a name wins.
///
/// Deployments compose core and extension registries by adding contexts
/// rather than by subclassing.
pub struct NamedObjectContextList<T: ?Sized> {
    contexts: Vec<NamedObjectContext<T>>,
}

impl<T: ?Sized + ContextObject> NamedObjectContextList<T> {
    pub fn new() -> Self {
        Self {
            contexts: Vec::new(),
        }
    }

    pub fn add(&mut self, context: NamedObjectContext<T>) {
        self.contexts.push(context);
    }

    pub fn get(&mut self, name: &str, env: &BotEnv) -> Option<&mut T> {
        let index = (0..self.contexts.len())
            .find(|&index| self.contexts[index].create(name, env).is_some())?;
        self.contexts[index].create(name, env)
    }

    /// Check out `name` from whichever context owns it.
    ///
    /// Returns the owning context index for [`restore`](Self::restore).
    /// A name already checked out (a cyclic lookup) comes back as `None`.
    pub fn take(&mut self, name: &str, env: &BotEnv) -> Option<(usize, Box<T>)> {
        for (index, context) in self.contexts.iter_mut().enumerate() {
            match context.take(name, env) {
                Taken::Ready(object) => return Some((index, object)),
                Taken::Busy => return None,
                Taken::Missing => continue,
            }
        }
        None
    }

    pub fn restore(&mut self, index: usize, name: &str, object: Box<T>) {
        if let Some(context) = self.contexts.get_mut(index) {
            context.restore(name, object);
        }
    }

    pub fn get_created(&self, name: &str) -> Option<&T> {
        self.contexts
            .iter()
            .find_map(|context| context.get_created(name))
    }

    /// All other names of the first sibling-aware context that knows `name`.
    pub fn siblings(&self, name: &str) -> BTreeSet<String> {
        for context in &self.contexts {
            if !context.supports_siblings() {
                continue;
            }

            let mut supported = context.supports();
            if supported.remove(name) {
                return supported;
            }
        }
        BTreeSet::new()
    }

    pub fn supports(&self) -> BTreeSet<String> {
        self.contexts
            .iter()
            .flat_map(|context| context.supports())
            .collect()
    }

    pub fn created(&self) -> BTreeSet<String> {
        self.contexts
            .iter()
            .flat_map(|context| context.created())
            .collect()
    }

    pub fn update(&mut self) {
        for context in &mut self.contexts {
            context.update();
        }
    }

    pub fn reset(&mut self) {
        for context in &mut self.contexts {
            context.reset();
        }
    }

    pub fn clear(&mut self) {
        for context in &mut self.contexts {
            context.clear();
        }
    }
}

impl<T: ?Sized + ContextObject> Default for NamedObjectContextList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-memoizing factory chain. Factories added later are consulted first.
pub struct NamedObjectFactoryList<T: ?Sized> {
    factories: Vec<NamedObjectFactory<T>>,
}

impl<T: ?Sized> NamedObjectFactoryList<T> {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    pub fn add(&mut self, factory: NamedObjectFactory<T>) {
        self.factories.insert(0, factory);
    }

    pub fn create(&self, name: &str, env: &BotEnv) -> Option<Box<T>> {
        self.factories
            .iter()
            .find_map(|factory| factory.create(name, env))
    }
}

impl<T: ?Sized> Default for NamedObjectFactoryList<T> {
    fn default() -> Self {
        Self::new()
    }
}
