//! Structured reporting of what a run did.
//!
//! Values are collected through a thread local reporter into one JSON object
//! which is printed to stdout when the `ReportingGuard` returned by `enable_reporting` is dropped.
//! Nested objects and collections are created through RAII guards, so the structure of the
//! output mirrors the structure of the program (one item per rendering pass and so on).
//! Without an active reporter all reporting calls are no-ops, which is what tests rely on.

use crate::built_info;
use serde_json::{Map, Value};
use std::{cell::RefCell, marker::PhantomData, mem::swap};

pub use serde_json::json;

#[derive(Debug)]
enum ContextStackItem {
    Key(String),
    Collection(Vec<Value>),
    Object(Map<String, Value>),
}

#[derive(Debug)]
enum CurrentReportingContext {
    Collection(Vec<Value>),
    Object(Map<String, Value>),
}

#[derive(Debug)]
struct Reporter {
    current: CurrentReportingContext,
    context_stack: Vec<ContextStackItem>,
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter {
            current: CurrentReportingContext::Object(Map::new()),
            context_stack: Vec::new(),
        }
    }
}

impl Reporter {
    fn create_object_under_key(&mut self, key: String) {
        match &mut self.current {
            CurrentReportingContext::Object(object) => {
                let mut tmp = Map::new();
                swap(&mut tmp, object);
                self.context_stack.push(ContextStackItem::Object(tmp));
                self.context_stack.push(ContextStackItem::Key(key));
            }
            CurrentReportingContext::Collection(_) => panic!("Cannot create object at key in collection"),
        }
    }

    fn create_collection_under_key(&mut self, key: String) {
        self.create_object_under_key(key);
        self.current = CurrentReportingContext::Collection(Vec::new());
    }

    fn create_collection_item(&mut self) {
        match &mut self.current {
            CurrentReportingContext::Object(_) => panic!("Cannot create collection item in object"),
            CurrentReportingContext::Collection(collection) => {
                let mut tmp = Vec::new();
                swap(&mut tmp, collection);
                self.context_stack.push(ContextStackItem::Collection(tmp));
                self.current = CurrentReportingContext::Object(Map::new());
            }
        }
    }

    fn report(&mut self, key: String, val: Value) {
        match &mut self.current {
            CurrentReportingContext::Object(object) => {
                let prev = object.insert(key, val);
                debug_assert!(prev.is_none());
            }
            CurrentReportingContext::Collection(_) => panic!("Cannot report value on collection"),
        }
    }

    fn pop_context(&mut self) {
        let mut finished = CurrentReportingContext::Object(Map::new());
        swap(&mut self.current, &mut finished);
        let finished = match finished {
            CurrentReportingContext::Object(object) => Value::Object(object),
            CurrentReportingContext::Collection(collection) => Value::Array(collection),
        };

        match self.context_stack.pop().expect("tried to pop from empty context") {
            ContextStackItem::Key(key) => match self.context_stack.pop() {
                Some(ContextStackItem::Object(mut parent)) => {
                    parent.insert(key, finished);
                    self.current = CurrentReportingContext::Object(parent);
                }
                _ => panic!("Inconsistent context stack"),
            },
            ContextStackItem::Collection(mut collection) => {
                collection.push(finished);
                self.current = CurrentReportingContext::Collection(collection);
            }
            ContextStackItem::Object(_) => panic!("Inconsistent context stack"),
        }
    }
}

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = RefCell::new(None);
}

fn with_reporter(f: impl FnOnce(&mut Reporter)) {
    REPORTER.with(|reporter| {
        if let Some(r) = reporter.borrow_mut().as_mut() {
            f(r)
        }
    });
}

#[must_use]
pub struct ContextGuard(());

impl Drop for ContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::pop_context);
    }
}

/// Report everything until the guard is dropped into a nested object under `key`.
pub fn push_context(key: String) -> ContextGuard {
    with_reporter(|r| r.create_object_under_key(key));
    ContextGuard(())
}

#[must_use]
pub struct CollectionContextGuard(());

impl Drop for CollectionContextGuard {
    fn drop(&mut self) {
        with_reporter(Reporter::pop_context);
    }
}

/// Create a collection under `key`. Items are added through `push_collection_item`.
pub fn push_collection_context(key: String) -> CollectionContextGuard {
    with_reporter(|r| r.create_collection_under_key(key));
    CollectionContextGuard(())
}

impl CollectionContextGuard {
    pub fn push_collection_item(&mut self) -> CollectionItemContextGuard<'_> {
        with_reporter(Reporter::create_collection_item);
        CollectionItemContextGuard(PhantomData)
    }
}

#[must_use]
pub struct CollectionItemContextGuard<'a>(PhantomData<&'a mut CollectionContextGuard>);

impl<'a> Drop for CollectionItemContextGuard<'a> {
    fn drop(&mut self) {
        with_reporter(Reporter::pop_context);
    }
}

pub fn report(key: String, val: Value) {
    with_reporter(|r| r.report(key, val));
}

#[must_use]
pub struct ReportingGuard(());

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(r) = reporter.borrow_mut().take() {
                debug_assert!(r.context_stack.is_empty());
                if let CurrentReportingContext::Object(object) = r.current {
                    println!("{}", Value::Object(object));
                }
            }
        });
    }
}

#[macro_export]
macro_rules! report {
    ($k:expr, $($json:tt)+) => { report($k.to_string(), json!($($json)+)) };
}

/// Activate reporting for the current thread. Build information and the invocation are reported right away.
pub fn enable_reporting(program: &str) -> ReportingGuard {
    REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));

    report!("build_target", built_info::TARGET);
    report!("build_profile", built_info::PROFILE);
    report!("feature_flags", built_info::FEATURES_STR);
    report!("build_with_rustc", built_info::RUSTC_VERSION);
    report!("package_version", built_info::PKG_VERSION);

    report!("program", program);
    let start_time = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc2822)
        .unwrap_or_default();
    report!("start_time", start_time);
    report!("args", std::env::args().collect::<Vec<String>>());

    ReportingGuard(())
}

pub mod benchmark;
pub use benchmark::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn take_current() -> Option<Value> {
        REPORTER.with(|reporter| {
            reporter.borrow_mut().take().map(|r| match r.current {
                CurrentReportingContext::Object(object) => Value::Object(object),
                CurrentReportingContext::Collection(collection) => Value::Array(collection),
            })
        })
    }

    #[test]
    fn reporting_without_reporter_is_noop() {
        report!("ignored", 1);
        assert_eq!(take_current(), None);
    }

    #[test]
    fn nested_collections() {
        REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));
        report!("num_edges", 3);
        {
            let _graph = push_context("graph".to_string());
            report!("num_nodes", 2);
        }
        {
            let mut passes = push_collection_context("passes".to_string());
            for i in 1..=2 {
                let _item = passes.push_collection_item();
                report!("iteration", i);
            }
        }
        assert_eq!(
            take_current(),
            Some(json!({
                "num_edges": 3,
                "graph": { "num_nodes": 2 },
                "passes": [{ "iteration": 1 }, { "iteration": 2 }]
            }))
        );
    }
}
