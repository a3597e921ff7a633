//! Generic traversal over records, elements and primitive values.
//!
//! Every node implements [`Visitable`] and exposes a single `accept` entry point. `accept`
//! runs the four-phase protocol through [`dispatch`]:
//!
//! ```text
//! if visitor.pre_visit(node) {
//!     visitor.visit_start(name, index, node);
//!     if visitor.visit(name, index, node) {
//!         // accept each field: base fields first, then own fields, in declared order
//!     }
//!     visitor.visit_end(name, index, node);
//!     visitor.post_visit(node);
//! }
//! ```
//!
//! Non-empty repeated fields are bracketed by `list_start` / `list_end` and each entry is
//! visited with its position. The traversal order is the serialisation order used by
//! [`crate::yaml`], so it must stay stable per type.

use chrono::{DateTime, NaiveDate, Utc};
use std::any::Any;
use std::fmt::Write;
use std::num::NonZeroU32;
use vpr_types::{Code, Id, NonEmptyText, Uri};

/// What sort of node is being visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A top-level resource (including contained resources).
    Resource,
    /// A complex datatype or backbone element.
    Element,
    /// A leaf value.
    Primitive,
}

/// Payload of a primitive node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Boolean(bool),
    Integer(i64),
    Date(&'a NaiveDate),
    DateTime(&'a DateTime<Utc>),
}

/// A node that can be traversed by a [`Visitor`].
pub trait Visitable: Any {
    /// FHIR type name of the node.
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> NodeKind;

    /// Leaf payload; `None` for complex nodes.
    fn value(&self) -> Option<Value<'_>> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    /// Visit this node under `name`, with `index` set when it sits in a repeated field.
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor);
}

/// Capability object driven by [`Visitable::accept`]. Every hook has a pass-through default.
pub trait Visitor {
    /// Return `false` to skip the node and everything below it.
    fn pre_visit(&mut self, _node: &dyn Visitable) -> bool {
        true
    }

    fn visit_start(&mut self, _name: &str, _index: Option<usize>, _node: &dyn Visitable) {}

    /// Return `false` to skip the node's children.
    fn visit(&mut self, _name: &str, _index: Option<usize>, _node: &dyn Visitable) -> bool {
        true
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &dyn Visitable) {}

    fn post_visit(&mut self, _node: &dyn Visitable) {}

    fn list_start(&mut self, _name: &str, _len: usize, _element_type: &'static str) {}

    fn list_end(&mut self, _name: &str, _len: usize, _element_type: &'static str) {}
}

/// Run the four-phase protocol for `node`; `children` accepts each field in order.
pub fn dispatch<F>(
    node: &dyn Visitable,
    name: &str,
    index: Option<usize>,
    visitor: &mut dyn Visitor,
    children: F,
) where
    F: FnOnce(&mut dyn Visitor),
{
    if visitor.pre_visit(node) {
        visitor.visit_start(name, index, node);
        if visitor.visit(name, index, node) {
            children(visitor);
        }
        visitor.visit_end(name, index, node);
        visitor.post_visit(node);
    }
}

/// Accept an optional singular field. Absent values produce no events.
pub fn accept_field<T: Visitable>(value: &Option<T>, name: &str, visitor: &mut dyn Visitor) {
    if let Some(value) = value {
        value.accept(name, None, visitor);
    }
}

/// Accept a repeated field. Empty lists produce no events.
pub fn accept_list<T: Visitable>(
    values: &[T],
    name: &str,
    element_type: &'static str,
    visitor: &mut dyn Visitor,
) {
    if values.is_empty() {
        return;
    }

    visitor.list_start(name, values.len(), element_type);
    for (index, value) in values.iter().enumerate() {
        value.accept(name, Some(index), visitor);
    }
    visitor.list_end(name, values.len(), element_type);
}

/// Visit `node` as a traversal root, named after its own type.
pub fn walk(node: &dyn Visitable, visitor: &mut dyn Visitor) {
    node.accept(node.type_name(), None, visitor);
}

// ============================================================================
// Primitive nodes
// ============================================================================

macro_rules! primitive {
    ($ty:ty, $type_name:literal, |$v:ident| $value:expr) => {
        impl Visitable for $ty {
            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn kind(&self) -> NodeKind {
                NodeKind::Primitive
            }

            fn value(&self) -> Option<Value<'_>> {
                let $v = self;
                Some($value)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
                dispatch(self, name, index, visitor, |_| {});
            }
        }
    };
}

primitive!(NonEmptyText, "string", |v| Value::String(v.as_str()));
primitive!(Id, "id", |v| Value::String(v.as_str()));
primitive!(Uri, "uri", |v| Value::String(v.as_str()));
primitive!(Code, "code", |v| Value::String(v.as_str()));
primitive!(bool, "boolean", |v| Value::Boolean(*v));
primitive!(i64, "integer", |v| Value::Integer(*v));
primitive!(NonZeroU32, "positiveInt", |v| Value::Integer(i64::from(v.get())));
primitive!(NaiveDate, "date", |v| Value::Date(v));
primitive!(DateTime<Utc>, "dateTime", |v| Value::DateTime(v));

// ============================================================================
// Path tracking
// ============================================================================

#[derive(Clone, Debug)]
enum PathSegment {
    Field(String),
    Index(String, usize),
}

fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();

    for (i, seg) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        match seg {
            PathSegment::Field(name) => out.push_str(name),
            PathSegment::Index(name, index) => {
                let _ = write!(out, "{name}[{index}]");
            }
        }
    }

    out
}

/// Records the FHIRPath-style path of every visited node, in visitation order.
///
/// `visit_start` pushes a segment and `visit_end` pops it, so the path stack always mirrors
/// the traversal frame.
#[derive(Debug, Default)]
pub struct PathCollector {
    stack: Vec<PathSegment>,
    paths: Vec<String>,
}

impl PathCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl Visitor for PathCollector {
    fn visit_start(&mut self, name: &str, index: Option<usize>, _node: &dyn Visitable) {
        let seg = match index {
            Some(i) => PathSegment::Index(name.to_owned(), i),
            None => PathSegment::Field(name.to_owned()),
        };
        self.stack.push(seg);
        self.paths.push(render_path(&self.stack));
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &dyn Visitable) {
        self.stack.pop();
    }
}

/// Collect the path of every node reachable from `node`.
pub fn collect_paths(node: &dyn Visitable) -> Vec<String> {
    let mut collector = PathCollector::new();
    walk(node, &mut collector);
    collector.into_paths()
}

// ============================================================================
// Collecting by concrete type
// ============================================================================

/// Collects a clone of every visited node whose concrete type is `T`.
#[derive(Debug)]
pub struct CollectingVisitor<T> {
    result: Vec<T>,
}

impl<T> Default for CollectingVisitor<T> {
    fn default() -> Self {
        Self { result: Vec::new() }
    }
}

impl<T: Clone + 'static> CollectingVisitor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> &[T] {
        &self.result
    }

    pub fn into_result(self) -> Vec<T> {
        self.result
    }
}

impl<T: Clone + 'static> Visitor for CollectingVisitor<T> {
    fn visit(&mut self, _name: &str, _index: Option<usize>, node: &dyn Visitable) -> bool {
        if let Some(found) = node.as_any().downcast_ref::<T>() {
            self.result.push(found.clone());
        }
        true
    }
}

/// Collect every node of type `T` reachable from `node`, in traversal order.
pub fn collect<T: Clone + 'static>(node: &dyn Visitable) -> Vec<T> {
    let mut visitor = CollectingVisitor::<T>::new();
    walk(node, &mut visitor);
    visitor.into_result()
}
