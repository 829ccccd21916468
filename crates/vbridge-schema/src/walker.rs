//! # Schema Walker
//!
//! Depth-first, pre-order traversal of the attribute tree that records where
//! every store path expression is declared.
//!
//! The walker establishes the *shape* of each declaration site, not every
//! runtime instance. Descending into a list, set, or map container appends
//! one representative step (`[0]`, `[*]`, or `["*"]`), and element
//! validators of scalar collections are recorded at the attribute path plus
//! the same kind of step.
//!
//! ## Invariants
//!
//! - Every attribute is visited exactly once.
//! - The first declaration of an expression wins; later duplicates are
//!   ignored.
//! - Siblings are visited in name order, so the table is deterministic.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use vbridge_core::{ConcretePath, PathExpr};

use crate::attribute::{Attribute, Schema};

/// Mapping from path expression to its declaration-site concrete path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionTable {
    entries: BTreeMap<PathExpr, ConcretePath>,
}

impl ExpressionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `expr` at `path` unless it is already present.
    ///
    /// Returns true if the entry was inserted.
    pub fn insert_first(&mut self, expr: PathExpr, path: ConcretePath) -> bool {
        match self.entries.entry(expr) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(path);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Declaration path of `expr`.
    pub fn get(&self, expr: &PathExpr) -> Option<&ConcretePath> {
        self.entries.get(expr)
    }

    /// Iterate entries in expression order.
    pub fn iter(&self) -> btree_map::Iter<'_, PathExpr, ConcretePath> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExpressionTable {
    type Item = (&'a PathExpr, &'a ConcretePath);
    type IntoIter = btree_map::Iter<'a, PathExpr, ConcretePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Anything that can produce the expression table for a bridge.
///
/// [`Schema`] implements this by walking itself. Hosts with their own
/// schema representation implement it directly.
pub trait ExpressionSource: Send + Sync {
    /// Build the full table. Called at most once per bridge instance.
    fn build_table(&self) -> ExpressionTable;
}

impl ExpressionSource for Schema {
    fn build_table(&self) -> ExpressionTable {
        walk(self)
    }
}

impl<T: ExpressionSource + ?Sized> ExpressionSource for Arc<T> {
    fn build_table(&self) -> ExpressionTable {
        (**self).build_table()
    }
}

/// Visit every attribute in pre-order with its declaration path.
pub fn visit<F>(schema: &Schema, visitor: &mut F)
where
    F: FnMut(&ConcretePath, &Attribute),
{
    visit_attributes(&schema.attributes, &ConcretePath::root(), visitor);
}

fn visit_attributes<F>(attributes: &BTreeMap<String, Attribute>, base: &ConcretePath, visitor: &mut F)
where
    F: FnMut(&ConcretePath, &Attribute),
{
    for (name, attribute) in attributes {
        let path = base.clone().at_attribute(name.clone());
        visitor(&path, attribute);

        if let Some((nesting, children)) = attribute.kind.nested() {
            let child_base = match nesting.step() {
                Some(step) => path.clone().with_step(step),
                None => path.clone(),
            };
            visit_attributes(children, &child_base, visitor);
        }
    }
}

/// Build the expression table for `schema`.
pub fn walk(schema: &Schema) -> ExpressionTable {
    let mut table = ExpressionTable::new();
    visit(schema, &mut |path, attribute| {
        if let Some(expr) = attribute.store_expr() {
            table.insert_first(expr.clone(), path.clone());
        }
        if let (Some(expr), Some(step)) = (attribute.element_store_expr(), attribute.kind.element_step()) {
            table.insert_first(expr.clone(), path.clone().with_step(step));
        }
    });
    tracing::debug!(entries = table.len(), "built path expression table");
    table
}
