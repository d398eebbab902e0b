//! Route table
//!
//! One `matchit::Router` per HTTP method.

use hyper::Method;
use std::collections::HashMap;

/// Result of looking up a (method, path) pair
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    Found {
        value: &'a T,
        /// Named path parameters, in route order
        params: Vec<(String, String)>,
    },
    /// The path exists, but only under these methods
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

pub struct RouteTable<T> {
    trees: HashMap<Method, matchit::Router<T>>,
    len: usize,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            len: 0,
        }
    }

    /// Number of registered (method, path) pairs
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, method: Method, path: &str, value: T) -> Result<(), matchit::InsertError> {
        self.trees
            .entry(method)
            .or_insert_with(matchit::Router::new)
            .insert(path, value)?;
        self.len += 1;
        Ok(())
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        if let Some(matched) = self.trees.get(method).and_then(|tree| tree.at(path).ok()) {
            return Lookup::Found {
                value: matched.value,
                params: matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            };
        }

        let mut allowed: Vec<Method> = self
            .trees
            .iter()
            .filter(|(m, tree)| *m != method && tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            Lookup::MethodNotAllowed(allowed)
        }
    }
}
