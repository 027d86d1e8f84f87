//! Block kind registry
//!
//! Registration happens on a [`RegistryBuilder`]. [`RegistryBuilder::build`]
//! freezes it into a [`Registry`], which is what a
//! [`ParserContext`](crate::context::ParserContext) borrows, so no parse can
//! start before registration is complete. A `Registry` is read-only and can
//! be shared between threads running separate parses.

use crate::context::ParserContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::subparser::{BlockBody, SubParser};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Factory for one block kind.
///
/// Pairs a keyword with the grammar of its body and with whether a name token
/// follows the keyword (`tech laser { ... }` versus `salary { ... }`).
#[derive(Clone)]
pub struct BlockKind {
    keyword: String,
    requires_name: bool,
    body: Arc<dyn BlockBody>,
}

impl BlockKind {
    pub fn new(keyword: impl Into<String>, requires_name: bool, body: impl BlockBody + 'static) -> Self {
        Self {
            keyword: keyword.into(),
            requires_name,
            body: Arc::new(body),
        }
    }

    /// `keyword name { ... }`
    pub fn named(keyword: impl Into<String>, body: impl BlockBody + 'static) -> Self {
        Self::new(keyword, true, body)
    }

    /// `keyword { ... }`
    pub fn unnamed(keyword: impl Into<String>, body: impl BlockBody + 'static) -> Self {
        Self::new(keyword, false, body)
    }

    /// Keyword this kind is registered under
    pub fn id(&self) -> &str {
        &self.keyword
    }

    /// Whether the dispatcher must read a name token after the keyword
    pub fn is_id_name(&self) -> bool {
        self.requires_name
    }

    pub fn body(&self) -> &dyn BlockBody {
        self.body.as_ref()
    }

    /// Bind a fresh sub-parser to `ctx`. Consumes no tokens.
    pub fn create<'c, 'r, 'src>(&'c self, ctx: &'c mut ParserContext<'r, 'src>) -> SubParser<'c, 'r, 'src> {
        SubParser::new(ctx, self.body.as_ref())
    }
}

impl fmt::Debug for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockKind")
            .field("keyword", &self.keyword)
            .field("requires_name", &self.requires_name)
            .field("body", &self.body)
            .finish()
    }
}

/// What to do when a keyword is registered a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Last registration wins; the keyword is listed in [`Registry::duplicates`]
    #[default]
    Replace,
    /// Keep the first registration and return an error
    Reject,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("block keyword '{keyword}' is already registered")]
    DuplicateRegistration { keyword: String },
    #[error("block keyword must not be empty")]
    EmptyKeyword,
    #[error("block keyword '{keyword}' can never match a token")]
    InvalidKeyword { keyword: String },
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    kinds: HashMap<String, BlockKind>,
    order: Vec<String>,
    duplicates: Vec<String>,
    policy: DuplicatePolicy,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add a block kind under its keyword
    pub fn register(&mut self, kind: BlockKind) -> Result<(), RegistryError> {
        let keyword = kind.id().to_string();
        if keyword.is_empty() {
            return Err(RegistryError::EmptyKeyword);
        }
        if keyword
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | '"'))
        {
            return Err(RegistryError::InvalidKeyword { keyword });
        }

        if self.kinds.contains_key(&keyword) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistryError::DuplicateRegistration { keyword });
                }
                DuplicatePolicy::Replace => {
                    tracing::warn!(keyword = %keyword, "block kind registered twice, replacing earlier factory");
                    self.duplicates.push(keyword.clone());
                }
            }
        } else {
            self.order.push(keyword.clone());
        }

        tracing::debug!(keyword = %keyword, named = kind.is_id_name(), "registered block kind");
        self.kinds.insert(keyword, kind);
        Ok(())
    }

    /// Chaining form of [`register`](Self::register)
    pub fn with(mut self, kind: BlockKind) -> Result<Self, RegistryError> {
        self.register(kind)?;
        Ok(self)
    }

    /// Whether `keyword` is already taken
    pub fn contains(&self, keyword: &str) -> bool {
        self.kinds.contains_key(keyword)
    }

    pub fn build(self) -> Registry {
        Registry {
            kinds: self.kinds,
            order: self.order,
            duplicates: self.duplicates,
        }
    }
}

/// Immutable keyword to block kind table
#[derive(Debug)]
pub struct Registry {
    kinds: HashMap<String, BlockKind>,
    order: Vec<String>,
    duplicates: Vec<String>,
}

impl Registry {
    /// Exact, case-sensitive lookup
    pub fn lookup(&self, keyword: &str) -> Option<&BlockKind> {
        self.kinds.get(keyword)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kinds in first-registration order
    pub fn iter(&self) -> impl Iterator<Item = &BlockKind> {
        self.order.iter().filter_map(|k| self.kinds.get(k))
    }

    /// Keywords whose factory was replaced during registration
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// One warning per replaced registration
    pub fn duplicate_diagnostics(&self) -> Vec<Diagnostic> {
        self.duplicates
            .iter()
            .map(|keyword| {
                Diagnostic::new(
                    DiagnosticKind::DuplicateRegistration,
                    format!("block keyword '{}' was registered more than once; the last registration wins", keyword),
                )
            })
            .collect()
    }
}
