//! Classifier registry: ordered handlers resolving a tag to a kind.
//!
//! A [`Handler`] is a value triple of a [`TagMatcher`] (which tags it
//! applies to), a [`StyleKind`] (what the tag is classified as) and a
//! [`FragmentFn`] (how the item's page fragment is rendered), plus the option
//! values the handler forces regardless of hints.
//!
//! # Matching
//!
//! [`ClassifierRegistry::classify`] evaluates every handler in registration
//! order and the **last** matching handler wins. This lets a specific handler
//! registered later (arrow heads: `symbol` named `arrow/...`) override a
//! general one registered earlier (any `symbol` is a mark). Registration
//! order is therefore significant.
//!
//! # Options
//!
//! Only the winning handler renders. Its options are resolved fresh for
//! every tag: defaults, then hints (see [`HintsTable`]), then the handler's
//! forced values, which take precedence over hints for the fields they set.

use serde::Serialize;

use super::kind::StyleKind;
use crate::hints::{resolve_options, HintsTable};
use crate::options::{IpeOptions, OptionOverrides};
use crate::stylesheet::StyleTag;
use crate::template::TemplateError;

/// Decides whether a handler applies to a tag.
///
/// Tags without a `name` attribute never match: an unnamed definition
/// cannot be referenced from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatcher {
    tag_type: String,
    name_prefix: Option<String>,
}

impl TagMatcher {
    /// Matches named tags of the given element type.
    pub fn tag(tag_type: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            name_prefix: None,
        }
    }

    /// Matches `symbol` tags whose name starts with `prefix`.
    pub fn symbol(prefix: impl Into<String>) -> Self {
        Self {
            tag_type: "symbol".to_string(),
            name_prefix: Some(prefix.into()),
        }
    }

    pub fn matches(&self, tag: &StyleTag) -> bool {
        if tag.tag_type() != self.tag_type {
            return false;
        }
        match (tag.name(), &self.name_prefix) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(name), Some(prefix)) => name.starts_with(prefix.as_str()),
        }
    }
}

/// Everything a fragment renderer gets to see.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FragmentRequest<'a> {
    pub kind: StyleKind,
    pub name: &'a str,
    pub options: &'a IpeOptions,
}

impl<'a> FragmentRequest<'a> {
    pub fn new(kind: StyleKind, name: &'a str, options: &'a IpeOptions) -> Self {
        Self {
            kind,
            name,
            options,
        }
    }
}

/// Renders an item's page fragment.
pub type FragmentFn =
    Box<dyn Fn(&FragmentRequest<'_>) -> Result<String, TemplateError> + Send + Sync>;

/// One registered classification rule.
pub struct Handler {
    matcher: TagMatcher,
    kind: StyleKind,
    forced: OptionOverrides,
    fragment: FragmentFn,
}

impl Handler {
    pub fn new<F>(matcher: TagMatcher, kind: StyleKind, fragment: F) -> Self
    where
        F: Fn(&FragmentRequest<'_>) -> Result<String, TemplateError> + Send + Sync + 'static,
    {
        Self {
            matcher,
            kind,
            forced: OptionOverrides::default(),
            fragment: Box::new(fragment),
        }
    }

    /// Sets option values that override any hint for this handler's items.
    pub fn forcing(mut self, forced: OptionOverrides) -> Self {
        self.forced = forced;
        self
    }

    pub fn matcher(&self) -> &TagMatcher {
        &self.matcher
    }

    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    pub fn forced(&self) -> &OptionOverrides {
        &self.forced
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("matcher", &self.matcher)
            .field("kind", &self.kind)
            .field("forced", &self.forced)
            .finish_non_exhaustive()
    }
}

/// A tag resolved to a kind, with its options and rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    kind: StyleKind,
    name: String,
    tag_type: String,
    options: IpeOptions,
    fragment: String,
}

impl Classification {
    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type of the source tag.
    pub fn tag_type(&self) -> &str {
        &self.tag_type
    }

    /// The resolved options the fragment was rendered with.
    pub fn options(&self) -> &IpeOptions {
        &self.options
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

/// Error raised while classifying a tag.
#[derive(Debug, thiserror::Error)]
#[error("failed to render fragment for {kind} \"{name}\": {source}")]
pub struct ClassifyError {
    pub name: String,
    pub kind: StyleKind,
    #[source]
    pub source: TemplateError,
}

/// Ordered collection of handlers.
#[derive(Debug, Default)]
pub struct ClassifierRegistry {
    handlers: Vec<Handler>,
}

impl ClassifierRegistry {
    /// Creates an empty registry; nothing classifies until handlers are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler. Later handlers override earlier ones on overlap.
    pub fn register(&mut self, handler: Handler) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the handler that wins for `tag`: the last one that matches.
    pub fn winning_handler(&self, tag: &StyleTag) -> Option<&Handler> {
        self.handlers
            .iter()
            .filter(|handler| handler.matcher.matches(tag))
            .last()
    }

    /// Classifies one tag.
    ///
    /// Returns `Ok(None)` when no handler matches. Only the winning handler's
    /// fragment function runs.
    pub fn classify(
        &self,
        tag: &StyleTag,
        hints: Option<&HintsTable>,
    ) -> Result<Option<Classification>, ClassifyError> {
        let (Some(handler), Some(name)) = (self.winning_handler(tag), tag.name()) else {
            return Ok(None);
        };

        let resolved = resolve_options(hints, handler.kind, name, tag.tag_type());
        let options = handler.forced.apply(resolved);
        let fragment = (handler.fragment)(&FragmentRequest::new(handler.kind, name, &options))
            .map_err(|source| ClassifyError {
                name: name.to_string(),
                kind: handler.kind,
                source,
            })?;

        Ok(Some(Classification {
            kind: handler.kind,
            name: name.to_string(),
            tag_type: tag.tag_type().to_string(),
            options,
            fragment,
        }))
    }
}
