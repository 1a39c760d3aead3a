//! Request interception policy
//!
//! A policy is fixed when a browser context is created and applies to every
//! request issued inside that context. Crawls only need the document itself,
//! so the default policy drops images, stylesheets, fonts and media.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Category of a request issued while loading a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    Other,
}

impl ResourceType {
    /// Lowercase name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Stylesheet => "stylesheet",
            Self::Image => "image",
            Self::Media => "media",
            Self::Font => "font",
            Self::Script => "script",
            Self::TextTrack => "texttrack",
            Self::Xhr => "xhr",
            Self::Fetch => "fetch",
            Self::EventSource => "eventsource",
            Self::WebSocket => "websocket",
            Self::Manifest => "manifest",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "stylesheet" => Ok(Self::Stylesheet),
            "image" => Ok(Self::Image),
            "media" => Ok(Self::Media),
            "font" => Ok(Self::Font),
            "script" => Ok(Self::Script),
            "texttrack" => Ok(Self::TextTrack),
            "xhr" => Ok(Self::Xhr),
            "fetch" => Ok(Self::Fetch),
            "eventsource" => Ok(Self::EventSource),
            "websocket" => Ok(Self::WebSocket),
            "manifest" => Ok(Self::Manifest),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown resource type: '{}'", other)),
        }
    }
}

/// What to do with an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    Continue,
    Abort,
}

/// Set of resource categories aborted inside a browser context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptionPolicy {
    blocked: HashSet<ResourceType>,
}

impl InterceptionPolicy {
    /// Policy that lets every request through
    pub fn allow_all() -> Self {
        Self {
            blocked: HashSet::new(),
        }
    }

    /// Policy that aborts the given categories
    ///
    /// The document request itself can never be blocked.
    pub fn blocking<I>(types: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = ResourceType>,
    {
        let blocked: HashSet<ResourceType> = types.into_iter().collect();
        if blocked.contains(&ResourceType::Document) {
            return Err("document requests cannot be blocked".to_string());
        }
        Ok(Self { blocked })
    }

    /// Builds a policy from configured category names
    pub fn from_names(names: &[String]) -> Result<Self, String> {
        let types = names
            .iter()
            .map(|name| name.parse::<ResourceType>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::blocking(types)
    }

    /// Decides whether a request of the given category may proceed
    pub fn decide(&self, resource: ResourceType) -> InterceptDecision {
        if self.blocked.contains(&resource) {
            InterceptDecision::Abort
        } else {
            InterceptDecision::Continue
        }
    }

    /// Returns true if the category is aborted by this policy
    pub fn blocks(&self, resource: ResourceType) -> bool {
        self.decide(resource) == InterceptDecision::Abort
    }
}

impl Default for InterceptionPolicy {
    fn default() -> Self {
        Self {
            blocked: [
                ResourceType::Image,
                ResourceType::Stylesheet,
                ResourceType::Font,
                ResourceType::Media,
            ]
            .into_iter()
            .collect(),
        }
    }
}
