use serde::{Deserialize, Serialize};

/// Declarative placement rule, consulted once when a window is first
/// managed. Matchers are substring tests; a `None` matcher matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tag: Option<usize>,
    #[serde(default)]
    pub floating: bool,
    #[serde(default)]
    pub monitor: Option<usize>,
}

impl Rule {
    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        self.title.as_deref().is_none_or(|t| title.contains(t))
            && self.class.as_deref().is_none_or(|c| class.contains(c))
            && self.instance.as_deref().is_none_or(|i| instance.contains(i))
    }
}

/// Initial placement derived from the rule table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub tag: Option<usize>,
    pub floating: bool,
    pub monitor: Option<usize>,
}

/// Fold the rule table over a window's identity. Every matching rule
/// overwrites the fields it specifies, so for each field the last
/// matching rule that sets it wins. This is deliberate, pinned
/// behavior, not first-match or most-specific-match.
pub fn apply_rules(rules: &[Rule], class: &str, instance: &str, title: &str) -> Placement {
    let mut placement = Placement::default();
    for rule in rules {
        if rule.matches(class, instance, title) {
            tracing::debug!(
                "Rule matched for class={:?} instance={:?} title={:?}: {:?}",
                class,
                instance,
                title,
                rule
            );
            placement.floating = rule.floating;
            if rule.tag.is_some() {
                placement.tag = rule.tag;
            }
            if rule.monitor.is_some() {
                placement.monitor = rule.monitor;
            }
        }
    }
    placement
}
