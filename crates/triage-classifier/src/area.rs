//! Area Matcher

use glob::MatchOptions;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use triage_catalog::{Area, RuleCatalog};
use triage_domain::{AreaMatch, SignalSet};

/// Path-like tokens: anything with a directory separator, or a bare file name
static BODY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[\w.-]+)?(?:/[\w.-]+)+|\b[\w-]+\.[A-Za-z][A-Za-z0-9]{0,5}\b").unwrap()
});

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// File paths mentioned in an issue body, leading `./` and `/` removed
pub fn mentioned_paths(body: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for found in BODY_PATH.find_iter(body) {
        let path = found
            .as_str()
            .trim_start_matches("./")
            .trim_start_matches('/')
            .trim_end_matches('.');
        if !path.is_empty() && !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }
    paths
}

/// One area's score against an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaScore {
    /// Position in the catalog (lower wins ties)
    pub index: usize,

    /// Distinct keyword hits
    pub keyword_hits: usize,

    /// Globs matching at least one mentioned path
    pub path_hits: usize,
}

impl AreaScore {
    /// Keyword plus path hits
    pub fn total(&self) -> usize {
        self.keyword_hits + self.path_hits
    }

    /// Reporting order: higher total first, then earlier catalog position
    pub fn rank(&self, other: &AreaScore) -> Ordering {
        self.total()
            .cmp(&other.total())
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Maps an issue to the best-matching catalog area
#[derive(Debug, Clone, Copy)]
pub struct AreaMatcher<'a> {
    catalog: &'a RuleCatalog,
}

impl<'a> AreaMatcher<'a> {
    /// Create a matcher over a catalog's areas
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    /// Score every area in catalog order
    pub fn scores(&self, signals: &SignalSet) -> Vec<AreaScore> {
        let text = signals.searchable_text();
        let paths = mentioned_paths(&signals.body);

        self.catalog
            .areas
            .iter()
            .enumerate()
            .map(|(index, area)| score_area(index, area, &text, &paths))
            .collect()
    }

    /// The winning area, `None` when nothing scores
    pub fn best(&self, signals: &SignalSet) -> Option<AreaMatch> {
        let best = self
            .scores(signals)
            .into_iter()
            .filter(|s| s.total() > 0)
            .max_by(|a, b| a.rank(b))?;

        let area = &self.catalog.areas[best.index];
        tracing::debug!(
            "Issue {} matched area '{}' ({} keyword, {} path hits)",
            signals.id,
            area.name,
            best.keyword_hits,
            best.path_hits
        );

        Some(AreaMatch {
            name: area.name.clone(),
            owners: area.owners.clone(),
            score: best.total(),
        })
    }
}

fn score_area(index: usize, area: &Area, text: &str, paths: &[String]) -> AreaScore {
    let keyword_hits = area.keywords.iter().filter(|k| text.contains(k.as_str())).count();
    let path_hits = area
        .path_globs
        .iter()
        .filter(|glob| paths.iter().any(|p| glob.matches_with(p, GLOB_OPTIONS)))
        .count();

    AreaScore {
        index,
        keyword_hits,
        path_hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(text: &str) -> RuleCatalog {
        RuleCatalog::load(Some(text))
    }

    #[test]
    fn test_mentioned_paths() {
        let paths = mentioned_paths("See ./src/debugger/Session.kt and build.gradle, also /docs/setup.md.");
        assert_eq!(paths, vec!["src/debugger/Session.kt", "build.gradle", "docs/setup.md"]);
    }

    #[test]
    fn test_keyword_hits_are_distinct() {
        let catalog = catalog(
            r#"
            [[areas]]
            name = "debugger"
            keywords = ["breakpoint", "debugger"]
            "#,
        );
        let signals = SignalSet::new(1, "Breakpoint ignored", "breakpoint breakpoint breakpoint", 0);
        let scores = AreaMatcher::new(&catalog).scores(&signals);
        assert_eq!(scores[0].keyword_hits, 1);
    }

    #[test]
    fn test_labels_count_as_text() {
        let catalog = catalog(
            r#"
            [[areas]]
            name = "vcs"
            keywords = ["git"]
            "#,
        );
        let signals = SignalSet::new(1, "Something broke", "", 0).with_labels(["Git"]);
        assert_eq!(AreaMatcher::new(&catalog).best(&signals).unwrap().name, "vcs");
    }

    #[test]
    fn test_path_globs() {
        let catalog = catalog(
            r#"
            [[areas]]
            name = "terminal"
            keywords = ["shell"]

            [[areas]]
            name = "debugger"
            keywords = ["zzz-unused"]
            path_globs = ["**/debugger/**", "**/*.KT"]
            owners = ["dana"]
            "#,
        );
        let signals = SignalSet::new(1, "Exception", "Thrown from src/debugger/Session.kt", 0);
        let best = AreaMatcher::new(&catalog).best(&signals).unwrap();
        assert_eq!(best.name, "debugger");
        assert_eq!(best.score, 2);
        assert_eq!(best.owners, vec!["dana"]);
    }

    #[test]
    fn test_tie_goes_to_first_listed() {
        let catalog = catalog(
            r#"
            [[areas]]
            name = "editor"
            keywords = ["freeze"]

            [[areas]]
            name = "performance"
            keywords = ["freeze"]
            "#,
        );
        let signals = SignalSet::new(1, "IDE freeze", "", 0);
        assert_eq!(AreaMatcher::new(&catalog).best(&signals).unwrap().name, "editor");
    }

    #[test]
    fn test_higher_score_beats_order() {
        let catalog = catalog(
            r#"
            [[areas]]
            name = "editor"
            keywords = ["freeze"]

            [[areas]]
            name = "performance"
            keywords = ["freeze", "slow"]
            "#,
        );
        let signals = SignalSet::new(1, "IDE freeze", "very slow", 0);
        assert_eq!(AreaMatcher::new(&catalog).best(&signals).unwrap().name, "performance");
    }

    #[test]
    fn test_built_in_keywords_ignore_word_fragments() {
        let catalog = RuleCatalog::built_in();
        let matcher = AreaMatcher::new(&catalog);
        let fragments = SignalSet::new(1, "Build guide is wrong", "fluid flag changes", 0);
        assert!(matcher.best(&fragments).is_none());

        let toolbar = SignalSet::new(2, "Toolbar missing", "", 0);
        assert_eq!(matcher.best(&toolbar).unwrap().name, "ui");
    }

    #[test]
    fn test_no_match() {
        let catalog = catalog(
            r#"
            [[areas]]
            name = "editor"
            keywords = ["completion"]
            "#,
        );
        let signals = SignalSet::new(1, "Unrelated", "nothing here", 0);
        assert!(AreaMatcher::new(&catalog).best(&signals).is_none());
    }
}
