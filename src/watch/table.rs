//! Static watch table: source pattern -> stages to re-run -> reload action.
//!
//! | pattern              | stages    | reload    |
//! |----------------------|-----------|-----------|
//! | `src/scss/**/*.scss` | `styles`  | inject    |
//! | `src/js/**/*.js`     | `scripts` | inject    |
//! | `src/*.html`         | `copy`    | full page |
//!
//! Paths are matched relative to the project root. Anything else under
//! `src/` (images, fonts) is not watched.

use std::path::Path;

use glob::Pattern;

use crate::asset::matches;
use crate::stage::StageId;

/// What connected browsers do after a rule's stages complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadAction {
    /// Swap the written stylesheets/scripts in place.
    Inject,
    /// Reload the whole page.
    FullPage,
}

#[derive(Debug, Clone)]
pub struct WatchRule {
    pub pattern: Pattern,
    pub stages: Vec<StageId>,
    pub reload: ReloadAction,
}

impl WatchRule {
    /// Panics on an invalid pattern; rules are compile-time constants.
    fn new(pattern: &str, stages: &[StageId], reload: ReloadAction) -> Self {
        Self {
            pattern: Pattern::new(pattern).expect("valid watch pattern"),
            stages: stages.to_vec(),
            reload,
        }
    }

    pub fn matches(&self, relative: &Path) -> bool {
        matches(&self.pattern, relative)
    }
}

#[derive(Debug, Clone)]
pub struct WatchTable {
    rules: Vec<WatchRule>,
}

impl WatchTable {
    pub fn new(rules: Vec<WatchRule>) -> Self {
        Self { rules }
    }

    /// The dev pipeline's watch table.
    pub fn standard() -> Self {
        Self::new(vec![
            WatchRule::new("src/scss/**/*.scss", &[StageId::Styles], ReloadAction::Inject),
            WatchRule::new("src/js/**/*.js", &[StageId::Scripts], ReloadAction::Inject),
            WatchRule::new("src/*.html", &[StageId::Copy], ReloadAction::FullPage),
        ])
    }

    /// Rules matching a root-relative path.
    pub fn rules_for<'a>(&'a self, relative: &'a Path) -> impl Iterator<Item = &'a WatchRule> {
        self.rules.iter().filter(move |rule| rule.matches(relative))
    }

    /// Stages to run for a batch of changed paths, each once, in table order.
    ///
    /// A stage reached through several rules keeps the strongest reload
    /// action (a full page reload subsumes injection).
    pub fn plan<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<(StageId, ReloadAction)> {
        let mut plan: Vec<(StageId, ReloadAction)> = Vec::new();
        for rule in &self.rules {
            if !paths.iter().any(|p| rule.matches(p.as_ref())) {
                continue;
            }
            for &stage in &rule.stages {
                match plan.iter_mut().find(|(s, _)| *s == stage) {
                    Some((_, action)) if rule.reload == ReloadAction::FullPage => {
                        *action = ReloadAction::FullPage;
                    }
                    Some(_) => {}
                    None => plan.push((stage, rule.reload)),
                }
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_for() {
        let table = WatchTable::standard();
        let stages = |p: &str| -> Vec<StageId> {
            table
                .rules_for(Path::new(p))
                .flat_map(|r| r.stages.clone())
                .collect()
        };

        assert_eq!(stages("src/scss/main.scss"), vec![StageId::Styles]);
        assert_eq!(stages("src/scss/parts/_nav.scss"), vec![StageId::Styles]);
        assert_eq!(stages("src/js/main.js"), vec![StageId::Scripts]);
        assert_eq!(stages("src/js/vendor/lib.js"), vec![StageId::Scripts]);
        assert_eq!(stages("src/index.html"), vec![StageId::Copy]);
        assert!(stages("src/pages/about.html").is_empty());
        assert!(stages("src/img/logo.png").is_empty());
        assert!(stages("tmp/css/style.css").is_empty());
    }

    #[test]
    fn test_plan_dedups_in_table_order() {
        let table = WatchTable::standard();
        let plan = table.plan(&[
            "src/index.html",
            "src/js/main.js",
            "src/scss/a.scss",
            "src/scss/b.scss",
        ]);
        assert_eq!(
            plan,
            vec![
                (StageId::Styles, ReloadAction::Inject),
                (StageId::Scripts, ReloadAction::Inject),
                (StageId::Copy, ReloadAction::FullPage),
            ]
        );
    }

    #[test]
    fn test_plan_empty() {
        let table = WatchTable::standard();
        assert!(table.plan(&["src/fonts/a.woff2"]).is_empty());
        assert!(table.plan::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_full_page_wins() {
        let table = WatchTable::new(vec![
            WatchRule::new("src/*.css", &[StageId::Copy], ReloadAction::Inject),
            WatchRule::new("src/*.html", &[StageId::Copy], ReloadAction::FullPage),
        ]);
        let plan = table.plan(&["src/a.css", "src/index.html"]);
        assert_eq!(plan, vec![(StageId::Copy, ReloadAction::FullPage)]);
    }
}
