use super::{require_arguments, Command, Invocation, RequestContext};
use crate::matcher::PatternMatcher;
use crate::session::Session;
use crate::types::{CvsError, FolderId, KSubstMode, LocalOption, Resource};
use crate::visitor::{ImportStructureVisitor, ResourceVisitor};
use crate::workspace::ResourceModel;

/// `import <module> <vendor-tag> <release-tag>`: seeds a module from an
/// unversioned tree.
///
/// Ignore rules are the configured ones plus every `-I` value; wrapper rules
/// the configured ones plus every `-W` value. A `-k` option or the
/// invocation's keyword override beats any wrapper.
#[derive(Debug, Default, Clone)]
pub struct Import {
    ignores: Vec<String>,
    wrappers: Vec<String>,
}

impl Import {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignores<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignores.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_wrappers<I, S>(mut self, wrappers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrappers.extend(wrappers.into_iter().map(Into::into));
        self
    }

    fn ignore_matcher(&self, invocation: &Invocation) -> PatternMatcher<bool> {
        let mut patterns = self.ignores.clone();
        patterns.extend(LocalOption::collect_arguments(&invocation.local_options, "-I"));
        PatternMatcher::ignoring(&patterns)
    }

    fn wrapper_matcher(&self, invocation: &Invocation) -> PatternMatcher<KSubstMode> {
        let mut wrappers = self.wrappers.clone();
        wrappers.extend(LocalOption::collect_arguments(&invocation.local_options, "-W"));
        PatternMatcher::from_wrappers(&wrappers)
    }
}

impl Command for Import {
    fn name(&self) -> &'static str {
        "import"
    }

    fn work_resources(&self, _model: &dyn ResourceModel, invocation: &Invocation) -> Vec<Resource> {
        vec![Resource::Folder(invocation.root)]
    }

    fn check_preconditions(
        &self,
        _model: &dyn ResourceModel,
        invocation: &Invocation,
        _resources: &[Resource],
    ) -> Result<(), CvsError> {
        require_arguments(self.name(), &invocation.arguments, 3, Some(3))
    }

    fn build_request(&self, ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        let invocation = ctx.invocation;
        let mode = invocation
            .keyword_override
            .clone()
            .or_else(|| KSubstMode::from_local_options(&invocation.local_options));

        ImportStructureVisitor::new(
            &mut *ctx.session,
            ctx.model,
            invocation.root,
            self.ignore_matcher(invocation),
            self.wrapper_matcher(invocation),
        )
        .keyword_mode(mode)
        .visit(ctx.resources)
    }

    fn send_working_directory(
        &self,
        session: &mut Session<'_>,
        _model: &dyn ResourceModel,
        _root: FolderId,
    ) -> Result<(), CvsError> {
        session.send_constructed_root_directory()
    }
}
