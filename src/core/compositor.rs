/// The page pipeline: story template → gendered text → packed box → plan.
///
/// Adaptation runs on the raw template, before placeholders are filled, so
/// the child's name and the moral value are never inflected.

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, PanelConfig};
use crate::core::layout::{self, LayoutError};
use crate::core::lint::Linter;
use crate::core::morph::GenderMorphAdapter;
use crate::core::render::{PanelCanvas, TextBoxPlan, TextBoxRenderer};
use crate::core::rules::{RuleError, RuleTable};
use crate::core::shaping::{ArabicShaper, ShapingError, TextShaper};
use crate::schema::gender::GenderProfile;
use crate::schema::geometry::{BoxGeometry, PackedLayout};
use crate::schema::story::{ChildProfile, StoryBook, StoryError, StoryPage, Template};

#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("no text shaper configured")]
    MissingShaper,
    #[error("rule table error: {0}")]
    Rules(#[from] RuleError),
    #[error("story error: {0}")]
    Story(#[from] StoryError),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("shaping error: {0}")]
    Shaping(#[from] ShapingError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// One page, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPage {
    pub page_number: u32,
    /// Gender-adapted text with placeholders filled, in logical order.
    pub text: String,
    pub prompt: Option<String>,
    pub layout: PackedLayout,
    /// `None` when the page has no text.
    pub text_box: Option<TextBoxPlan>,
}

/// Composes story pages for a child. Built via `PageCompositor::builder()`.
///
/// Holds only read-only state, so one compositor can serve many threads.
pub struct PageCompositor {
    rules: RuleTable,
    shaper: Box<dyn TextShaper>,
    panel: PanelConfig,
    geometry: BoxGeometry,
    renderer: TextBoxRenderer,
}

/// Builder for constructing a `PageCompositor`.
#[derive(Default)]
pub struct PageCompositorBuilder {
    rule_files: Vec<String>,
    panel_path: Option<String>,
    reference_shaper: bool,
    /// Directly provided rules (replaces the built-in table).
    rules: Option<RuleTable>,
    /// Directly provided panel config (for testing without files).
    panel: Option<PanelConfig>,
    shaper: Option<Box<dyn TextShaper>>,
}

impl PageCompositor {
    pub fn builder() -> PageCompositorBuilder {
        PageCompositorBuilder::default()
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    pub fn geometry(&self) -> &BoxGeometry {
        &self.geometry
    }

    pub fn shaper(&self) -> &dyn TextShaper {
        self.shaper.as_ref()
    }

    /// A residual-marker linter over this compositor's rule table.
    pub fn linter(&self) -> Linter<'_> {
        Linter::new(&self.rules)
    }

    /// Adapt raw text to `gender` with this compositor's rules.
    pub fn adapt(&self, text: &str, gender: GenderProfile) -> String {
        GenderMorphAdapter::new(&self.rules).adapt(text, gender)
    }

    /// Adapt, fill, pack and place a single page.
    pub fn compose_page(
        &self,
        page: &StoryPage,
        child: &ChildProfile,
        value: &str,
    ) -> Result<ComposedPage, CompositorError> {
        let bindings = child.bindings(value);

        let adapted = self.adapt(&page.text, child.gender);
        let text = Template::parse(&adapted)?.render(&bindings)?;
        let prompt = match &page.prompt {
            Some(prompt) => Some(Template::parse(prompt)?.render(&bindings)?),
            None => None,
        };

        let layout = layout::pack(&text, &self.geometry, self.shaper.as_ref())?;
        let text_box = self
            .renderer
            .plan(&layout, &self.geometry, self.shaper.as_ref())?;

        debug!(
            page = page.page_number,
            lines = layout.line_count(),
            "composed page"
        );
        Ok(ComposedPage {
            page_number: page.page_number,
            text,
            prompt,
            layout,
            text_box,
        })
    }

    /// Compose every page of `book` for the given age group, falling back to
    /// the book's default group.
    pub fn compose_book(
        &self,
        book: &StoryBook,
        age_group: &str,
        child: &ChildProfile,
    ) -> Result<Vec<ComposedPage>, CompositorError> {
        let pages = book.pages_for(age_group)?;
        let composed = pages
            .iter()
            .map(|page| self.compose_page(page, child, &book.value))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            title = %book.title,
            age_group,
            pages = composed.len(),
            gender = ?child.gender,
            "composed book"
        );
        Ok(composed)
    }

    /// Paint a composed page's text box. Returns false when there was
    /// nothing to draw.
    pub fn render(&self, page: &ComposedPage, canvas: &mut dyn PanelCanvas) -> bool {
        match &page.text_box {
            Some(plan) => {
                self.renderer.paint(plan, canvas);
                true
            }
            None => false,
        }
    }
}

impl PageCompositorBuilder {
    /// Merge a rule file over the table. Later files win.
    pub fn rules_file(mut self, path: &str) -> Self {
        self.rule_files.push(path.to_string());
        self
    }

    pub fn panel_file(mut self, path: &str) -> Self {
        self.panel_path = Some(path.to_string());
        self
    }

    /// Provide rules directly instead of the built-in table.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Provide a panel config directly (for testing without files).
    pub fn with_panel(mut self, panel: PanelConfig) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn with_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }

    /// Use [`ArabicShaper`] at the panel's font size. An explicit
    /// `with_shaper` takes precedence.
    pub fn reference_shaper(mut self) -> Self {
        self.reference_shaper = true;
        self
    }

    pub fn build(self) -> Result<PageCompositor, CompositorError> {
        let mut rules = self
            .rules
            .unwrap_or_else(|| RuleTable::builtin().clone());
        for path in &self.rule_files {
            let overlay = RuleTable::load_from_ron(Path::new(path))?;
            rules.merge(overlay)?;
        }
        for issue in rules.validate() {
            warn!(%issue, "rule table issue");
        }

        let panel = match (&self.panel_path, self.panel) {
            (Some(path), _) => PanelConfig::load_from_ron(Path::new(path))?,
            (None, Some(panel)) => {
                panel.validate()?;
                panel
            }
            (None, None) => PanelConfig::default(),
        };

        let shaper: Box<dyn TextShaper> = match self.shaper {
            Some(shaper) => shaper,
            None if self.reference_shaper => Box::new(ArabicShaper::new(panel.glyph_metrics())),
            None => return Err(CompositorError::MissingShaper),
        };

        info!(
            rules = rules.len(),
            dialect = %rules.dialect,
            version = rules.version,
            "page compositor ready"
        );
        Ok(PageCompositor {
            rules,
            shaper,
            geometry: panel.geometry(),
            renderer: TextBoxRenderer::new(panel.style()),
            panel,
        })
    }
}
