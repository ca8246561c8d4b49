//! Fragment rendering for downstream generators.

use fragment_model::Category;

use super::MetaIndex;
use crate::diagnostics::{Diagnostics, EventKind, SyncEvent};

const TARGET: &str = "fragment_sync::render";
const INDENT_WIDTH: usize = 4;

/// Reads fragment bodies out of a built index, shifted to a target
/// indentation level.
#[derive(Debug, Clone, Copy)]
pub struct FragmentRenderer<'a> {
    index: &'a MetaIndex,
}

impl<'a> FragmentRenderer<'a> {
    pub fn new(index: &'a MetaIndex) -> Self {
        Self { index }
    }

    /// Render one fragment body.
    ///
    /// Returns an empty string when the fragment is not indexed or has an
    /// empty body. A custom tooltip is appended only where the game supports
    /// one: `modifier/modifier` blocks and effect blocks.
    pub fn render(
        &self,
        category: Category,
        entity_id: &str,
        sub_type: &str,
        indent_level: usize,
        custom_tooltip: Option<&str>,
        diag: &mut Diagnostics,
    ) -> String {
        let Some(body) = self.index.get(category, entity_id, sub_type).filter(|b| !b.is_empty()) else {
            return String::new();
        };
        let mut body = body.to_string();

        if let Some(tooltip) = custom_tooltip.filter(|t| !t.is_empty()) {
            match (category, sub_type) {
                (Category::Modifier, "modifier") => {
                    body.push_str(&format!("\ncustom_modifier_tooltip = {tooltip}"));
                }
                (Category::Effect, _) => {
                    body.push_str(&format!("\ncustom_effect_tooltip = {tooltip}"));
                }
                _ => diag.record(
                    TARGET,
                    SyncEvent::new(
                        EventKind::UnsupportedTooltip,
                        format!("{sub_type} has no custom tooltip slot"),
                    )
                    .with_entity(category, &entity_id.into()),
                ),
            }
        }

        indent(&body, indent_level * INDENT_WIDTH)
    }
}

/// Prefix every non-blank line with `width` spaces.
fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
