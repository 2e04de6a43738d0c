//! Legend composition

use crate::canvas::{ArtistKind, Legend, LegendEntry, LegendOffset, Panel};
use crate::config::{FontSpec, LegendSpec, SizeUnit, TextLike};
use crate::style::text::{latex_wrap, merge_text_style};

const DEFAULT_TITLE: &str = "Legend";

/// Resolve the panel legend from `spec` and the drawables already on the panel.
///
/// With label overrides the entry count always equals the override count:
/// handles are truncated, or padded with placeholders. Without overrides only
/// labelled drawables are listed, falling back to `Series N` when none is.
pub fn legend(panel: &mut Panel, spec: &LegendSpec, font: &FontSpec, use_tex: bool) {
    if !spec.show {
        panel.legend = None;
        return;
    }

    let style = merge_text_style(spec.style.as_ref(), font);

    let mut entries: Vec<LegendEntry> = match spec.labels.as_deref() {
        Some(overrides) if !overrides.is_empty() => {
            let handles = panel.labelled_handles(true);
            overrides
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let handle = handles.get(i);
                    let text = label
                        .text()
                        .map(str::to_string)
                        .or_else(|| handle.map(|(_, existing)| existing.clone()))
                        .unwrap_or_default();
                    LegendEntry {
                        handle: handle.map(|(id, _)| *id),
                        label: text,
                    }
                })
                .collect()
        }
        _ => {
            let labelled = panel.labelled_handles(false);
            if labelled.is_empty() {
                fallback_entries(panel)
            } else {
                labelled
                    .into_iter()
                    .map(|(id, label)| LegendEntry {
                        handle: Some(id),
                        label,
                    })
                    .collect()
            }
        }
    };

    if entries.is_empty() {
        tracing::debug!(panel = panel.index, "No drawables for the legend");
        panel.legend = None;
        return;
    }

    for entry in &mut entries {
        entry.label = latex_wrap(&entry.label, &style, use_tex);
    }

    let title = match &spec.title {
        TextLike::Described(desc) if desc.text.is_none() && desc.show => {
            let mut desc = desc.clone();
            desc.text = Some(DEFAULT_TITLE.to_string());
            super::text_item(&TextLike::Described(desc), font, SizeUnit::In, use_tex, 0.0, 0.0)
        }
        other => super::text_item(other, font, SizeUnit::In, use_tex, 0.0, 0.0),
    };

    panel.legend = Some(Legend {
        entries,
        title,
        loc: spec.loc.clone(),
        ncol: spec.ncol.max(1),
        frameon: spec.frameon,
        anchor: spec.anchor.clone(),
        offset: LegendOffset {
            dx: spec.offset_x.unwrap_or(0.0),
            dy: spec.offset_y.unwrap_or(0.0),
            unit: spec.offset_unit,
        },
        style,
    });
}

/// `Series 1..N` over the panel's non-text drawables
fn fallback_entries(panel: &Panel) -> Vec<LegendEntry> {
    panel
        .artists_by_zorder()
        .into_iter()
        .filter(|(_, artist)| !matches!(artist.kind, ArtistKind::Text(_)))
        .enumerate()
        .map(|(i, (id, _))| LegendEntry {
            handle: Some(id),
            label: format!("Series {}", i + 1),
        })
        .collect()
}
