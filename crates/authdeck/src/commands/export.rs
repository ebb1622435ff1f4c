use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::DeckSource;
use crate::config::Config;
use crate::deck::Deck;
use crate::render::svg::{SvgOverlay, render_svg};
use crate::stage::layout::MonoMeasure;
use crate::stage::{Stage, StageConfig};
use crate::theme::Theme;

pub fn run(source: &DeckSource, output_dir: &Path, config: &Config, quiet: bool) -> Result<()> {
    let deck = source.load()?;
    let theme_name = deck
        .theme
        .as_deref()
        .or_else(|| config.theme())
        .unwrap_or("light");
    let theme = Theme::from_name(theme_name);

    if !quiet {
        eprintln!(
            "Exporting {} step(s) of '{}' to {}",
            deck.step_count(),
            deck.title,
            output_dir.display()
        );
    }
    let written = export_deck(&deck, &theme, config.to_stage_config(), output_dir)?;
    if !quiet {
        for path in &written {
            eprintln!("  Saved {}", path.display());
        }
        eprintln!("{}", format!("Exported {} file(s).", written.len()).green());
    }
    Ok(())
}

/// Render every step of every slide as its own SVG file.
///
/// Each slide gets a fresh stage, mirroring how the presenter remounts the
/// stage on slide change.
pub fn export_deck(
    deck: &Deck,
    theme: &Theme,
    stage_config: StageConfig,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut written = Vec::new();
    for (slide_index, slide) in deck.slides.iter().enumerate() {
        let mut stage = Stage::mount(Instant::now(), stage_config.clone());
        for (step_index, step) in slide.steps.iter().enumerate() {
            let view = slide.step_view(step_index);
            stage.set_scene(view.nodes, view.edges, &MonoMeasure);

            let overlay = SvgOverlay {
                title: Some(slide.title.as_str()),
                caption: Some(step.caption.as_str()).filter(|c| !c.is_empty()),
                badges: step
                    .badge
                    .iter()
                    .map(|b| (b.node.as_str(), b.text.as_str()))
                    .collect(),
            };
            let svg = render_svg(&stage, theme, &overlay);

            let path = output_dir.join(file_name(slide_index, step_index, &step.name));
            std::fs::write(&path, svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::debug!("wrote {}", path.display());
            written.push(path);
        }
        stage.teardown();
    }
    Ok(written)
}

/// `01-02-token.svg`: 1-based slide and step, then a filesystem-safe name.
fn file_name(slide: usize, step: usize, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("{:02}-{:02}.svg", slide + 1, step + 1)
    } else {
        format!("{:02}-{:02}-{slug}.svg", slide + 1, step + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::builtin;

    #[test]
    fn file_names_are_ordered_and_safe() {
        assert_eq!(file_name(0, 1, "token"), "01-02-token.svg");
        assert_eq!(file_name(9, 0, "Call API!"), "10-01-call-api.svg");
        assert_eq!(file_name(0, 0, "???"), "01-01.svg");
    }

    #[test]
    fn exports_one_svg_per_step() {
        let deck = builtin::load("oidc").unwrap();
        let dir = std::env::temp_dir().join(format!("authdeck-export-{}", std::process::id()));
        let written =
            export_deck(&deck, &Theme::light(), StageConfig::default(), &dir).unwrap();

        assert_eq!(written.len(), deck.step_count());
        for path in &written {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.starts_with("<svg"));
            assert!(svg.ends_with("</svg>"));
        }
        let _ = std::fs::remove_dir_all(dir);
    }
}
