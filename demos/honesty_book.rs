/// Composes the honesty story for a boy and a girl and prints each page with
/// its wrapped lines and text-box placement.
///
/// Run with `RUST_LOG=debug` to see per-page layout events.

use std::path::Path;

use storybook_engine::core::compositor::PageCompositor;
use storybook_engine::schema::gender::GenderProfile;
use storybook_engine::schema::story::{ChildProfile, StoryBook};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let book = StoryBook::load_from_ron(Path::new("data/stories/honesty.ron"))?;
    let compositor = PageCompositor::builder()
        .reference_shaper()
        .panel_file("config/panel.ron")
        .build()?;

    let children = [
        ChildProfile::new("عمر", GenderProfile::Masculine),
        ChildProfile::new("لانا", GenderProfile::Feminine),
    ];

    for child in &children {
        println!("=== {} for {} ({}) ===", book.title, child.name, child.gender.child_noun());
        for page in compositor.compose_book(&book, "3-4", child)? {
            println!("\n[{}] {}", page.page_number, page.text);
            for line in &page.layout.logical_lines {
                println!("    | {}", line);
            }
            if let Some(plan) = &page.text_box {
                println!(
                    "    box at ({:.0}, {:.0}) size {:.0}x{:.0}",
                    plan.rect.left, plan.rect.top, plan.rect.width, plan.rect.height
                );
            }
        }
        println!();
    }

    Ok(())
}
