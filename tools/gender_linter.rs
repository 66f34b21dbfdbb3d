/// Gender Linter — checks rule table consistency and scans the feminine
/// adaptation of every story page for residual masculine forms.
///
/// Usage: gender_linter <stories.ron|stories_dir> [--rules <file>]...

use std::path::{Path, PathBuf};
use std::process;

use storybook_engine::core::lint::Linter;
use storybook_engine::core::morph::GenderMorphAdapter;
use storybook_engine::core::rules::RuleTable;
use storybook_engine::schema::gender::GenderProfile;
use storybook_engine::schema::story::StoryBook;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: gender_linter <stories.ron|stories_dir> [--rules <file>]...");
        process::exit(0);
    }

    let stories_path = Path::new(&args[1]);
    let mut rule_files = Vec::new();

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--rules" && i + 1 < args.len() {
            i += 1;
            rule_files.push(args[i].clone());
        } else {
            eprintln!("Unknown argument: {}", args[i]);
            process::exit(1);
        }
        i += 1;
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Built-in table first, then each overlay in order.
    let mut rules = RuleTable::builtin().clone();
    for file in &rule_files {
        match RuleTable::load_from_ron(Path::new(file)).and_then(|overlay| rules.merge(overlay)) {
            Ok(()) => println!("  Merged rules: {}", file),
            Err(e) => errors.push(format!("{}: {}", file, e)),
        }
    }
    println!(
        "Loaded {} rules (dialect '{}', version {})",
        rules.len(),
        rules.dialect,
        rules.version
    );

    for issue in rules.validate() {
        errors.push(format!("rule table: {}", issue));
    }

    let mut story_files = Vec::new();
    if stories_path.is_file() {
        story_files.push(stories_path.to_path_buf());
    } else if stories_path.is_dir() {
        collect_ron_files(stories_path, &mut story_files);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", stories_path.display());
        process::exit(1);
    }

    let adapter = GenderMorphAdapter::new(&rules);
    let linter = Linter::new(&rules);
    let mut pages = 0usize;

    for path in &story_files {
        let book = match StoryBook::load_from_ron(path) {
            Ok(book) => book,
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };
        println!("  Loaded: {} ({})", path.display(), book.title);

        let mut book_pages: Vec<_> = book.all_pages().collect();
        book_pages.sort_by(|a, b| a.0.cmp(b.0).then(a.1.page_number.cmp(&b.1.page_number)));

        for (age_group, page) in book_pages {
            pages += 1;
            let adapted = adapter.adapt(&page.text, GenderProfile::Feminine);
            for finding in linter.lint(&adapted) {
                warnings.push(format!(
                    "{} [{}] page {}: {} in \"{}\"",
                    book.title, age_group, page.page_number, finding, adapted
                ));
            }
        }
    }

    println!("\n=== Gender Lint Report ===\n");
    println!("Checked {} pages in {} files", pages, story_files.len());

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_ron_files(dir: &Path, out: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                collect_ron_files(&path, out);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                out.push(path);
            }
        }
    }
}
