/// Preview — interactive shell for checking adaptation and text-box layout.
///
/// Usage: preview [--stories <file>] [--rules <file>]... [--panel <file>]
///                [--name <child>] [--gender <label>] [--age <group>]
///
/// Commands:
///   adapt <text>        — adapt text for the current child and lint it
///   pack <text>         — adapt, fill placeholders and wrap into the box
///   book                — compose every page of the loaded story
///   page <n>            — compose a single page
///   svg <n> <file>      — write page n's text box as an SVG panel
///   name <name>         — set the child's name
///   gender <label>      — set the child's gender (boy/girl, ولد/بنت)
///   age <group>         — set the age group
///   help                — list commands
///   quit                — exit

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;

use storybook_engine::core::compositor::{ComposedPage, PageCompositor};
use storybook_engine::core::render::{BoxRect, PanelCanvas, Rgb};
use storybook_engine::schema::gender::GenderProfile;
use storybook_engine::schema::story::{ChildProfile, StoryBook, StoryPage, DEFAULT_AGE_GROUP};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_usage();
        return;
    }

    let mut stories_path = None;
    let mut panel_path = None;
    let mut rule_files = Vec::new();
    let mut child = ChildProfile::new("سلمى", GenderProfile::Feminine);
    let mut age_group = DEFAULT_AGE_GROUP.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stories" if i + 1 < args.len() => {
                i += 1;
                stories_path = Some(args[i].clone());
            }
            "--rules" if i + 1 < args.len() => {
                i += 1;
                rule_files.push(args[i].clone());
            }
            "--panel" if i + 1 < args.len() => {
                i += 1;
                panel_path = Some(args[i].clone());
            }
            "--name" if i + 1 < args.len() => {
                i += 1;
                child.name = args[i].clone();
            }
            "--gender" if i + 1 < args.len() => {
                i += 1;
                match GenderProfile::from_label(&args[i]) {
                    Some(gender) => child.gender = gender,
                    None => {
                        eprintln!("Unknown gender: {}", args[i]);
                        std::process::exit(1);
                    }
                }
            }
            "--age" if i + 1 < args.len() => {
                i += 1;
                age_group = args[i].clone();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = PageCompositor::builder().reference_shaper();
    for file in &rule_files {
        builder = builder.rules_file(file);
    }
    if let Some(ref path) = panel_path {
        builder = builder.panel_file(path);
    }
    let compositor = match builder.build() {
        Ok(compositor) => compositor,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let book = match stories_path {
        Some(ref path) => match StoryBook::load_from_ron(Path::new(path)) {
            Ok(book) => Some(book),
            Err(e) => {
                eprintln!("ERROR: Failed to load stories: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    println!(
        "Loaded {} rules (dialect '{}')",
        compositor.rules().len(),
        compositor.rules().dialect
    );
    if let Some(ref book) = book {
        println!("Story: {} ({})", book.title, book.value);
    }
    println!("Child: {} ({})", child.name, child.gender.child_noun());
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };
        let value = book.as_ref().map(|b| b.value.as_str()).unwrap_or("الصدق");

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "adapt" => {
                if rest.is_empty() {
                    println!("Usage: adapt <text>");
                    continue;
                }
                let adapted = compositor.adapt(rest, child.gender);
                println!("{}", adapted);
                if !child.gender.is_identity() {
                    for finding in compositor.linter().lint(&adapted) {
                        println!("  lint: {}", finding);
                    }
                }
            }
            "pack" => {
                if rest.is_empty() {
                    println!("Usage: pack <text>");
                    continue;
                }
                let page = StoryPage {
                    page_number: 0,
                    text: rest.to_string(),
                    prompt: None,
                };
                match compositor.compose_page(&page, &child, value) {
                    Ok(composed) => print_page(&composed),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "book" => {
                let Some(ref book) = book else {
                    println!("No story loaded. Start with --stories <file>.");
                    continue;
                };
                match compositor.compose_book(book, &age_group, &child) {
                    Ok(pages) => pages.iter().for_each(print_page),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "page" | "svg" => {
                let Some(ref book) = book else {
                    println!("No story loaded. Start with --stories <file>.");
                    continue;
                };
                let mut parts = rest.split_whitespace();
                let number = parts.next().and_then(|n| n.parse::<u32>().ok());
                let out_path = parts.next();
                let (Some(number), true) = (number, cmd == "page" || out_path.is_some()) else {
                    println!("Usage: page <n> | svg <n> <file>");
                    continue;
                };

                let page = match book.pages_for(&age_group) {
                    Ok(pages) => pages.iter().find(|p| p.page_number == number),
                    Err(e) => {
                        println!("ERROR: {}", e);
                        continue;
                    }
                };
                let Some(page) = page else {
                    println!("No page {} in age group '{}'", number, age_group);
                    continue;
                };
                let composed = match compositor.compose_page(page, &child, &book.value) {
                    Ok(composed) => composed,
                    Err(e) => {
                        println!("ERROR: {}", e);
                        continue;
                    }
                };
                print_page(&composed);

                if let Some(path) = out_path {
                    let panel = compositor.panel();
                    let mut canvas = SvgCanvas::new(panel.panel_width, panel.panel_height);
                    compositor.render(&composed, &mut canvas);
                    match std::fs::write(path, canvas.finish()) {
                        Ok(()) => println!("Wrote {}", path),
                        Err(e) => println!("ERROR: {}", e),
                    }
                }
            }
            "name" => {
                if rest.is_empty() {
                    println!("Current: {}", child.name);
                } else {
                    child.name = rest.to_string();
                    println!("Name set to '{}'", child.name);
                }
            }
            "gender" => match GenderProfile::from_label(rest) {
                Some(gender) => {
                    child.gender = gender;
                    println!("Gender set to {:?}", gender);
                }
                None => println!("Usage: gender <boy|girl|ولد|بنت>  (current: {:?})", child.gender),
            },
            "age" => {
                if rest.is_empty() {
                    println!("Current: {}", age_group);
                } else {
                    age_group = rest.to_string();
                    println!("Age group set to '{}'", age_group);
                }
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }
    }
}

fn print_page(page: &ComposedPage) {
    println!("\n--- Page {} ---", page.page_number);
    println!("{}", page.text);
    if let Some(ref prompt) = page.prompt {
        println!("  prompt: {}", prompt);
    }
    for line in &page.layout.logical_lines {
        println!("  | {}", line);
    }
    match page.text_box {
        Some(ref plan) => println!(
            "  box: left={:.0} top={:.0} width={:.0} height={:.0} ({} lines, line height {:.1})",
            plan.rect.left,
            plan.rect.top,
            plan.rect.width,
            plan.rect.height,
            plan.lines.len(),
            page.layout.line_height
        ),
        None => println!("  box: (empty)"),
    }
}

/// Writes the text box as a standalone SVG document. Lines are already in
/// visual order, so bidi is overridden to keep the viewer from reordering.
struct SvgCanvas {
    width: f32,
    height: f32,
    body: String,
}

impl SvgCanvas {
    fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
             <rect width=\"{w}\" height=\"{h}\" fill=\"#DDE8D0\"/>\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

impl PanelCanvas for SvgCanvas {
    fn fill_rounded_rect(&mut self, rect: &BoxRect, radius: f32, color: Rgb) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{}\"/>",
            rect.left,
            rect.top,
            rect.width,
            rect.height,
            radius,
            color.to_hex()
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Rgb) {
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" dominant-baseline=\"hanging\" \
             direction=\"ltr\" unicode-bidi=\"bidi-override\">{}</text>",
            x,
            y,
            font_size,
            color.to_hex(),
            escaped
        );
    }
}

fn print_usage() {
    println!("Preview — interactive shell for gender adaptation and text-box layout.");
    println!();
    println!("Usage: preview [--stories <file>] [--rules <file>]... [--panel <file>]");
    println!("               [--name <child>] [--gender <label>] [--age <group>]");
    println!();
    println!("  --stories <file>  Story book RON file");
    println!("  --rules <file>    Rule overlay merged over the built-in table (repeatable)");
    println!("  --panel <file>    Panel config RON file (default: built-in 1024x1024)");
    println!("  --name <child>    Child's name (default: سلمى)");
    println!("  --gender <label>  boy/girl or ولد/بنت (default: girl)");
    println!("  --age <group>     Age group (default: default)");
}

fn print_help() {
    println!("Commands:");
    println!("  adapt <text>     Adapt text for the current child and lint it");
    println!("  pack <text>      Adapt, fill placeholders and wrap into the text box");
    println!("  book             Compose every page of the loaded story");
    println!("  page <n>         Compose a single page");
    println!("  svg <n> <file>   Write page n's text box as an SVG panel");
    println!("  name <name>      Set the child's name");
    println!("  gender <label>   Set the child's gender");
    println!("  age <group>      Set the age group");
    println!("  help             Show this help");
    println!("  quit             Exit");
}
