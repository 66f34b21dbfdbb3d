/// Line breaking integration tests: width, coverage and box-height
/// invariants against the reference Arabic shaper.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use storybook_engine::core::layout::{pack, LayoutError};
use storybook_engine::core::shaping::{ArabicShaper, GlyphMetrics, TextShaper};
use storybook_engine::schema::geometry::BoxGeometry;

const WORDS: &[&str] = &[
    "كان", "يا", "ما", "فيه", "شجر", "كتير", "وخروف", "بيقول", "ماء", "بتلعب", "بالكورة.",
    "الكورة", "طارت..", "بوم!", "خبطت", "في", "الزرع", "بطلتنا", "فكرت..", "لا،", "أنا",
    "استيقظت", "الصدق", "جميل", "Lana", "2024", "قَالَت",
];

fn random_text(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..40);
    (0..len)
        .map(|_| *WORDS.choose(rng).unwrap())
        .collect::<Vec<_>>()
        .join(" ")
}

fn geometry(max_width: f32) -> BoxGeometry {
    BoxGeometry {
        max_width,
        ..BoxGeometry::default()
    }
}

#[test]
fn lines_fit_and_cover_every_word() {
    let shaper = ArabicShaper::default();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let text = random_text(&mut rng);
        let g = geometry(rng.gen_range(120.0..1000.0));
        let layout = pack(&text, &g, &shaper).unwrap();

        let rejoined: Vec<&str> = layout
            .logical_lines
            .iter()
            .flat_map(|line| line.split_whitespace())
            .collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);

        assert_eq!(layout.lines.len(), layout.logical_lines.len());
        for (visual, logical) in layout.lines.iter().zip(&layout.logical_lines) {
            let width = shaper.measure(visual).unwrap().width;
            let single_word = logical.split_whitespace().count() == 1;
            assert!(
                width <= g.text_width() || single_word,
                "line '{logical}' is {width} wide, limit {}",
                g.text_width()
            );
        }
    }
}

#[test]
fn greedy_lines_could_not_take_the_next_word() {
    let shaper = ArabicShaper::default();
    let mut rng = StdRng::seed_from_u64(9);

    for _ in 0..100 {
        let text = random_text(&mut rng);
        let g = geometry(400.0);
        let layout = pack(&text, &g, &shaper).unwrap();

        for pair in layout.logical_lines.windows(2) {
            let next_word = pair[1].split_whitespace().next().unwrap();
            let extended = format!("{} {}", pair[0], next_word);
            let width = shaper
                .measure(&shaper.shape(&extended).unwrap())
                .unwrap()
                .width;
            assert!(width > g.text_width(), "'{extended}' would have fit");
        }
    }
}

#[test]
fn box_grows_by_one_spaced_line_per_line() {
    let shaper = ArabicShaper::default();
    let g = geometry(300.0);
    let layout = pack(&WORDS.join(" "), &g, &shaper).unwrap();
    assert!(layout.line_count() > 2);

    let expected = 2.0 * g.padding_y
        + layout.line_height
        + (layout.line_count() - 1) as f32 * layout.line_height * g.line_spacing_factor;
    assert!((layout.box_height - expected).abs() < 1e-3);
    assert!((layout.box_bottom() - (g.panel_height - g.bottom_margin)).abs() < 1e-3);
}

#[test]
fn shaped_measurement_packs_more_than_raw_letters() {
    // Shaped glyphs are narrower than unshaped letters, so a line measured after
    // shaping holds at least as many words as one measured raw.
    let shaper = ArabicShaper::default();
    let text = "بطلتنا فكرت بتلعب بالكورة استيقظت بطلتنا فكرت بتلعب بالكورة";
    let g = geometry(500.0);
    let layout = pack(text, &g, &shaper).unwrap();

    let raw_width = shaper.measure(&layout.logical_lines[0]).unwrap().width;
    let shaped_width = shaper.measure(&layout.lines[0]).unwrap().width;
    assert!(shaped_width < raw_width);
}

#[test]
fn font_size_changes_line_count() {
    let text = WORDS.join(" ");
    let g = geometry(600.0);
    let small = pack(&text, &g, &ArabicShaper::new(GlyphMetrics::with_font_size(24.0))).unwrap();
    let large = pack(&text, &g, &ArabicShaper::new(GlyphMetrics::with_font_size(48.0))).unwrap();
    assert!(large.line_count() > small.line_count());
    assert!(large.line_height > small.line_height);
}

#[test]
fn single_long_word_overflows_on_its_own_line() {
    let shaper = ArabicShaper::default();
    let word = "استيقظت".repeat(4);
    let layout = pack(&word, &geometry(50.0), &shaper).unwrap();
    assert_eq!(layout.logical_lines, vec![word]);
    assert!(shaper.measure(&layout.lines[0]).unwrap().width > 50.0);
}

#[test]
fn empty_input_with_production_geometry() {
    let shaper = ArabicShaper::default();
    let layout = pack("", &geometry(900.0), &shaper).unwrap();
    assert!(layout.lines.is_empty());
    assert_eq!(layout.box_height, 0.0);
}

#[test]
fn zero_width_box_is_a_configuration_error() {
    let shaper = ArabicShaper::default();
    let result = pack("قالت", &geometry(0.0), &shaper);
    assert!(matches!(result, Err(LayoutError::InvalidMaxWidth(w)) if w == 0.0));
}
