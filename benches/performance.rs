use blockpad::{
    editor::{Block, BlockEditor, BlockId, BlockType, Direction, Document, KeyInput, NavKey},
    editor_display::{CURSOR_SENTINEL, EditorDisplay},
    render::{self, Caret, CaretSlot, PageView},
    theme::Theme,
};
use std::time::{Duration, Instant};

/// Performance benchmark suite for blockpad editor operations
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Page rendering performance
/// - Block store mutations on long pages
/// - Typing through the display layer
/// - Drag and drop reordering
const SMALL_DOC_BLOCKS: usize = 10;
const MEDIUM_DOC_BLOCKS: usize = 100;
const LARGE_DOC_BLOCKS: usize = 1000;
const HUGE_DOC_BLOCKS: usize = 10000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: [&str; 20] = [
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "veniam",
];

/// Create a test document with the specified number of blocks, cycling
/// through every block type
fn create_test_document(num_blocks: usize, avg_words_per_block: usize) -> Document {
    let blocks = (0..num_blocks)
        .map(|i| {
            let block_type = BlockType::ALL[i % BlockType::ALL.len()];
            let mut text = String::new();
            for j in 0..avg_words_per_block {
                if j > 0 {
                    text.push(' ');
                }
                text.push_str(SAMPLE_WORDS[(i + j) % SAMPLE_WORDS.len()]);
            }
            Block::new(BlockId::new(i as u64 + 1), block_type).with_content(text)
        })
        .collect();
    Document::new("Benchmark", blocks)
}

fn create_editor(num_blocks: usize) -> BlockEditor {
    BlockEditor::with_document("bench", create_test_document(num_blocks, 20))
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);
        println!(
            "Ops/sec:        {:.2}",
            1_000_000.0 / self.avg_duration.as_micros().max(1) as f64
        );

        if self.avg_duration.as_millis() > 100 {
            println!("\n⚠️  WARNING: Average duration > 100ms (user-perceptible lag)");
        } else if self.avg_duration.as_millis() > 16 {
            println!("\n⚠️  WARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn sizes() -> Vec<(&'static str, usize)> {
    vec![
        ("Small (10 blocks)", SMALL_DOC_BLOCKS),
        ("Medium (100 blocks)", MEDIUM_DOC_BLOCKS),
        ("Large (1000 blocks)", LARGE_DOC_BLOCKS),
        ("Huge (10000 blocks)", HUGE_DOC_BLOCKS),
    ]
}

fn iterations_for(name: &str) -> usize {
    if name.contains("Huge") { 10 } else { ITERATIONS }
}

#[test]
fn bench_rendering_performance() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║           RENDERING PERFORMANCE BENCHMARKS                     ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let theme = Theme::default();
    for (name, size) in sizes() {
        let doc = create_test_document(size, 20);
        let middle = doc.blocks()[size / 2].id;
        let view = PageView {
            title: &doc.title,
            blocks: doc.blocks(),
            focused: Some(middle),
            dragged: None,
            drop_target: None,
            caret: Some(Caret {
                slot: CaretSlot::Block(middle),
                offset: 10,
            }),
        };
        let result = benchmark(
            &format!("render_page - {}", name),
            iterations_for(name),
            || {
                let _ = render::render_page(&view, 80, &theme, CURSOR_SENTINEL);
            },
        );
        result.print();
    }
}

#[test]
fn bench_wrap_width_impact() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              WRAP WIDTH IMPACT BENCHMARKS                      ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let doc = create_test_document(MEDIUM_DOC_BLOCKS, 50);
    let theme = Theme::default();
    let view = PageView {
        title: &doc.title,
        blocks: doc.blocks(),
        focused: None,
        dragged: None,
        drop_target: None,
        caret: None,
    };

    for width in [40, 80, 120, 200] {
        let result = benchmark(
            &format!("render_page - wrap_width={}", width),
            ITERATIONS,
            || {
                let _ = render::render_page(&view, width, &theme, CURSOR_SENTINEL);
            },
        );
        result.print();
    }
}

#[test]
fn bench_store_mutations() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              BLOCK STORE MUTATION BENCHMARKS                   ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!("\nEach iteration runs insert, duplicate, move and delete on the");
    println!("last block of the page, where lookups are slowest.");

    for (name, size) in sizes() {
        let mut editor = create_editor(size);
        let result = benchmark(
            &format!("store mutations - {}", name),
            iterations_for(name),
            || {
                let last = editor.store().last_id();
                let inserted = editor.insert_after(last, BlockType::Paragraph).unwrap();
                let copy = editor.duplicate(inserted).unwrap();
                editor.move_block(copy, Direction::Up).unwrap();
                editor.delete(copy).unwrap();
                editor.delete(inserted).unwrap();
            },
        );
        result.print();
        assert_eq!(editor.blocks().len(), size);
    }
}

#[test]
fn bench_drag_and_drop() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              DRAG AND DROP BENCHMARKS                          ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, size) in sizes() {
        let mut editor = create_editor(size);
        let result = benchmark(
            &format!("drag last block to top and back - {}", name),
            iterations_for(name),
            || {
                let first = editor.store().first_id();
                let last = editor.store().last_id();
                editor.begin_drag(last).unwrap();
                editor.drop_on(first).unwrap();
                editor.begin_drag(last).unwrap();
                let new_last = editor.store().last_id();
                editor.drop_on(new_last).unwrap();
            },
        );
        result.print();
    }
}

#[test]
fn bench_full_edit_cycle() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              FULL EDIT CYCLE BENCHMARKS                        ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!("\nThis simulates the full cost of typing a character:");
    println!("  1. Replace the block content through the editor");
    println!("  2. Re-render the page");
    println!("  3. Flush pending focus against the new layout");

    for (name, size) in sizes() {
        let iterations = iterations_for(name);
        let mut display = EditorDisplay::new(create_editor(size));
        display.render(80);
        let last = display.store().last_id();
        display
            .focus_block(last, blockpad::editor::CaretPlacement::End)
            .unwrap();

        let result = benchmark(&format!("Full edit cycle - {}", name), iterations, || {
            for _ in 0..10 {
                display.insert_char('x').unwrap();
                display.render(80);
            }
            display
                .handle_nav_key(KeyInput::plain(NavKey::Enter))
                .unwrap();
            display.render(80);
        });
        result.print();

        let per_char = result.avg_duration / 11;
        println!("\nPer-keystroke cost: {:?}", per_char);

        if per_char.as_millis() > 16 {
            println!("⚠️  CRITICAL: Typing will feel laggy (>16ms per keystroke)");
        } else if per_char.as_millis() > 5 {
            println!("⚠️  WARNING: May feel sluggish on older hardware");
        }
    }
}
