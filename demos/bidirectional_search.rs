//! Bidirectional r-index Demo
//!
//! Builds an index, grows patterns on both ends and locates them.
//!
//! ```bash
//! cargo run --example bidirectional_search
//! ```

use br_index::{BrIndex, Direction};

fn main() -> br_index::Result<()> {
    println!("=== br-index Bidirectional Search Demo ===\n");

    let text = b"the quick brown fox jumps over the lazy dog. \
                 the fox was quick and the dog was lazy. \
                 a quick brown dog outfoxed a lazy fox.";

    println!("Text ({} bytes):", text.len());
    println!("  \"{}\"", String::from_utf8_lossy(text));

    let index: BrIndex = BrIndex::build(text)?;

    println!(
        "\n  runs: {} forward, {} reverse",
        index.number_of_runs(Direction::Forward),
        index.number_of_runs(Direction::Reverse)
    );

    println!("\n--- One-shot Queries ---\n");

    for query in ["fox", "the", "quick", "lazy", "cat", "brown fox"] {
        let positions = index.locate_pattern(query.as_bytes());
        if positions.is_empty() {
            println!("  \"{}\" -> not found", query);
        } else {
            println!("  \"{}\" -> {} occurrences at positions {:?}", query, positions.len(), positions);
        }
    }

    // Grow "quick" outwards from 'i', watching the match set shrink.
    println!("\n--- Growing a Pattern from its Middle ---\n");

    let mut search = index.search();
    search.left_extension(b'i');
    println!("  {:<8} -> {} occurrences", "i", search.count());

    let steps: [(bool, u8); 4] = [(true, b'u'), (false, b'c'), (true, b'q'), (false, b'k')];
    let mut shown = String::from("i");
    for (left, c) in steps {
        if left {
            search.left_extension(c);
            shown.insert(0, c as char);
        } else {
            search.right_extension(c);
            shown.push(c as char);
        }
        println!("  {:<8} -> {} occurrences", shown, search.count());
    }

    let mut positions = search.locate();
    positions.sort_unstable();
    println!("\n  \"{}\" found at {:?}", shown, positions);

    println!("\n--- Space ---\n");
    println!("{}", index.space_breakdown());

    Ok(())
}
