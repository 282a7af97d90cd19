// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_paragraphs(count: usize) -> String {
    let base = "<p>Once <strong>upon a</strong> time<br>there was <em>a <span>deeply</span> nested</em> story.</p>";
    base.repeat(count)
}

#[allow(dead_code)]
pub fn generate_lists(lists: usize, items: usize) -> String {
    let mut content = String::new();

    for list in 0..lists {
        content.push_str(&format!("<h2>List {}</h2><ul>", list));
        for item in 0..items {
            content.push_str(&format!("<li>Item {} of list {}</li>", item, list));
        }
        content.push_str("</ul>");
    }

    content
}

/// A single long block, so walks inside it dominate.
#[allow(dead_code)]
pub fn generate_long_block(segments: usize) -> String {
    let mut content = String::from("<p>");
    for i in 0..segments {
        content.push_str(&format!("word {} <em>emphasis</em><br>", i));
    }
    content.push_str("end</p>");
    content
}
