// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_outline(blocks: usize, depth: usize) -> String {
    let mut content = String::from("title:: Benchmark\n# Benchmark\n");
    for i in 0..blocks {
        let level = i % depth.max(1);
        let indent = "  ".repeat(level);
        let line = match i % 5 {
            0 => format!("TODO [#B] item {i} links [[Page {}]]", i % 17),
            1 => format!("item {i} with **bold**, `code` and #tag{}", i % 7),
            2 => format!("DONE see ((block-{i})) and [docs](https://example.com/{i})"),
            3 => format!("[ ] checkbox {i} {{{{query (todo now)}}}}"),
            _ => format!("plain item {i} ==highlight== [[Page {}]]", i % 11),
        };
        content.push_str(&format!("{indent}- {line}\n"));
        if i % 9 == 0 {
            content.push_str(&format!("{indent}  owner:: [[Person {}]]\n", i % 3));
        }
    }
    content
}

#[allow(dead_code)]
pub fn generate_collection(pages: usize, blocks: usize) -> Vec<(String, String)> {
    (0..pages)
        .map(|p| (format!("Page {p}"), generate_outline(blocks, 4)))
        .collect()
}
