use divan::Bencher;
use xml_compare::{compare_documents, diff, locate, parse_document, signature};

fn main() {
    divan::main();
}

const SIZES: &[usize] = &[10, 100, 1_000];

fn catalog(count: usize, offset: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n  <section>\n    <items>\n");
    for id in offset..offset + count {
        xml.push_str(&format!(
            "      <item id=\"{}\" kind=\"k{}\">value {}</item>\n",
            id,
            id % 7,
            id
        ));
    }
    xml.push_str("    </items>\n  </section>\n</root>\n");
    xml
}

#[divan::bench(args = SIZES)]
fn parse_catalog(bencher: Bencher, count: usize) {
    let xml = catalog(count, 0);

    bencher.bench_local(move || parse_document(&xml).expect("Failed to parse catalog"));
}

#[divan::bench(args = SIZES)]
fn signature_children(bencher: Bencher, count: usize) {
    let root = parse_document(&catalog(count, 0)).unwrap();
    let items = locate(&root, "items").unwrap().element;

    bencher.bench_local(move || items.children.iter().map(signature).count());
}

#[divan::bench(args = SIZES)]
fn diff_half_overlap(bencher: Bencher, count: usize) {
    let old_root = parse_document(&catalog(count, 0)).unwrap();
    let new_root = parse_document(&catalog(count, count / 2)).unwrap();
    let old_items = locate(&old_root, "items").unwrap().element;
    let new_items = locate(&new_root, "items").unwrap().element;

    bencher.bench_local(move || diff(&old_items.children, &new_items.children));
}

#[divan::bench(args = SIZES)]
fn compare_nested_tag(bencher: Bencher, count: usize) {
    let old_root = parse_document(&catalog(count, 0)).unwrap();
    let new_root = parse_document(&catalog(count, 1)).unwrap();

    bencher.bench_local(move || compare_documents(&old_root, &new_root, "items"));
}
