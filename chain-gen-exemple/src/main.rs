use chain_gen_core::model::text_builder::TextBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Corpus to learn from; any plain text file works
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./data/corpus.txt".to_owned());

    // Token depth: number of words grouped per chain vertex
    // A snapshot is written next to the corpus, so the second run skips parsing
    let builder = TextBuilder::new(2, &path)?;

    // Generate a few texts with growing minimum lengths
    for min_length in [0, 50, 200] {
        println!("--- at least {min_length} words ---");
        println!("{}", builder.generate_text(min_length)?);
    }

    // If the corpus file was edited in place, the snapshot no longer
    // reflects it; invalidate, rebuild and keep using the same builder
    let builder = builder.invalidate_cache()?;
    println!("--- after rebuild ---");
    println!("{}", builder.generate_text(100)?);

    Ok(())
}
