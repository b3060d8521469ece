use company_sniffer::{EntityResolver, StructuralHints};

fn main() {
    env_logger::init();

    let resolver = EntityResolver::new().unwrap();

    let text = "Berkshire Hathaway Inc. trimmed its stake in $AAPL while IBM shares rose.";
    let hints = StructuralHints::new()
        .with_position("headline")
        .with_section("Markets");

    let result = resolver.resolve(text, "generic", &hints);

    println!("Resolved entities for the given text \"{}\"", text);
    for entity in result.entities {
        println!(
            "{} ({}): {:.2} {}",
            entity.normalized, entity.entity_type, entity.confidence.score, entity.confidence.level
        );
    }

    for diagnostic in result.diagnostics {
        println!("diagnostic: {:?}", diagnostic);
    }
}
