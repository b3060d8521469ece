use company_sniffer::{resolve_entities_from_text, ConfidenceLevel};
use log::{error, info};
use std::io::{self, Read};

fn main() {
    // Initialize the logger
    env_logger::init();

    // Read the input text from stdin
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        error!("Failed to read from stdin: {}", e);
        std::process::exit(1);
    }

    match resolve_entities_from_text(&input) {
        Ok(entities) => {
            info!("Resolved {} entities", entities.len());

            for entity in entities {
                let known = match &entity.known_organization {
                    Some(organization) => organization.canonical_name.as_str(),
                    None => "unknown",
                };

                println!(
                    "{} ({}): {:.2} {} [{}]",
                    entity.normalized,
                    entity.entity_type,
                    entity.confidence.score,
                    entity.confidence.level,
                    known
                );

                if entity.confidence.level != ConfidenceLevel::High {
                    if let Some(recommendation) = &entity.confidence.recommendation {
                        println!("    {}", recommendation);
                    }
                }
            }
        }
        Err(e) => {
            error!("Error resolving entities: {}", e);
            std::process::exit(1);
        }
    }
}
