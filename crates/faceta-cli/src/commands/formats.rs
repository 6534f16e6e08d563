//! `faceta formats` — list the registered detectors and hash algorithms

use faceta_formats::{FileFormat, FormatRegistry};
use faceta_hash::{registry, HashAlgorithm, HashAlgorithmId};

pub fn handle() {
    let formats = FormatRegistry::with_defaults();
    println!("Registered formats:");
    for format in formats.formats() {
        let signatures: Vec<String> = format
            .signatures()
            .iter()
            .map(|sig| {
                sig.iter()
                    .map(|byte| format!("{byte:02x}"))
                    .collect::<String>()
            })
            .collect();
        let signature = if signatures.is_empty() {
            "(header check)".to_string()
        } else {
            signatures.join(", ")
        };
        println!(
            "  {:<6} {:<24} .{:<6} {signature}",
            format.name(),
            format.media_type(),
            format.extension()
        );
    }

    println!();
    println!("Hash algorithms:");
    for id in HashAlgorithmId::all() {
        let algo = registry::algorithm(*id);
        println!(
            "  {:<8} {} bytes, URIs like {}…",
            id.name(),
            algo.size_hint(),
            algo.uri_prefix()
        );
    }
}
