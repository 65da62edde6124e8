//! Quick benchmark for template parsing and substitution

use std::time::Instant;

use cliform::template::{format, parse_line};
use cliform::{Context, ElementGenerator, HandlerRegistry};

fn main() {
    let templates = vec![
        "Simple text with no variables",
        "Hello $name",
        "Welcome back, ${first} ${last}! You are 100% ready.",
        "Password for ${user}: [!checkPassword]",
        "$$5 off for ${member} with code $code today [apply]",
    ];

    println!("Template Parsing Performance Test");
    println!("=================================\n");

    for template in &templates {
        let iterations = 100_000;
        let start = Instant::now();

        for _ in 0..iterations {
            let _ = parse_line("bench", 1, template);
        }

        let elapsed = start.elapsed();
        let per_op = elapsed / iterations;

        println!("Template: {:60}", format!("\"{}\"", template));
        println!("  Time for {} iterations: {:?}", iterations, elapsed);
        println!("  Per operation: {:?}\n", per_op);
    }

    println!("Substitution Performance");
    println!("========================\n");

    let ctx: Context = [
        ("name", "Ada"),
        ("first", "Ada"),
        ("last", "Lovelace"),
        ("user", "ada"),
        ("host", "engine"),
        ("member", "gold"),
        ("code", "SAVE5"),
    ]
    .into_iter()
    .collect();
    let registry = HandlerRegistry::new();

    let generators: Vec<ElementGenerator> = templates
        .iter()
        .filter_map(|t| parse_line("bench", 1, t).ok())
        .map(|spec| ElementGenerator::bind("bench", spec, &registry))
        .collect();

    let iterations = 100_000;
    let start = Instant::now();
    for _ in 0..iterations {
        for generator in &generators {
            let _ = generator.render_text(&ctx);
        }
    }
    let elapsed = start.elapsed();
    println!(
        "Rendering {} lines x {} iterations: {:?}",
        generators.len(),
        iterations,
        elapsed
    );

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = format::apply("%s and %s are 100%% %s", &["this", "that", "done"]);
    }
    println!("format::apply x {}: {:?}", iterations, start.elapsed());
}
