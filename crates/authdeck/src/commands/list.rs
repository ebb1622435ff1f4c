use colored::Colorize;

use crate::deck::Deck;
use crate::deck::builtin::{self, BUILTIN_DECKS, DEFAULT_DECK};

/// Print every built-in deck with its slides and step names.
pub fn run() {
    for (i, deck) in BUILTIN_DECKS.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let marker = if deck.name == DEFAULT_DECK {
            " (default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("{}{marker}  {}", deck.name.bold().cyan(), deck.summary);
        match builtin::load(deck.name) {
            Ok(parsed) => {
                for line in outline(&parsed) {
                    println!("{line}");
                }
            }
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }
}

/// Indented slide and step lines for one deck.
pub fn outline(deck: &Deck) -> Vec<String> {
    deck.slides
        .iter()
        .enumerate()
        .map(|(i, slide)| {
            let steps: Vec<&str> = slide.steps.iter().map(|s| s.name.as_str()).collect();
            format!("  {}. {}: {}", i + 1, slide.title, steps.join(" \u{2192} "))
        })
        .collect()
}
