//! Fuzz target for the rule compiler
//!
//! # Strategy
//!
//! - Raw text: arbitrary strings straight into the compiler
//! - Token soup: lines assembled from names, keywords, parens and noise
//! - Deep nesting: long `NOT` chains, paren runs and operator chains
//!
//! # Invariants
//!
//! - NEVER panic on malformed rule text
//! - Errors carry a line number inside the input
//! - A network that compiles renders to text that compiles back to itself

#![no_main]

use arbitrary::Arbitrary;
use boolnet_core::{ClampSet, Network};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    Raw(String),
    Tokens(Vec<Vec<Token>>),
    Deep { nots: u16, parens: u16, chain: u16 },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Token {
    Name(u8),
    Assign,
    And,
    Or,
    Not,
    Open,
    Close,
    Zero,
    One,
    Comment,
    Junk(char),
}

impl Token {
    fn render(self, out: &mut String) {
        match self {
            Self::Name(n) => out.push_str(&format!("n{}", n % 8)),
            Self::Assign => out.push('='),
            Self::And => out.push_str("AND"),
            Self::Or => out.push_str("OR"),
            Self::Not => out.push_str("NOT"),
            Self::Open => out.push('('),
            Self::Close => out.push(')'),
            Self::Zero => out.push('0'),
            Self::One => out.push('1'),
            Self::Comment => out.push('#'),
            Self::Junk(ch) => out.push(ch),
        }
        out.push(' ');
    }
}

fuzz_target!(|input: Input| {
    let text = match input {
        Input::Raw(text) => text,
        Input::Tokens(lines) => {
            let mut text = String::new();
            for line in lines.iter().take(32) {
                for token in line.iter().take(32) {
                    token.render(&mut text);
                }
                text.push('\n');
            }
            text
        },
        Input::Deep { nots, parens, chain } => {
            let operand = format!(
                "{}{}b{}",
                "NOT ".repeat(usize::from(nots % 2048)),
                "(".repeat(usize::from(parens % 2048)),
                ")".repeat(usize::from(parens % 2048))
            );
            let rhs = vec![operand; usize::from(chain % 512).max(1)].join(" AND ");
            format!("a = {rhs}\n")
        },
    };

    match Network::compile(&text, &ClampSet::new()) {
        Ok(network) => {
            let rendered = network.to_string();
            let recompiled =
                Network::compile(&rendered, &ClampSet::new()).expect("rendered rules must compile");
            assert_eq!(recompiled, network, "render/compile changed the network");
        },
        Err(err) => {
            let lines = text.lines().count().max(1);
            let line = err.line();
            assert!((1..=lines).contains(&line), "error line {line} outside 1..={lines}: {err}");
        },
    }
});
