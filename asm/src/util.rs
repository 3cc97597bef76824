use crate::coordinator::{Assembled, Word};
use crate::parser::Stmt;
use color_print::cformat;
use std::collections::HashMap;

const RULE: usize = 24;

/// Listing of the source with addresses, encoded words and decoded
/// instructions next to each line.
pub fn format_dump(path: &str, lines: &[String], assembled: &Assembled) -> Vec<String> {
    let words: HashMap<usize, &Word> = assembled.words.iter().map(|w| (w.line, w)).collect();
    let symbols: HashMap<&str, u16> = assembled
        .symbols
        .iter()
        .map(|(name, val)| (name.as_str(), *val))
        .collect();

    let mut out = vec![format!(
        "{}+------[{}]{}",
        "-".repeat(RULE),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    )];

    for (idx, raw) in lines.iter().enumerate() {
        let line_num = idx + 1;
        let comment = raw
            .find("//")
            .map(|pos| cformat!("<dim>{}</>", raw[pos..].trim_end()))
            .unwrap_or_default();

        let body = match words.get(&idx) {
            Some(word) => format!(
                "[{:04X}] {} | {:>4}:   {} {}",
                word.pc,
                word.to_bin_string(),
                line_num,
                word.inst.cformat(),
                comment
            ),
            None => match Stmt::parse(raw) {
                Ok(Stmt::Label(name)) => {
                    let label = match symbols.get(name.as_str()) {
                        Some(val) => cformat!("<g>({})</> = <y>0x{:04X}</>", name, val),
                        None => cformat!("<r,u>({})</>", name),
                    };
                    format!("{:w$}| {:>4}: {} {}", "", line_num, label, comment, w = RULE)
                }
                _ => format!("{:w$}| {:>4}: {}", "", line_num, comment, w = RULE),
            },
        };
        out.push(body);
    }

    out.push(format!("{}+{}", "-".repeat(RULE), "-".repeat(53)));
    out
}

/// Labels and variables with their addresses, in first-use order.
pub fn format_symbols(symbols: &[(String, u16)]) -> Vec<String> {
    symbols
        .iter()
        .map(|(name, val)| cformat!("<g>{:<24}</> <y>0x{:04X}</> {:>5}", name, val, val))
        .collect()
}
