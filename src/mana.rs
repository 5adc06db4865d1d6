use crate::deck::Color;

/// Coloured pips and mana value read from a `{2}{G}{G}`-style cost.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedCost {
    /// Pips per colour, indexed by `Color::index` (W..G). Hybrid symbols add fractions.
    pub pips: [f64; 5],
    pub mana_value: u32,
}

impl ParsedCost {
    pub fn pips(&self, color: Color) -> f64 {
        match color {
            Color::C => 0.0,
            c => self.pips[c.index()],
        }
    }
}

/// Parses a mana cost string symbol by symbol.
///
/// Only the front face of a `"A // B"` cost is read. Hybrid symbols split one
/// pip evenly across their alternatives (`{W/U}` gives half a pip to each,
/// `{2/W}` half a pip to white); a Phyrexian symbol counts as a full pip.
/// Any symbol outside the grammar rejects the whole string.
pub fn parse_cost(cost: &str) -> Result<ParsedCost, String> {
    let front = cost.split("//").next().unwrap_or("");
    let mut parsed = ParsedCost::default();
    let mut rest = front.trim();

    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('{') else {
            return Err(format!("unexpected text '{}' in mana cost '{}'", rest, cost));
        };
        let Some(end) = body.find('}') else {
            return Err(format!("unclosed symbol in mana cost '{}'", cost));
        };
        add_symbol(&mut parsed, &body[..end])
            .map_err(|sym| format!("invalid mana symbol '{{{}}}' in '{}'", sym, cost))?;
        rest = body[end + 1..].trim_start();
    }

    Ok(parsed)
}

fn colored(sym: &str) -> Option<Color> {
    match Color::from_symbol(sym) {
        Some(Color::C) | None => None,
        c => c,
    }
}

fn add_value<'a>(parsed: &mut ParsedCost, n: u32, sym: &'a str) -> Result<(), &'a str> {
    parsed.mana_value = parsed.mana_value.checked_add(n).ok_or(sym)?;
    Ok(())
}

fn add_symbol<'a>(parsed: &mut ParsedCost, sym: &'a str) -> Result<(), &'a str> {
    if let Ok(n) = sym.parse::<u32>() {
        return add_value(parsed, n, sym);
    }
    match sym {
        "X" | "Y" | "Z" => return Ok(()),
        "C" | "S" => return add_value(parsed, 1, sym),
        _ => {}
    }
    if let Some(c) = colored(sym) {
        parsed.pips[c.index()] += 1.0;
        return add_value(parsed, 1, sym);
    }

    let mut parts: Vec<&str> = sym.split('/').collect();
    if parts.len() < 2 {
        return Err(sym);
    }
    if parts.last() == Some(&"P") {
        parts.pop();
        if parts.len() == 1 {
            let c = colored(parts[0]).ok_or(sym)?;
            parsed.pips[c.index()] += 1.0;
            return add_value(parsed, 1, sym);
        }
    }

    // hybrid: every alternative is a colour, colorless, or a generic amount
    let share = 1.0 / parts.len() as f64;
    let mut value = 1;
    let mut split = [0.0; 5];
    for part in &parts {
        if let Some(c) = colored(part) {
            split[c.index()] += share;
        } else if *part == "C" {
            continue;
        } else if let Ok(n) = part.parse::<u32>() {
            value = value.max(n);
        } else {
            return Err(sym);
        }
    }
    for (total, add) in parsed.pips.iter_mut().zip(split) {
        *total += add;
    }
    add_value(parsed, value, sym)
}
