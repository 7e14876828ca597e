//! Spoken volume level parsing.
//!
//! Accepts digits ("50", "75%", "25 percent"), spelled-out numbers
//! ("twenty five") and a few descriptive words ("half", "max").
//! Levels are clamped to 0-100.

const KEYWORDS: &[(&str, u8)] = &[
    ("mute", 0),
    ("muted", 0),
    ("off", 0),
    ("silent", 0),
    ("silence", 0),
    ("low", 25),
    ("quiet", 25),
    ("soft", 25),
    ("half", 50),
    ("medium", 50),
    ("middle", 50),
    ("loud", 75),
    ("high", 75),
    ("max", 100),
    ("maximum", 100),
    ("full", 100),
    ("loudest", 100),
];

const UNITS: &[&str] = &[
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: &[(&str, u32)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// Parse a spoken volume level. `None` when nothing usable is found.
pub fn parse_volume_level(text: &str) -> Option<u8> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some(level) = parse_digits(&text) {
        return Some(clamp(level));
    }

    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if let Some(level) = parse_number_words(&words) {
        return Some(clamp(level));
    }

    words.iter().find_map(|word| {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword == word)
            .map(|(_, level)| *level)
    })
}

/// First run of ASCII digits in the text.
fn parse_digits(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    // Absurdly long numbers still mean "as loud as possible"
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

fn parse_number_words(words: &[&str]) -> Option<u32> {
    let mut total: u32 = 0;
    let mut seen = false;

    for word in words {
        if let Some(n) = UNITS.iter().position(|u| u == word) {
            total = total.saturating_add(n as u32);
            seen = true;
        } else if let Some((_, n)) = TENS.iter().find(|(t, _)| t == word) {
            total = total.saturating_add(*n);
            seen = true;
        } else if *word == "hundred" {
            total = total.max(1).saturating_mul(100);
            seen = true;
        }
    }

    seen.then_some(total)
}

fn clamp(level: u32) -> u8 {
    level.min(100) as u8
}
