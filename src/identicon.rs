//! Deterministic visual fingerprint of a (full name, master secret) pair.
//!
//! The identicon lets a user spot a typo in their master password before
//! it silently derives the wrong credentials: it is shown once up front
//! and should look the same every time the same secret is entered. The
//! glyph tables below are a compatibility surface and must be reproduced
//! exactly as published.

use crate::crypto;

/// One of the seven ANSI colors an identicon can be rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnsiColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl AnsiColor {
    const ALL: [AnsiColor; 7] = [
        AnsiColor::Red,
        AnsiColor::Green,
        AnsiColor::Yellow,
        AnsiColor::Blue,
        AnsiColor::Magenta,
        AnsiColor::Cyan,
        AnsiColor::White,
    ];

    fn from_index(i: usize) -> AnsiColor {
        AnsiColor::ALL[i % AnsiColor::ALL.len()]
    }

    /// The SGR foreground color code for this color (30-37).
    pub fn ansi_code(&self) -> u8 {
        match self {
            AnsiColor::Red => 31,
            AnsiColor::Green => 32,
            AnsiColor::Yellow => 33,
            AnsiColor::Blue => 34,
            AnsiColor::Magenta => 35,
            AnsiColor::Cyan => 36,
            AnsiColor::White => 37,
        }
    }
}

const LEFT_ARM: [&str; 4] = ["\u{2554}", "\u{255a}", "\u{2570}", "\u{2550}"];
const BODY: [&str; 6] = ["\u{2588}", "\u{2591}", "\u{2592}", "\u{2593}", "\u{263a}", "\u{263b}"];
const RIGHT_ARM: [&str; 4] = ["\u{2557}", "\u{255d}", "\u{256f}", "\u{2550}"];
const ACCESSORY: [&str; 55] = [
    "\u{25c8}", "\u{25ce}", "\u{25d0}", "\u{25d1}", "\u{25d2}", "\u{25d3}", "\u{2600}", "\u{2601}",
    "\u{2602}", "\u{2603}", "\u{2604}", "\u{2605}", "\u{2606}", "\u{260e}", "\u{260f}", "\u{2388}",
    "\u{2302}", "\u{2618}", "\u{2622}", "\u{2623}", "\u{2615}", "\u{231a}", "\u{231b}", "\u{23f0}",
    "\u{26a1}", "\u{26c4}", "\u{26c5}", "\u{2614}", "\u{2654}", "\u{2655}", "\u{2656}", "\u{2657}",
    "\u{2658}", "\u{2659}", "\u{265a}", "\u{265b}", "\u{265c}", "\u{265d}", "\u{265e}", "\u{265f}",
    "\u{2668}", "\u{2669}", "\u{266a}", "\u{266b}", "\u{2690}", "\u{2691}", "\u{2694}", "\u{2696}",
    "\u{2699}", "\u{26a0}", "\u{2318}", "\u{23ce}", "\u{2704}", "\u{2706}", "\u{2708}",
];

/// A rendered identicon: the 4-glyph string plus the color it should be
/// displayed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identicon {
    pub glyphs: String,
    pub color: AnsiColor,
}

/// Compute the deterministic identicon for (full name, master secret).
pub fn identicon(full_name: &str, master_password: &str) -> Identicon {
    let seed = crypto::hmac_sha256(master_password.as_bytes(), full_name.as_bytes());

    let mut glyphs = String::with_capacity(4);
    glyphs.push_str(LEFT_ARM[usize::from(seed[0]) % LEFT_ARM.len()]);
    glyphs.push_str(BODY[usize::from(seed[1]) % BODY.len()]);
    glyphs.push_str(RIGHT_ARM[usize::from(seed[2]) % RIGHT_ARM.len()]);
    glyphs.push_str(ACCESSORY[usize::from(seed[3]) % ACCESSORY.len()]);

    let color = AnsiColor::from_index(usize::from(seed[4]));

    Identicon { glyphs, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identicon_is_deterministic() {
        let a = identicon("John Doe", "password");
        let b = identicon("John Doe", "password");
        assert_eq!(a, b);
    }

    #[test]
    fn identicon_changes_with_input() {
        let a = identicon("John Doe", "password");
        let b = identicon("Jane Doe", "password");
        assert_ne!(a.glyphs, b.glyphs);
    }

    #[test]
    fn identicon_has_four_glyphs() {
        let id = identicon("Max M\u{fc}ller", "passwort");
        assert_eq!(id.glyphs.chars().count(), 4);
    }
}
