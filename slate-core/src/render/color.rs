use std::fmt;

/// An opaque 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Resolve a colour token: a common name, `#rgb`, or `#rrggbb`.
    ///
    /// Returns `None` for anything else; callers pick their own fallback.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(hex) = token.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        let rgb = match token.to_ascii_lowercase().as_str() {
            "black" => Rgb(0, 0, 0),
            "white" => Rgb(255, 255, 255),
            "red" => Rgb(255, 0, 0),
            "green" => Rgb(0, 128, 0),
            "lime" => Rgb(0, 255, 0),
            "blue" => Rgb(0, 0, 255),
            "yellow" => Rgb(255, 255, 0),
            "cyan" => Rgb(0, 255, 255),
            "magenta" => Rgb(255, 0, 255),
            "gray" | "grey" => Rgb(128, 128, 128),
            "orange" => Rgb(255, 165, 0),
            "purple" => Rgb(128, 0, 128),
            "brown" => Rgb(165, 42, 42),
            "pink" => Rgb(255, 192, 203),
            _ => return None,
        };
        Some(rgb)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Rgb(channels[0], channels[1], channels[2]))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Rgb::parse("black"), Some(Rgb::BLACK));
        assert_eq!(Rgb::parse("Red"), Some(Rgb(255, 0, 0)));
        assert_eq!(Rgb::parse("grey"), Rgb::parse("gray"));
        assert_eq!(Rgb::parse("chartreuse-ish"), None);
    }

    #[test]
    fn hex() {
        assert_eq!(Rgb::parse("#1e90ff"), Some(Rgb(0x1e, 0x90, 0xff)));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#12345"), None);
        assert_eq!(Rgb::parse("#zzzzzz"), None);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Rgb(255, 0, 16).to_string(), "#ff0010");
    }
}
