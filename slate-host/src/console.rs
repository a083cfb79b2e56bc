//! Operator console: turns typed lines into drawing commands.
//!
//! ```text
//! line X1 Y1 X2 Y2 [COLOR] [WIDTH]
//! rect X1 Y1 X2 Y2 [COLOR] [WIDTH]
//! oval X1 Y1 X2 Y2 [COLOR] [WIDTH]
//! text X Y WORDS...
//! erase X1 Y1 X2 Y2 [WIDTH]
//! clear
//! color COLOR | brush N
//! peers | fingerprint | help | quit
//! ```

use slate_core::Command;

use crate::config::ConsoleConfig;

pub const HELP: &str = "\
commands:
  line X1 Y1 X2 Y2 [COLOR] [WIDTH]   straight stroke
  rect X1 Y1 X2 Y2 [COLOR] [WIDTH]   rectangle outline
  oval X1 Y1 X2 Y2 [COLOR] [WIDTH]   ellipse outline
  text X Y WORDS...                  label in the brush colour
  erase X1 Y1 X2 Y2 [WIDTH]          stroke in the eraser colour
  clear                              wipe the canvas everywhere
  color COLOR                        set the brush colour
  brush N                            set the brush size
  peers                              list connected clients
  fingerprint                        digest of the host canvas
  quit                               disconnect everyone and exit";

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    /// Apply locally and broadcast.
    Draw(Command),
    /// Brush settings changed.
    Settings { color: String, size: u32 },
    Peers,
    Fingerprint,
    Help,
    Quit,
}

/// Parser state: the current brush.
#[derive(Debug, Clone)]
pub struct Console {
    brush_color: String,
    eraser_color: String,
    brush_size: u32,
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            brush_color: config.brush_color.clone(),
            eraser_color: config.eraser_color.clone(),
            brush_size: config.brush_size.max(1),
        }
    }

    pub fn brush_color(&self) -> &str {
        &self.brush_color
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(&mut self, input: &str) -> Result<Option<ConsoleAction>, String> {
        let mut words = input.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let action = match verb.to_ascii_lowercase().as_str() {
            "line" => {
                let (x1, y1, x2, y2, color, width) = self.shape_args("line", &args)?;
                ConsoleAction::Draw(Command::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    width,
                })
            }
            "rect" | "rectangle" => {
                let (x1, y1, x2, y2, color, width) = self.shape_args("rect", &args)?;
                ConsoleAction::Draw(Command::Rectangle {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    width,
                })
            }
            "oval" => {
                let (x1, y1, x2, y2, color, width) = self.shape_args("oval", &args)?;
                ConsoleAction::Draw(Command::Oval {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    width,
                })
            }
            "erase" => {
                if !(4..=5).contains(&args.len()) {
                    return Err("erase requires X1 Y1 X2 Y2 [WIDTH]".to_string());
                }
                let width = match args.get(4) {
                    Some(w) => parse_size(w)?,
                    None => self.brush_size,
                };
                ConsoleAction::Draw(Command::Line {
                    x1: parse_coord(args[0])?,
                    y1: parse_coord(args[1])?,
                    x2: parse_coord(args[2])?,
                    y2: parse_coord(args[3])?,
                    color: self.eraser_color.clone(),
                    width,
                })
            }
            "text" => {
                if args.len() < 3 {
                    return Err("text requires X Y WORDS...".to_string());
                }
                ConsoleAction::Draw(Command::Text {
                    x: parse_coord(args[0])?,
                    y: parse_coord(args[1])?,
                    text: args[2..].join(" "),
                    color: self.brush_color.clone(),
                    size: self.brush_size.saturating_mul(2),
                })
            }
            "clear" => ConsoleAction::Draw(Command::Clear),
            "color" | "colour" => {
                let [color] = args[..] else {
                    return Err("color requires exactly one COLOR".to_string());
                };
                self.brush_color = color.to_string();
                self.settings()
            }
            "brush" => {
                let [size] = args[..] else {
                    return Err("brush requires a size".to_string());
                };
                self.brush_size = parse_size(size)?;
                self.settings()
            }
            "peers" => ConsoleAction::Peers,
            "fingerprint" => ConsoleAction::Fingerprint,
            "help" | "?" => ConsoleAction::Help,
            "quit" | "exit" => ConsoleAction::Quit,
            other => return Err(format!("unknown command: '{other}' (try 'help')")),
        };
        Ok(Some(action))
    }

    fn settings(&self) -> ConsoleAction {
        ConsoleAction::Settings {
            color: self.brush_color.clone(),
            size: self.brush_size,
        }
    }

    /// `X1 Y1 X2 Y2 [COLOR] [WIDTH]`, with the brush filling the gaps.
    ///
    /// A lone fifth argument is a width if it parses as one.
    fn shape_args(
        &self,
        verb: &str,
        args: &[&str],
    ) -> Result<(f64, f64, f64, f64, String, u32), String> {
        if !(4..=6).contains(&args.len()) {
            return Err(format!("{verb} requires X1 Y1 X2 Y2 [COLOR] [WIDTH]"));
        }
        let (color, width) = match &args[4..] {
            [] => (self.brush_color.clone(), self.brush_size),
            [only] => match only.parse::<u32>() {
                Ok(_) => (self.brush_color.clone(), parse_size(only)?),
                Err(_) => (only.to_string(), self.brush_size),
            },
            [color, width, ..] => (color.to_string(), parse_size(width)?),
        };
        Ok((
            parse_coord(args[0])?,
            parse_coord(args[1])?,
            parse_coord(args[2])?,
            parse_coord(args[3])?,
            color,
            width,
        ))
    }
}

fn parse_coord(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("not a coordinate: '{s}'")),
    }
}

fn parse_size(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("not a positive size: '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        Console::new(&ConsoleConfig::default())
    }

    fn draw(console: &mut Console, line: &str) -> Command {
        match console.parse(line) {
            Ok(Some(ConsoleAction::Draw(cmd))) => cmd,
            other => panic!("expected a draw action for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn line_with_explicit_style() {
        assert_eq!(
            draw(&mut console(), "line 0 0 10 10 black 2"),
            Command::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
                color: "black".into(),
                width: 2,
            }
        );
    }

    #[test]
    fn shapes_fall_back_to_the_brush() {
        let mut c = console();
        assert_eq!(
            draw(&mut c, "rect 5 5 50 50"),
            Command::Rectangle {
                x1: 5.0,
                y1: 5.0,
                x2: 50.0,
                y2: 50.0,
                color: "black".into(),
                width: 5,
            }
        );
        match draw(&mut c, "oval 1 2 3 4 9") {
            Command::Oval { color, width, .. } => {
                assert_eq!(color, "black");
                assert_eq!(width, 9);
            }
            other => panic!("{other:?}"),
        }
        match draw(&mut c, "rectangle 1 2 3 4 #ff0000") {
            Command::Rectangle { color, width, .. } => {
                assert_eq!(color, "#ff0000");
                assert_eq!(width, 5);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn brush_settings_carry_over() {
        let mut c = console();
        assert_eq!(
            c.parse("color red").unwrap(),
            Some(ConsoleAction::Settings {
                color: "red".into(),
                size: 5
            })
        );
        c.parse("brush 3").unwrap();
        assert_eq!(c.brush_size(), 3);

        match draw(&mut c, "text 10 20 hello   world") {
            Command::Text {
                text, color, size, ..
            } => {
                assert_eq!(text, "hello world");
                assert_eq!(color, "red");
                assert_eq!(size, 6);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn erase_uses_the_eraser_colour() {
        match draw(&mut console(), "erase 0 0 100 100 12") {
            Command::Line { color, width, .. } => {
                assert_eq!(color, "white");
                assert_eq!(width, 12);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn control_words() {
        let mut c = console();
        assert_eq!(c.parse("clear").unwrap(), Some(ConsoleAction::Draw(Command::Clear)));
        assert_eq!(c.parse("PEERS").unwrap(), Some(ConsoleAction::Peers));
        assert_eq!(c.parse("fingerprint").unwrap(), Some(ConsoleAction::Fingerprint));
        assert_eq!(c.parse("help").unwrap(), Some(ConsoleAction::Help));
        assert_eq!(c.parse("quit").unwrap(), Some(ConsoleAction::Quit));
        assert_eq!(c.parse("   ").unwrap(), None);
    }

    #[test]
    fn bad_input_is_rejected() {
        let mut c = console();
        assert!(c.parse("triangle 0 0 1 1").is_err());
        assert!(c.parse("line 0 0 10").is_err());
        assert!(c.parse("line a 0 10 10").is_err());
        assert!(c.parse("line 0 0 10 10 red 0").is_err());
        assert!(c.parse("line 0 0 10 10 red -2").is_err());
        assert!(c.parse("line inf 0 10 10").is_err());
        assert!(c.parse("brush 0").is_err());
        assert!(c.parse("color").is_err());
        assert!(c.parse("text 1 2").is_err());
        assert_eq!(c.brush_size(), 5);
    }
}
