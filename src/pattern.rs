use crate::geometry::Point;
use palette::Srgb;
use serde::{Deserialize, Serialize};

/// Needle instruction kinds, in the order of their machine codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Stitch,
    Jump,
    Trim,
    ColorChange,
    End,
}

impl CommandKind {
    /// Numeric code used in stitch logs (stitch 0 .. end 4).
    pub fn code(self) -> u8 {
        match self {
            CommandKind::Stitch => 0,
            CommandKind::Jump => 1,
            CommandKind::Trim => 2,
            CommandKind::ColorChange => 3,
            CommandKind::End => 4,
        }
    }
}

/// One entry of the command log: where the needle is and what it does there.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchCommand {
    pub x: f64,
    pub y: f64,
    pub kind: CommandKind,
}

impl StitchCommand {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Command log under construction plus the needle position it leaves behind.
///
/// Every synthesizer writes into a run handed to it explicitly; nothing else
/// holds builder state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchRun {
    commands: Vec<StitchCommand>,
    cursor: Point,
}

impl StitchRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn commands(&self) -> &[StitchCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Stitch at an absolute position.
    pub fn stitch_to(&mut self, p: Point) {
        self.push_at(p, CommandKind::Stitch);
    }

    /// Stitch relative to the current needle position.
    pub fn stitch_by(&mut self, dx: f64, dy: f64) {
        self.push_at(self.cursor.offset(dx, dy), CommandKind::Stitch);
    }

    /// Needle-up move relative to the current needle position.
    pub fn jump_by(&mut self, dx: f64, dy: f64) {
        self.push_at(self.cursor.offset(dx, dy), CommandKind::Jump);
    }

    /// Record a command at the current needle position without moving.
    pub fn command(&mut self, kind: CommandKind) {
        self.push_at(self.cursor, kind);
    }

    pub fn into_commands(self) -> Vec<StitchCommand> {
        self.commands
    }

    /// Move all of `other`'s commands onto the end of this run.
    pub fn append(&mut self, other: StitchRun) {
        if other.commands.is_empty() {
            return;
        }
        self.cursor = other.cursor;
        self.commands.extend(other.commands);
    }

    fn push_at(&mut self, p: Point, kind: CommandKind) {
        self.cursor = p;
        self.commands.push(StitchCommand {
            x: p.x,
            y: p.y,
            kind,
        });
    }
}

/// A thread slot in the color sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub hex: String,
    /// Parsed color; `None` when the key is not a hex color.
    pub rgb: Option<[u8; 3]>,
}

impl Thread {
    pub fn from_hex(hex: &str) -> Self {
        let rgb = hex
            .trim()
            .parse::<Srgb<u8>>()
            .ok()
            .map(|c| [c.red, c.green, c.blue]);
        Self {
            hex: hex.to_string(),
            rgb,
        }
    }
}

/// Finished stitch program: command log plus thread list.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    stitches: Vec<StitchCommand>,
    threads: Vec<Thread>,
}

impl Pattern {
    pub(crate) fn new(stitches: Vec<StitchCommand>, threads: Vec<Thread>) -> Self {
        Self { stitches, threads }
    }

    pub fn stitches(&self) -> &[StitchCommand] {
        &self.stitches
    }

    /// Distinct thread colors in first-use order.
    ///
    /// This is not one entry per color change: when colors interleave, the
    /// log holds more `ColorChange` commands than threads after the first.
    /// Map each change to a thread by its color, not by position.
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn count(&self, kind: CommandKind) -> usize {
        self.stitches.iter().filter(|c| c.kind == kind).count()
    }
}
