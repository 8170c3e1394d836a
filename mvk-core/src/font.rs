/// Typeface JSON fonts: the glyph outline format produced by facetype.js
/// and consumed by three.js's FontLoader.
use nalgebra::Point2;
use nom::{
    branch::alt,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map},
    multi::many0,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::error::FontError;

/// One outline drawing command, in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2<f32>),
    LineTo(Point2<f32>),
    QuadTo {
        ctrl: Point2<f32>,
        to: Point2<f32>,
    },
    CubicTo {
        ctrl1: Point2<f32>,
        ctrl2: Point2<f32>,
        to: Point2<f32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub advance: f32,
    pub outline: Vec<PathCommand>,
}

#[derive(Debug, Clone)]
pub struct Font {
    pub family: String,
    /// Font units per em
    pub resolution: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub underline_thickness: f32,
    glyphs: HashMap<char, Glyph>,
}

#[derive(Deserialize)]
struct TypefaceJson {
    glyphs: HashMap<String, GlyphJson>,
    #[serde(rename = "familyName", default)]
    family_name: String,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundingBoxJson,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
}

#[derive(Deserialize)]
struct GlyphJson {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Deserialize)]
struct BoundingBoxJson {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

impl Font {
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let raw: TypefaceJson = serde_json::from_str(json)?;

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                log::debug!("skipping multi-character glyph key {key:?}");
                continue;
            };
            let outline = match glyph.o.as_deref() {
                Some(o) => parse_outline(o).map_err(|near| FontError::Outline { glyph: c, near })?,
                None => Vec::new(),
            };
            glyphs.insert(
                c,
                Glyph {
                    advance: glyph.ha,
                    outline,
                },
            );
        }

        if glyphs.is_empty() {
            return Err(FontError::Empty);
        }

        Ok(Self {
            family: raw.family_name,
            resolution: raw.resolution,
            y_min: raw.bounding_box.y_min,
            y_max: raw.bounding_box.y_max,
            underline_thickness: raw.underline_thickness,
            glyphs,
        })
    }

    pub fn load(path: &Path) -> Result<Self, FontError> {
        let json = std::fs::read_to_string(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let font = Self::from_json(&json)?;
        log::info!(
            "loaded font {:?} ({} glyphs) from {}",
            font.family,
            font.glyphs.len(),
            path.display()
        );
        Ok(font)
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Scale from font units to scene units for a given text size
    pub fn scale(&self, size: f32) -> f32 {
        size / self.resolution
    }

    pub fn line_height(&self, size: f32) -> f32 {
        (self.y_max - self.y_min + self.underline_thickness) * self.scale(size)
    }
}

/// Parse an outline string such as `"m 0 0 l 10 0 q 20 10 15 0 z"`.
///
/// Curve commands list the end point first, then the control points.
/// On failure returns the unparsed remainder.
pub fn parse_outline(input: &str) -> Result<Vec<PathCommand>, String> {
    match all_consuming(terminated(many0(preceded(multispace0, command)), multispace0))(input) {
        Ok((_, commands)) => Ok(commands.into_iter().flatten().collect()),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(e.input.chars().take(24).collect())
        }
        Err(nom::Err::Incomplete(_)) => Err(String::new()),
    }
}

/// A command; `z` (close) yields `None` because contours are always closed
fn command(input: &str) -> IResult<&str, Option<PathCommand>> {
    alt((
        map(preceded(char('m'), point), |p| Some(PathCommand::MoveTo(p))),
        map(preceded(char('l'), point), |p| Some(PathCommand::LineTo(p))),
        map(preceded(char('q'), points::<2>), |[to, ctrl]| {
            Some(PathCommand::QuadTo { ctrl, to })
        }),
        map(preceded(char('b'), points::<3>), |[to, ctrl1, ctrl2]| {
            Some(PathCommand::CubicTo { ctrl1, ctrl2, to })
        }),
        map(char('z'), |_| None),
    ))(input)
}

fn point(input: &str) -> IResult<&str, Point2<f32>> {
    let (input, x) = preceded(multispace1, float)(input)?;
    let (input, y) = preceded(multispace1, float)(input)?;
    Ok((input, Point2::new(x, y)))
}

fn points<const N: usize>(mut input: &str) -> IResult<&str, [Point2<f32>; N]> {
    let mut out = [Point2::origin(); N];
    for slot in &mut out {
        let (rest, p) = point(input)?;
        *slot = p;
        input = rest;
    }
    Ok((input, out))
}

/// A font that is still loading on a background thread.
///
/// The result is delivered at most once, at whatever frame the load completes.
pub struct PendingFont {
    receiver: Receiver<Result<Font, FontError>>,
    delivered: bool,
}

impl PendingFont {
    /// Start loading `path` on a background thread
    pub fn spawn(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();
        std::thread::Builder::new()
            .name("font-loader".to_string())
            .spawn(move || {
                // The receiver may be gone if the app quit first
                let _ = sender.send(Font::load(&path));
            })?;
        Ok(Self {
            receiver,
            delivered: false,
        })
    }

    /// An already-settled load
    pub fn settled(result: Result<Font, FontError>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(result);
        Self {
            receiver,
            delivered: false,
        }
    }

    /// Take the result if the load has finished. Returns `None` while pending
    /// and after the result has been taken.
    pub fn try_take(&mut self) -> Option<Result<Font, FontError>> {
        if self.delivered {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(FontError::LoaderGone),
        };
        self.delivered = true;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = r#"{
        "glyphs": {
            "I": { "ha": 400, "o": "m 100 0 l 100 700 l 300 700 l 300 0 z" },
            " ": { "ha": 250 },
            "ab": { "ha": 1, "o": "" }
        },
        "familyName": "Tiny",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 400, "yMin": -200, "yMax": 800 },
        "underlineThickness": 50
    }"#;

    #[test]
    fn parses_all_commands() {
        let commands = parse_outline("m 0 0 l 10 0 q 20 10 15 5 b 0 0 1 2 3 4 z").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo(Point2::new(0.0, 0.0)),
                PathCommand::LineTo(Point2::new(10.0, 0.0)),
                PathCommand::QuadTo {
                    ctrl: Point2::new(15.0, 5.0),
                    to: Point2::new(20.0, 10.0)
                },
                PathCommand::CubicTo {
                    ctrl1: Point2::new(1.0, 2.0),
                    ctrl2: Point2::new(3.0, 4.0),
                    to: Point2::new(0.0, 0.0)
                },
            ]
        );
    }

    #[test]
    fn accepts_negative_and_fractional_coordinates_and_padding() {
        let commands = parse_outline("  m -12.5 3e1 l 0.25 -7  ").unwrap();
        assert_eq!(commands[0], PathCommand::MoveTo(Point2::new(-12.5, 30.0)));
        assert_eq!(commands[1], PathCommand::LineTo(Point2::new(0.25, -7.0)));
    }

    #[test]
    fn rejects_junk() {
        assert!(parse_outline("m 0 0 x 1 2").is_err());
        assert!(parse_outline("l 1").is_err());
        assert_eq!(parse_outline("").unwrap(), vec![]);
    }

    #[test]
    fn loads_typeface_json() {
        let font = Font::from_json(TINY).unwrap();
        assert_eq!(font.family, "Tiny");
        assert_eq!(font.glyph('I').unwrap().outline.len(), 4);
        assert!(font.glyph(' ').unwrap().outline.is_empty());
        assert!(font.glyph('a').is_none());
        assert!((font.line_height(10.0) - 10.5).abs() < 1e-5);
    }

    #[test]
    fn bad_outline_names_the_glyph() {
        let json = TINY.replace("l 300 0 z", "l 300 0 w");
        match Font::from_json(&json) {
            Err(FontError::Outline { glyph, .. }) => assert_eq!(glyph, 'I'),
            other => panic!("expected outline error, got {other:?}"),
        }
    }

    #[test]
    fn empty_font_is_rejected() {
        let json = r#"{ "glyphs": {}, "resolution": 1000, "boundingBox": { "yMin": 0, "yMax": 1 } }"#;
        assert!(matches!(Font::from_json(json), Err(FontError::Empty)));
    }

    #[test]
    fn pending_font_delivers_once() {
        let mut pending = PendingFont::settled(Font::from_json(TINY));
        assert!(pending.try_take().unwrap().is_ok());
        assert!(pending.try_take().is_none());
    }

    #[test]
    fn pending_font_reports_missing_file() {
        let mut pending = PendingFont::spawn("no/such/font.json").unwrap();
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            std::thread::yield_now();
        };
        assert!(matches!(result, Err(FontError::Read { .. })));
    }
}
