//! Reader for the line oriented scene format.
//!
//! ```text
//! png 320 240 out.png
//! color 1 0.5 0.2
//! sphere 0 0 -2 0.5
//! sun 1 1 1
//! ```
//!
//! The first line is the header, every following line is a keyword and its
//! whitespace separated arguments. State keywords (`color`, `shininess`, ...)
//! affect the objects declared after them.

use std::str::SplitWhitespace;

use log::{debug, warn};
use thiserror::Error;

use super::camera::Lens;
use super::color::{Exposure, LinearColor};
use super::math::Vec3;
use super::scene::{Scene, SceneBuilder, SceneError};

#[derive(Error, Debug, PartialEq)]
pub enum ParserError {
    #[error("the scene file is empty")]
    Empty,

    #[error("line {line}: unsupported header '{keyword}', expected 'png <width> <height> <file>'")]
    UnknownHeader { line: usize, keyword: String },

    #[error("line {line}: '{keyword}' is missing its {argument} argument")]
    MissingArgument {
        line: usize,
        keyword: String,
        argument: &'static str,
    },

    #[error("line {line}: cannot read '{token}' as a number")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: bounces cannot be negative, got {value}")]
    NegativeBounces { line: usize, value: i64 },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

type ParserResult<T> = Result<T, ParserError>;

pub struct ImageData {
    /// file name requested by the header
    pub output: String,
    pub scene: Scene,
}

pub struct SceneParser<'a> {
    content: &'a str,
}

/// Arguments of one line, with enough context to report errors.
struct Arguments<'a> {
    line: usize,
    keyword: &'a str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Arguments<'a> {
    fn next_token(&mut self, argument: &'static str) -> ParserResult<&'a str> {
        self.tokens.next().ok_or_else(|| ParserError::MissingArgument {
            line: self.line,
            keyword: self.keyword.to_string(),
            argument,
        })
    }

    fn parse_float(&mut self, argument: &'static str) -> ParserResult<f64> {
        let token = self.next_token(argument)?;
        token.parse::<f64>().map_err(|_| ParserError::InvalidNumber {
            line: self.line,
            token: token.to_string(),
        })
    }

    fn parse_integer(&mut self, argument: &'static str) -> ParserResult<i64> {
        let token = self.next_token(argument)?;
        token.parse::<i64>().map_err(|_| ParserError::InvalidNumber {
            line: self.line,
            token: token.to_string(),
        })
    }

    fn parse_size(&mut self, argument: &'static str) -> ParserResult<u32> {
        let token = self.next_token(argument)?;
        token.parse::<u32>().map_err(|_| ParserError::InvalidNumber {
            line: self.line,
            token: token.to_string(),
        })
    }

    fn parse_vec3(&mut self) -> ParserResult<Vec3> {
        let x = self.parse_float("x")?;
        let y = self.parse_float("y")?;
        let z = self.parse_float("z")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_color(&mut self) -> ParserResult<LinearColor> {
        let r = self.parse_float("red")?;
        let g = self.parse_float("green")?;
        let b = self.parse_float("blue")?;
        Ok(LinearColor::rgb(r, g, b))
    }
}

impl SceneParser<'_> {
    pub fn new(content: &str) -> SceneParser<'_> {
        SceneParser { content }
    }

    pub fn parse_scene(&self) -> ParserResult<ImageData> {
        let mut lines = self
            .content
            .lines()
            .enumerate()
            .map(|(i, text)| (i + 1, text))
            .filter(|(_, text)| !text.trim().is_empty());

        let (line, header) = lines.next().ok_or(ParserError::Empty)?;
        let (mut builder, output) = Self::parse_header(line, header)?;

        for (line, text) in lines {
            let mut tokens = text.split_whitespace();
            // the line is not blank so there is always a keyword
            let keyword = tokens.next().unwrap_or_default();
            let mut args = Arguments {
                line,
                keyword,
                tokens,
            };
            Self::parse_line(&mut builder, &mut args)?;
        }

        let scene = builder.build()?;
        debug!(
            "parsed {} objects and {} lights, writing to {}",
            scene.objects().len(),
            scene.lights().len(),
            output
        );
        Ok(ImageData { output, scene })
    }

    fn parse_header(line: usize, text: &str) -> ParserResult<(SceneBuilder, String)> {
        let mut tokens = text.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        if keyword != "png" {
            return Err(ParserError::UnknownHeader {
                line,
                keyword: keyword.to_string(),
            });
        }
        let mut args = Arguments {
            line,
            keyword,
            tokens,
        };
        let width = args.parse_size("width")?;
        let height = args.parse_size("height")?;
        let output = args.next_token("file name")?.to_string();
        Ok((SceneBuilder::new(width, height), output))
    }

    fn parse_line(builder: &mut SceneBuilder, args: &mut Arguments) -> ParserResult<()> {
        match args.keyword {
            "color" => builder.set_color(args.parse_color()?),
            "sphere" => {
                let center = args.parse_vec3()?;
                let radius = args.parse_float("radius")?;
                builder.add_sphere(center, radius);
            }
            "sun" => builder.add_sun(args.parse_vec3()?),
            "bulb" => builder.add_bulb(args.parse_vec3()?),
            "eye" => builder.camera.eye = args.parse_vec3()?,
            "forward" => builder.camera.set_forward(args.parse_vec3()?),
            "up" => builder.camera.set_up(args.parse_vec3()?),
            "expose" => builder.exposure = Exposure::Exponential(args.parse_float("exposure")?),
            "fisheye" => builder.camera.lens = Lens::Fisheye,
            "panorama" => builder.camera.lens = Lens::Panorama,
            "shininess" => builder.material.shininess = args.parse_float("shininess")?,
            "transparency" => builder.material.transparency = args.parse_float("transparency")?,
            "roughness" => builder.material.roughness = args.parse_float("roughness")?,
            "bounces" => {
                let value = args.parse_integer("depth")?;
                if value < 0 {
                    return Err(ParserError::NegativeBounces {
                        line: args.line,
                        value,
                    });
                }
                builder.bounces = u32::try_from(value).unwrap_or(u32::MAX);
            }
            other => warn!("line {}: skipping unsupported keyword '{}'", args.line, other),
        }
        Ok(())
    }
}
