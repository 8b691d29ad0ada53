//! Interactive prompts used when values are missing from the command line.
//!
//! Each prompt re-asks until the answer parses into a valid value, so the
//! pipeline only ever sees typed, checked inputs.

use anyhow::{bail, Result};
use std::io::{BufRead, Write};

use rsnatura::geo_core::{CoordinateTransformer, CrsId};
use rsnatura::SiteError;

/// Ask until `parse` accepts the answer
pub fn prompt_value<R, W, T, F>(input: &mut R, output: &mut W, message: &str, parse: F) -> Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> std::result::Result<T, String>,
{
    loop {
        write!(output, "{}", message)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("Input closed before a valid value was entered");
        }
        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(msg) => writeln!(output, "{}", msg)?,
        }
    }
}

pub fn parse_coordinate(answer: &str) -> std::result::Result<f64, String> {
    match answer.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{}' is not a valid coordinate", answer)),
    }
}

pub fn parse_radius(answer: &str) -> std::result::Result<f64, String> {
    let radius = answer
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", answer))?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SiteError::InvalidRadius(radius).to_string());
    }
    Ok(radius)
}

/// EPSG code that parses and that the transformer can resolve
pub fn parse_target_epsg<T: CoordinateTransformer + ?Sized>(
    answer: &str,
    transformer: &T,
) -> std::result::Result<i64, String> {
    let code = answer
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not an EPSG code", answer))?;
    let crs = CrsId::from_epsg(code).map_err(|e| e.to_string())?;
    transformer.resolve(&crs).map_err(|e| e.to_string())?;
    Ok(code)
}
