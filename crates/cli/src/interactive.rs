//! Interactive prompt: read a coordinate, print an estimate, repeat.

use std::io::{BufRead, Write};

use anyhow::Result;

use aqsense_algorithms::interpolation::Engine;
use aqsense_core::{Coordinate, Error};

use crate::config::Preset;
use crate::report::write_estimate;

/// Run the menu loop until the user picks an unknown option or input ends.
///
/// Option `1` asks for a latitude and longitude; options `2..` select a
/// preset location. Any other answer exits.
pub fn run<R: BufRead, W: Write>(
    engine: &Engine,
    presets: &[Preset],
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "\n--- VIRTUAL AQI SENSOR ---")?;
    writeln!(out, "Predict air quality for any location.")?;

    loop {
        writeln!(out, "\nOptions:")?;
        writeln!(out, "1. Enter coordinates manually")?;
        for (i, preset) in presets.iter().enumerate() {
            writeln!(out, "{}. Use a preset location ({})", i + 2, preset.name)?;
        }
        let choice = match prompt(input, out, &format!("Select (1-{}): ", presets.len() + 1))? {
            Some(choice) => choice,
            None => break,
        };

        let query = match choice.as_str() {
            "1" => {
                let lat = prompt(input, out, "Enter Latitude: ")?;
                let lon = prompt(input, out, "Enter Longitude: ")?;
                let (Some(lat), Some(lon)) = (lat, lon) else {
                    break;
                };
                match (lat.parse::<f64>(), lon.parse::<f64>()) {
                    (Ok(lat), Ok(lon)) => Coordinate::new(lat, lon),
                    _ => {
                        writeln!(out, "Invalid number.")?;
                        continue;
                    }
                }
            }
            other => match other.parse::<usize>().ok().and_then(|n| n.checked_sub(2)).and_then(|i| presets.get(i)) {
                Some(preset) => {
                    writeln!(
                        out,
                        "Using location: '{}' (Lat: {}, Long: {})",
                        preset.name, preset.lat, preset.lon
                    )?;
                    Coordinate::new(preset.lat, preset.lon)
                }
                None => break,
            },
        };

        match engine.predict_detailed(query) {
            Ok(prediction) => write_estimate(out, engine, &prediction, false)?,
            Err(Error::InvalidCoordinate { .. }) => writeln!(out, "Invalid number.")?,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Print a prompt and read one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqsense_core::{ReferenceSet, StationRecord};
    use std::io::Cursor;

    fn engine() -> Engine {
        let reference = ReferenceSet::build(vec![
            StationRecord::new((0.0, 0.0), 10.0).with_name("West"),
            StationRecord::new((0.0, 2.0), 30.0).with_name("East"),
        ])
        .unwrap();
        Engine::new(reference, 2).unwrap()
    }

    fn presets() -> Vec<Preset> {
        vec![Preset {
            name: "Between".into(),
            lat: 0.0,
            lon: 1.0,
        }]
    }

    fn run_session(script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run(&engine(), &presets(), &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_manual_entry() {
        let out = run_session("1\n0\n0\nq\n");
        assert!(out.contains("Estimated PM2.5 Level: 10.00"), "{}", out);
        assert!(out.contains("Health Status: Good"));
    }

    #[test]
    fn test_preset() {
        let out = run_session("2\n3\n");
        assert!(out.contains("Using location: 'Between'"));
        assert!(out.contains("Estimated PM2.5 Level: 20.00"));
    }

    #[test]
    fn test_invalid_number_loops() {
        let out = run_session("1\nabc\n5\n1\nNaN\n5\n1\n0\n2\n");
        assert_eq!(out.matches("Invalid number.").count(), 2);
        assert!(out.contains("Estimated PM2.5 Level: 30.00"));
    }

    #[test]
    fn test_end_of_input() {
        let out = run_session("");
        assert!(out.contains("Options:"));
        assert!(!out.contains("Estimated"));
    }
}
