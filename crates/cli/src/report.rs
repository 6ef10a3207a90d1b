//! Human-readable output for predictions and validation runs.

use std::io::Write;

use anyhow::Result;

use aqsense_algorithms::interpolation::{Engine, Prediction};
use aqsense_algorithms::validation::ValidationReport;
use aqsense_core::ReferenceSet;

pub fn write_estimate<W: Write>(
    out: &mut W,
    engine: &Engine,
    prediction: &Prediction,
    explain: bool,
) -> Result<()> {
    let estimate = &prediction.estimate;
    writeln!(out, "\nEstimated PM2.5 Level: {:.2}", estimate.value)?;
    writeln!(out, "Health Status: {}", estimate.band)?;

    if prediction.exact_match {
        writeln!(out, "(Query coincides with a measurement station)")?;
    } else {
        writeln!(
            out,
            "(Calculated using inverse distance weighting from the {} nearest stations)",
            prediction.contributions.len()
        )?;
    }

    if explain {
        let unit = engine.params().metric.unit();
        writeln!(out, "\n  {:<24} {:>10} {:>10} {:>8}", "Station", "Distance", "Value", "Weight")?;
        for c in &prediction.contributions {
            let label = engine
                .reference()
                .get(c.neighbor.index)
                .map(|r| r.label())
                .unwrap_or_default();
            writeln!(
                out,
                "  {:<24} {:>6.3} {:<3} {:>10.2} {:>7.1}%",
                label,
                c.neighbor.distance,
                unit,
                c.neighbor.value,
                100.0 * c.weight
            )?;
        }
    }
    Ok(())
}

pub fn write_stations<W: Write>(out: &mut W, reference: &ReferenceSet, engine: &Engine) -> Result<()> {
    writeln!(out, "{:<24} {:>10} {:>10} {:>10}  {}", "Station", "Latitude", "Longitude", "PM2.5", "Band")?;
    for record in reference {
        writeln!(
            out,
            "{:<24} {:>10.4} {:>10.4} {:>10.2}  {}",
            record.label(),
            record.coordinate.latitude,
            record.coordinate.longitude,
            record.value,
            engine.classify(record.value)
        )?;
    }
    writeln!(out, "\n{} stations", reference.len())?;
    Ok(())
}

pub fn write_validation<W: Write>(out: &mut W, report: &ValidationReport) -> Result<()> {
    writeln!(out, "{:<24} {:>10} {:>10} {:>10}  {}", "Station", "Observed", "Predicted", "Error", "Band")?;
    for r in &report.residuals {
        let name = r.name.clone().unwrap_or_else(|| format!("#{}", r.index));
        writeln!(
            out,
            "{:<24} {:>10.2} {:>10.2} {:>+10.2}  {}",
            name,
            r.observed,
            r.predicted,
            r.error,
            if r.band_match { "match" } else { "differs" }
        )?;
    }
    writeln!(out, "\nMean absolute error: {:.2}", report.mae)?;
    writeln!(out, "RMSE: {:.2}", report.rmse)?;
    writeln!(out, "Band agreement: {:.1}%", 100.0 * report.band_agreement)?;
    Ok(())
}
