use crate::modulation::Waveform;
use crate::prelude::{PwlRecord, PwmError, PwmLevel, PwmResult};
use crate::telemetry::log::LogManager;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Formats a timestamp as `d.dddddde±XX`, the notation the simulator import expects.
pub fn format_time(time: f64) -> String {
    with_padded_exponent(&format!("{:.6e}", time), 2)
}

/// Formats an output level: the high amplitude as a decimal float, low as a bare `0`.
pub fn format_value(level: &PwmLevel) -> String {
    match level {
        PwmLevel::High(amplitude) => format_amplitude(*amplitude),
        PwmLevel::Low => "0".to_string(),
    }
}

fn format_amplitude(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude < 1e-4 && magnitude != 0.0) {
        with_padded_exponent(&format!("{:e}", value), 2)
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// Rust prints exponents as `e-5`/`e5`; the PWL consumers expect `e-05`/`e+05`.
fn with_padded_exponent(formatted: &str, width: usize) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>width$}", mantissa, sign, digits, width = width)
        }
        None => formatted.to_string(),
    }
}

pub fn format_record(record: &PwlRecord) -> String {
    format!("{}\t{}", format_time(record.time), format_value(&record.value))
}

/// Writes one line per record and returns the number of lines written.
pub fn write_records<W, I>(mut writer: W, records: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = PwlRecord>,
{
    let mut written = 0;
    for record in records {
        writeln!(writer, "{}", format_record(&record))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Creates (or truncates) `path` and writes the waveform as PWL text.
pub fn write_file<P: AsRef<Path>>(path: P, waveform: &Waveform) -> PwmResult<usize> {
    let path = path.as_ref();
    let io_error = |source| PwmError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let written = write_records(BufWriter::new(file), waveform.records()).map_err(io_error)?;

    LogManager::new().record(&format!("wrote {} PWL lines to {}", written, path.display()));
    Ok(written)
}
