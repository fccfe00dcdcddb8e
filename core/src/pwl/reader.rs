use crate::prelude::{PwlRecord, PwmError, PwmLevel, PwmResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

fn parse_line(line_number: usize, line: &str) -> PwmResult<PwlRecord> {
    let parse_error = |reason: String| PwmError::Parse {
        line: line_number,
        reason,
    };

    let mut fields = line.split_whitespace();
    let (time, value) = match (fields.next(), fields.next(), fields.next()) {
        (Some(time), Some(value), None) => (time, value),
        _ => return Err(parse_error(format!("expected two columns in {:?}", line))),
    };

    let time: f64 = time
        .parse()
        .map_err(|_| parse_error(format!("invalid time {:?}", time)))?;
    let amplitude: f64 = value
        .parse()
        .map_err(|_| parse_error(format!("invalid value {:?}", value)))?;

    let value = if amplitude == 0.0 {
        PwmLevel::Low
    } else {
        PwmLevel::High(amplitude)
    };
    Ok(PwlRecord { time, value })
}

fn collect_records<R, F>(reader: R, io_error: F) -> PwmResult<Vec<PwlRecord>>
where
    R: BufRead,
    F: Fn(usize, io::Error) -> PwmError,
{
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| io_error(index + 1, err))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(index + 1, &line)?);
    }
    Ok(records)
}

/// Parses PWL text, skipping blank lines. Line numbers in errors are 1-based.
pub fn read_records<R: BufRead>(reader: R) -> PwmResult<Vec<PwlRecord>> {
    collect_records(reader, |line, err| PwmError::Parse {
        line,
        reason: err.to_string(),
    })
}

pub fn read_file<P: AsRef<Path>>(path: P) -> PwmResult<Vec<PwlRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PwmError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    collect_records(BufReader::new(file), |_, source| PwmError::Io {
        path: path.to_path_buf(),
        source,
    })
}
