//! Comma separated body datasets.
//!
//! The first record starts with the number of bodies; anything after that first field is a
//! header and is ignored. Every following record describes one body:
//!
//! ```text
//! 2,mass,radius,x,y,z,vx,vy,vz
//! earth,5.972e24,6371,0,0,0,0,0,0
//! moon,7.34767309e22,1737.4,-26752.4,-399156.7,34087.7,0.9735,-0.0378,-0.0376
//! ```
//!
//! Units are kilograms, kilometers and kilometers per second. Only the first `count` body
//! records are read, blank lines are skipped. Fields are split on every comma: quoting is not
//! supported and a quoted field is rejected.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, bail, ensure};
use log::{debug, warn};

use crate::sim::Body;

const FIELDS: usize = 9;

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<Body>> {
    let file = File::open(path).with_context(|| format!("cannot open '{}'", path.display()))?;
    parse_csv(BufReader::new(file)).with_context(|| format!("invalid dataset '{}'", path.display()))
}

pub fn parse_csv(reader: impl BufRead) -> anyhow::Result<Vec<Body>> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()));

    let Some((line_no, header)) = lines.next() else {
        bail!("dataset is empty");
    };
    let header = header.with_context(|| format!("line {line_no}"))?;
    let count_field = header.split(',').next().unwrap_or_default().trim();
    let count: i64 = count_field
        .parse()
        .with_context(|| format!("line {line_no}: body count '{count_field}' is not an integer"))?;
    ensure!(count > 0, "line {line_no}: body count must be positive, got {count}");
    if count == 1 {
        warn!("dataset holds a single body, nothing will attract it");
    }
    let count = count as usize;

    // The count is untrusted until the records are there, so nothing is reserved up front.
    let mut bodies = Vec::new();
    for (line_no, line) in lines.take(count) {
        let line = line.with_context(|| format!("line {line_no}"))?;
        let (name, body) = parse_record(&line).with_context(|| format!("line {line_no}"))?;
        debug!("loaded body {} '{}' from line {}", bodies.len(), name, line_no);
        bodies.push(body);
    }
    ensure!(
        bodies.len() == count,
        "dataset declares {count} bodies but only {} records follow",
        bodies.len()
    );

    Ok(bodies)
}

fn parse_record(line: &str) -> anyhow::Result<(&str, Body)> {
    ensure!(!line.contains('"'), "quoted fields are not supported");
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    ensure!(
        fields.len() >= FIELDS,
        "expected {FIELDS} fields, found {}",
        fields.len()
    );

    let mut values = [0.0; FIELDS - 1];
    for (value, (field, label)) in values.iter_mut().zip(fields[1..FIELDS].iter().zip([
        "mass", "radius", "x", "y", "z", "vx", "vy", "vz",
    ])) {
        *value = field
            .parse()
            .with_context(|| format!("{label} '{field}' is not a number"))?;
    }
    let [mass, radius, x, y, z, vx, vy, vz] = values;

    Ok((
        fields[0],
        Body {
            mass,
            radius,
            pos: (x, y, z).into(),
            vel: (vx, vy, vz).into(),
        },
    ))
}
