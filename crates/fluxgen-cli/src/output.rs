use fluxgen::core::models::record::InteractionRecord;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One CSV line per accepted event.
#[derive(Debug, Serialize, PartialEq)]
struct EventRow<'a> {
    job: usize,
    event: usize,
    target: i32,
    channel: &'a str,
    probe_pdg: i32,
    probe_energy: f64,
    weight: f64,
    vertex_x: f64,
    vertex_y: f64,
    vertex_z: f64,
    n_final: usize,
    visible_energy: f64,
    leading_pdg: Option<i32>,
    leading_energy: Option<f64>,
}

impl<'a> EventRow<'a> {
    fn new(job: usize, event: usize, record: &'a InteractionRecord) -> Self {
        let leading = record
            .final_state()
            .max_by(|a, b| a.energy.total_cmp(&b.energy));
        Self {
            job,
            event,
            target: record.target.code(),
            channel: &record.channel,
            probe_pdg: record.probe.species.code(),
            probe_energy: record.probe.energy,
            weight: record.weight,
            vertex_x: record.vertex.x,
            vertex_y: record.vertex.y,
            vertex_z: record.vertex.z,
            n_final: record.final_state().count(),
            visible_energy: record.visible_energy(),
            leading_pdg: leading.map(|p| p.code.code()),
            leading_energy: leading.map(|p| p.energy),
        }
    }
}

/// Writes the records of every job, in job order, with a header line.
pub fn write_events<W: Write>(
    writer: W,
    jobs: &[(usize, &[InteractionRecord])],
) -> csv::Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut written = 0;
    for (job, records) in jobs {
        for (event, record) in records.iter().enumerate() {
            csv.serialize(EventRow::new(*job, event, record))?;
            written += 1;
        }
    }
    csv.flush()?;
    Ok(written)
}

pub fn write_events_to_path(
    path: &Path,
    jobs: &[(usize, &[InteractionRecord])],
) -> csv::Result<usize> {
    let file = std::fs::File::create(path)?;
    write_events(std::io::BufWriter::new(file), jobs)
}
