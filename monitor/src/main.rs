#[macro_use]
extern crate log;

use chrono::Local;
use clap::{App, Arg};
use log::{Level, LevelFilter, Metadata, Record};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::process;

use common::stream::{write_meta_payload, RecordIter};
use common::META_SIZE;

pub struct SimpleLogger;

impl log::Log for SimpleLogger {
    #[inline]
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    #[inline]
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}: {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
        }
    }

    #[inline]
    fn flush(&self) {}
}

fn open_source(target: &str) -> io::Result<Box<dyn io::Read>> {
    if target.contains(':') {
        info!("Connecting to {}...", target);
        let stream = TcpStream::connect(target)?;
        info!("Connection established to {}", stream.peer_addr()?);
        Ok(Box::new(stream))
    } else {
        info!("Replaying capture file '{}'...", target);
        Ok(Box::new(File::open(target)?))
    }
}

fn run(target: &str, output: Option<&str>) -> io::Result<()> {
    let source = open_source(target)?;
    let mut output = match output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut record_count: u64 = 0;
    let mut byte_count: u64 = 0;
    let mut lost_total: u64 = 0;

    for record in RecordIter::new(BufReader::new(source)) {
        let (meta, payload) = record?;
        if payload.lost > 0 {
            warn!(
                "CPU {:02}: the source dropped {} events",
                payload.cpu, payload.lost
            );
        }

        println!(
            "CPU {:02}: kind {} ({} bytes)",
            payload.cpu,
            payload.kind,
            payload.data.len()
        );

        if let Some(ref mut fp) = output {
            write_meta_payload(fp, &payload)?;
        }

        record_count += 1;
        byte_count += (META_SIZE + meta.size as usize) as u64;
        lost_total += payload.lost;
    }

    if let Some(mut fp) = output {
        fp.flush()?;
    }

    info!(
        "Stream finished: {} records, {} bytes, {} events lost at the source",
        record_count, byte_count, lost_total
    );
    Ok(())
}

fn main() {
    log::set_logger(&SimpleLogger).unwrap();
    log::set_max_level(LevelFilter::Info);

    let app = App::new("monitor")
        .about("Follows a stream of monitoring records from a machine or a capture file")
        .arg(
            Arg::with_name("TARGET")
                .required(true)
                .help("An address to connect to (host:port) or a capture file to replay"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Writes every received record into FILE"),
        );

    let matches = app.get_matches();
    let target = matches.value_of("TARGET").unwrap();
    let output = matches.value_of("output");

    if let Err(error) = run(target, output) {
        error!("{}", error);
        process::exit(1);
    }
}
