use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use pdf_text_core::Document;

mod processor;

use processor::{LayoutProcessor, RawProcessor, TextProcessor};

/// Extract plain text from PDF files.
#[derive(Parser)]
#[command(name = "pdftext")]
struct Args {
    /// Text processor: N reconstructs the layout, R dumps raw runs.
    #[arg(short, long, value_enum, default_value = "N")]
    processor: ProcessorKind,
    /// Input PDF; stdin if absent.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output text file; stdout if absent.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProcessorKind {
    #[value(name = "N")]
    Normal,
    #[value(name = "R")]
    Raw,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pdftext: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    match &args.input {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            extract_to_output(args, reader)
        }
        None => {
            // stdin is not seekable; buffer it.
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes)?;
            extract_to_output(args, Cursor::new(bytes))
        }
    }
}

fn extract_to_output<R: Read + Seek>(
    args: &Args,
    reader: R,
) -> Result<(), Box<dyn Error>> {
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            extract(args.processor, reader, &mut out)?;
            out.flush()?;
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            extract(args.processor, reader, &mut out)?;
            out.flush()?;
            Ok(())
        }
    }
}

fn extract<R: Read + Seek, W: Write>(
    kind: ProcessorKind,
    reader: R,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let mut doc = Document::load(reader)?;
    match kind {
        ProcessorKind::Normal => LayoutProcessor.process(&mut doc, out)?,
        ProcessorKind::Raw => RawProcessor.process(&mut doc, out)?,
    }
    Ok(())
}
