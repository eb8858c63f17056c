use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use seq_io::fasta::{Reader, Record};

use twobit::{MmapReader, TwoBitWriter};

#[derive(Parser)]
#[clap(version, about = "Convert between FASTA and the 2bit nucleotide format")]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a FASTA file (optionally compressed) into 2bit
    Build {
        /// Input FASTA
        input: String,

        /// Output file path for the 2bit file
        #[clap(short = 'o', long)]
        output: String,
    },

    /// Print the name, length and non-N length of every sequence
    Info {
        /// Input 2bit file
        input: String,
    },

    /// Print a single sequence (or a region of it) as FASTA
    Fetch {
        /// Input 2bit file
        input: String,

        /// Name of the sequence to fetch
        name: String,

        /// Zero-based start of the region
        #[clap(short = 's', long, default_value_t = 0)]
        start: usize,

        /// Exclusive end of the region (0: end of the sequence)
        #[clap(short = 'e', long, default_value_t = 0)]
        end: usize,

        /// Bases per line of output (0: no wrapping)
        #[clap(short = 'w', long, default_value_t = 60)]
        line_width: usize,
    },

    /// Decode every sequence of a 2bit file as FASTA
    ToFasta {
        /// Input 2bit file
        input: String,

        /// Output FASTA path [default: stdout]
        #[clap(short = 'o', long)]
        output: Option<String>,

        /// Bases per line of output (0: no wrapping)
        #[clap(short = 'w', long, default_value_t = 60)]
        line_width: usize,
    },
}

/// Writes a single FASTA record wrapped at `line_width` bases
fn write_fasta<W: Write>(
    writer: &mut W,
    header: &str,
    sequence: &[u8],
    line_width: usize,
) -> Result<()> {
    writer.write_all(b">")?;
    writer.write_all(header.as_bytes())?;
    writer.write_all(b"\n")?;
    if line_width == 0 {
        writer.write_all(sequence)?;
        writer.write_all(b"\n")?;
    } else {
        for line in sequence.chunks(line_width) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn build(input: &str, output: &str) -> Result<()> {
    let (handle, _comp) = niffler::from_path(input)?;
    let mut reader = Reader::new(handle);
    let mut writer = TwoBitWriter::new();

    let mut num_records = 0;
    let mut num_bases = 0;
    while let Some(record) = reader.next() {
        let record = record?;
        let name = record.id()?;
        if name.is_empty() {
            bail!("FASTA record {} has an empty name", num_records + 1);
        }
        if writer.contains(name) {
            eprintln!("Replacing duplicate sequence: {name}");
        }
        let seq = record.full_seq();
        writer.add(name, &seq)?;
        num_records += 1;
        num_bases += seq.len();
    }

    let mut out_handle = File::create(output).map(BufWriter::new)?;
    writer.write(&mut out_handle)?;
    out_handle.flush()?;

    eprintln!("Finished writing {} sequences", writer.len());
    eprintln!("Read {num_records} records ({num_bases} bases)");
    eprintln!("Output size: {} bytes", writer.size_bytes());
    Ok(())
}

fn info(input: &str) -> Result<()> {
    let reader = MmapReader::from_path(input)?;
    let mut out = BufWriter::new(stdout().lock());
    let mut ibuf = itoa::Buffer::new();
    for name in reader.names() {
        out.write_all(name.as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(ibuf.format(reader.length(name)?).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(ibuf.format(reader.length_excluding_unknown(name)?).as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn fetch(input: &str, name: &str, start: usize, end: usize, line_width: usize) -> Result<()> {
    let reader = MmapReader::from_path(input)?;
    let sequence = reader.read_range(name, start, end)?;

    let header = if start == 0 && end == 0 {
        name.to_string()
    } else {
        format!("{name}:{start}-{}", start + sequence.len())
    };

    let mut out = BufWriter::new(stdout().lock());
    write_fasta(&mut out, &header, &sequence, line_width)?;
    out.flush()?;
    Ok(())
}

fn to_fasta(input: &str, output: Option<&str>, line_width: usize) -> Result<()> {
    let reader = MmapReader::from_path(input)?;
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path).map(BufWriter::new)?),
        None => Box::new(BufWriter::new(stdout().lock())),
    };

    let mut sbuf = Vec::new();
    let mut num_records = 0;
    for name in reader.names() {
        // empty sequences are written as a bare header
        if reader.length(name)? == 0 {
            sbuf.clear();
        } else {
            reader.read_range_into(name, 0, 0, &mut sbuf)?;
        }
        write_fasta(&mut out, name, &sbuf, line_width)?;
        num_records += 1;
    }
    out.flush()?;

    eprintln!("Finished decoding {num_records} sequences");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Build { input, output } => build(&input, &output),
        Command::Info { input } => info(&input),
        Command::Fetch {
            input,
            name,
            start,
            end,
            line_width,
        } => fetch(&input, &name, start, end, line_width),
        Command::ToFasta {
            input,
            output,
            line_width,
        } => to_fasta(&input, output.as_deref(), line_width),
    }
}
