use anyhow::bail;
use clap::{self, Parser};
use traceio::{Access, Format, ReadOptions, WriteOptions};

#[derive(clap::Parser)]
struct Cmd {
    /// trace file to read
    input: String,
    /// file to write, omit to only print the summary
    output: Option<String>,
    /// input format: su, sgy, sg2, dzt, im, sick
    #[arg(short, long)]
    from: Format,
    /// output format: su, sgy, sg2, dat
    #[arg(short, long, default_value = "sgy")]
    to: Format,
    /// read options as JSON, e.g. '{"water_velocity": 1480}'
    #[arg(long)]
    options: Option<String>,
    /// write SEG-2 samples as f64
    #[arg(long)]
    double: bool,
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder().try_init();
    let cmd = Cmd::parse();
    if !cmd.from.access().contains(Access::READ) {
        bail!("{} cannot be read", cmd.from);
    }

    let opts = match &cmd.options {
        Some(json) => ReadOptions::from_json(json)?,
        None => ReadOptions::new(),
    };
    let stream = traceio::read_file(&cmd.input, cmd.from, &opts)?;
    println!("{}", stream.summary());

    if let Some(output) = &cmd.output {
        if !cmd.to.access().contains(Access::WRITE) {
            bail!("{} cannot be written", cmd.to);
        }
        let mut opts = WriteOptions::new();
        if cmd.double {
            opts = opts.seg2_samples(traceio::SampleFormat::F64);
        }
        traceio::write_file(&stream, output, cmd.to, &opts)?;
    }
    Ok(())
}
