// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! padwire-dump - Generate, decode and inspect padwire controller packets
//!
//! ```text
//! padwire-dump sample out.bin --size-prefixed
//! padwire-dump decode out.bin --stream --format json
//! padwire-dump inspect out.bin --size-prefixed --format json
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use padwire::{
    field, Buttons, CodecConfig, Motion, Packet, PacketEncoder, PacketFramer, PacketView,
    TableLayout, TouchPoint,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Generate, decode and inspect padwire packets
#[derive(Parser, Debug)]
#[command(name = "padwire-dump")]
#[command(version = "0.1.0")]
#[command(about = "Generate, decode and inspect padwire controller packets")]
struct Args {
    /// Codec configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the reference sample packet
    Sample {
        /// Output file
        output: PathBuf,

        /// Emit a leading u32 length
        #[arg(long)]
        size_prefixed: bool,
    },

    /// Decode packets from a file
    Decode {
        /// Input file
        input: PathBuf,

        /// Input is a stream of size-prefixed packets
        #[arg(long)]
        stream: bool,

        /// Output format: pretty, json
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Print the table and vtable layout of a packet
    Inspect {
        /// Input file
        input: PathBuf,

        /// Input carries a leading u32 length
        #[arg(long)]
        size_prefixed: bool,

        /// Output format: pretty, json
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> BoxResult<()> {
    let config = match &args.config {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::default(),
    };

    match &args.command {
        Command::Sample {
            output,
            size_prefixed,
        } => {
            let len = write_sample(output, &config, *size_prefixed)?;
            println!(
                "{} {} ({} bytes)",
                "Wrote".green().bold(),
                output.display(),
                len
            );
        }
        Command::Decode {
            input,
            stream,
            format,
        } => {
            let data = fs::read(input)?;
            let packets = decode_all(&data, &config, *stream)?;
            match format {
                OutputFormat::Pretty => {
                    for (i, packet) in packets.iter().enumerate() {
                        println!("{}", format!("Packet #{}", i).cyan().bold());
                        print!("{}", render_packet(packet));
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&packets)?),
            }
        }
        Command::Inspect {
            input,
            size_prefixed,
            format,
        } => {
            let data = fs::read(input)?;
            let view = if *size_prefixed {
                PacketView::from_size_prefixed(&data)?
            } else {
                PacketView::from_bytes(&data)?
            };
            let layout = view.layout()?;
            match format {
                OutputFormat::Pretty => print!("{}", render_layout(&layout, data.len())),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&layout)?),
            }
        }
    }

    Ok(())
}

/// Packet used by `sample`: every field set except the back touch.
fn sample_packet() -> Packet {
    Packet {
        buttons: Some(Buttons::SELECT | Buttons::UP),
        left_stick_x: 128,
        left_stick_y: 128,
        right_stick_x: 0,
        right_stick_y: 255,
        front_touch: Some(TouchPoint::new(200, 1, -120, 340)),
        back_touch: None,
        motion: Some(Motion::new(1, -1, 16384, 0, 0, 0)),
        timestamp_micros: 1_700_000_000_000,
    }
}

fn write_sample(path: &Path, config: &CodecConfig, size_prefixed: bool) -> BoxResult<usize> {
    let mut encoder = PacketEncoder::from_config(config).size_prefixed(size_prefixed);
    let bytes = encoder.encode(&sample_packet())?;
    fs::write(path, bytes)?;
    Ok(bytes.len())
}

fn decode_all(data: &[u8], config: &CodecConfig, stream: bool) -> BoxResult<Vec<Packet>> {
    if !stream {
        return Ok(vec![Packet::decode(data)?]);
    }

    let mut framer = PacketFramer::from_config(config);
    framer.extend(data);
    let mut packets = Vec::new();
    while let Some(frame) = framer.next_frame()? {
        packets.push(frame.packet()?);
    }
    if framer.buffered() > 0 {
        return Err(format!("{} trailing bytes after last frame", framer.buffered()).into());
    }
    Ok(packets)
}

fn render_touch(touch: Option<TouchPoint>) -> String {
    match touch {
        Some(t) => format!(
            "id={} pressure={} x={} y={}",
            t.id, t.pressure, t.x, t.y
        ),
        None => "-".dimmed().to_string(),
    }
}

fn render_packet(packet: &Packet) -> String {
    let buttons = match packet.buttons {
        Some(b) if b.is_empty() => "none".to_string(),
        Some(b) => {
            let mut names: Vec<&str> = b.iter_names().map(|(name, _)| name).collect();
            let unknown = b.bits() & !Buttons::all().bits();
            let extra = if unknown != 0 {
                format!(" +{:#06x}", unknown)
            } else {
                String::new()
            };
            if names.is_empty() {
                names.push("none");
            }
            format!("{}{}", names.join("|"), extra)
        }
        None => "-".dimmed().to_string(),
    };
    let motion = match packet.motion {
        Some(m) => format!(
            "accel=({}, {}, {}) gyro=({}, {}, {})",
            m.accel.x, m.accel.y, m.accel.z, m.gyro.x, m.gyro.y, m.gyro.z
        ),
        None => "-".dimmed().to_string(),
    };

    let mut out = String::new();
    let mut line = |label: &str, value: String| {
        out.push_str(&format!("  {:<18} {}\n", label.bold(), value));
    };
    line("buttons", buttons);
    line(
        "left stick",
        format!("x={} y={}", packet.left_stick_x, packet.left_stick_y),
    );
    line(
        "right stick",
        format!("x={} y={}", packet.right_stick_x, packet.right_stick_y),
    );
    line("front touch", render_touch(packet.front_touch));
    line("back touch", render_touch(packet.back_touch));
    line("motion", motion);
    line("timestamp (us)", packet.timestamp_micros.to_string());
    out
}

fn render_layout(layout: &TableLayout, len: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Packet layout".cyan().bold()));
    out.push_str(&format!("  buffer      {} bytes\n", len));
    out.push_str(&format!("  root table  @{}\n", layout.root));
    out.push_str(&format!(
        "  vtable      @{} ({} bytes, object {} bytes)\n",
        layout.vtable, layout.vtable_len, layout.object_len
    ));
    for (id, slot) in layout.slots.iter().enumerate() {
        let name = field::NAMES.get(id).copied().unwrap_or("(unknown)");
        let status = if *slot == 0 {
            "absent".dimmed().to_string()
        } else {
            format!("+{} (@{})", slot, layout.root + *slot as usize)
                .green()
                .to_string()
        };
        out.push_str(&format!("  [{:>2}] {:<18} {}\n", id, name, status));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("p".parse::<OutputFormat>(), Ok(OutputFormat::Pretty));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_sample_file_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        let config = CodecConfig::default();

        let len = write_sample(&path, &config, false).unwrap();
        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), len);
        assert_eq!(
            decode_all(&data, &config, false).unwrap(),
            vec![sample_packet()]
        );
    }

    #[test]
    fn test_stream_decode() {
        let config = CodecConfig::default();
        let mut encoder = PacketEncoder::new().size_prefixed(true);
        let mut data = Vec::new();
        data.extend_from_slice(encoder.encode(&sample_packet()).unwrap());
        data.extend_from_slice(encoder.encode(&Packet::default()).unwrap());

        let packets = decode_all(&data, &config, true).unwrap();
        assert_eq!(packets, vec![sample_packet(), Packet::default()]);

        data.push(0);
        assert!(decode_all(&data, &config, true).is_err());
    }

    #[test]
    fn test_render_layout_names_fields() {
        colored::control::set_override(false);
        let bytes = sample_packet().encode().unwrap();
        let layout = PacketView::from_bytes(&bytes).unwrap().layout().unwrap();
        let text = render_layout(&layout, bytes.len());
        assert!(text.contains("timestamp_micros"));
        assert!(text.contains("back_touch"));
        assert!(text.contains("absent"));
    }

    #[test]
    fn test_layout_json() {
        let bytes = sample_packet().encode().unwrap();
        let layout = PacketView::from_bytes(&bytes).unwrap().layout().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string_pretty(&layout).unwrap()).unwrap();

        assert_eq!(json["root"], layout.root);
        assert_eq!(json["vtable_len"], layout.vtable_len);
        let slots = json["slots"].as_array().unwrap();
        assert_eq!(slots.len(), field::COUNT as usize);
        assert_eq!(slots[field::BACK_TOUCH as usize], 0);
    }

    #[test]
    fn test_render_packet() {
        colored::control::set_override(false);
        let text = render_packet(&sample_packet());
        assert!(text.contains("SELECT|UP"));
        assert!(text.contains("id=1 pressure=200 x=-120 y=340"));
        assert!(text.contains("1700000000000"));
    }
}
